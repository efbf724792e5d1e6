//! Configuration model, YAML loading and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Deserializer};

use crate::locate::EAC_DIR;

/// Splash screen width used when none is configured.
pub const DEFAULT_WIDTH: u32 = 800;
/// Splash screen height used when none is configured.
pub const DEFAULT_HEIGHT: u32 = 450;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Contents of `config.yml`. Every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Folder scanned for PNG files.
    pub path: Option<PathBuf>,
    /// Whether subfolders are scanned too. A blank `recursive:` reads as false.
    #[serde(deserialize_with = "null_as_false")]
    pub recursive: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    /// Game folder; must contain an `EasyAntiCheat` folder.
    pub path: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub path: Option<PathBuf>,
}

/// One configuration field that can be replaced through the environment.
pub struct EnvOverride {
    pub key: &'static str,
    pub help: &'static str,
    pub default: Option<&'static str>,
    apply: fn(&mut Config, &str) -> Result<()>,
}

/// Every overridable field, in help order.
pub const ENV_OVERRIDES: &[EnvOverride] = &[
    EnvOverride {
        key: "SOURCE_PATH",
        help: "Path to the source directory",
        default: None,
        apply: set_source_path,
    },
    EnvOverride {
        key: "SOURCE_RECURSIVE",
        help: "Whether to search for PNG files recursively",
        default: Some("false"),
        apply: set_source_recursive,
    },
    EnvOverride {
        key: "DESTINATION_PATH",
        help: "Path to the destination directory. It must have an EasyAntiCheat directory",
        default: None,
        apply: set_destination_path,
    },
    EnvOverride {
        key: "DESTINATION_WIDTH",
        help: "Width of the destination image",
        default: Some("800"),
        apply: set_destination_width,
    },
    EnvOverride {
        key: "DESTINATION_HEIGHT",
        help: "Height of the destination image",
        default: Some("450"),
        apply: set_destination_height,
    },
    EnvOverride {
        key: "LOG_PATH",
        help: "Path to the log file",
        default: None,
        apply: set_log_path,
    },
];

fn set_source_path(config: &mut Config, value: &str) -> Result<()> {
    config.source.path = Some(PathBuf::from(value));
    Ok(())
}

fn set_source_recursive(config: &mut Config, value: &str) -> Result<()> {
    config.source.recursive = parse_bool(value)?;
    Ok(())
}

fn set_destination_path(config: &mut Config, value: &str) -> Result<()> {
    config.destination.path = Some(PathBuf::from(value));
    Ok(())
}

fn set_destination_width(config: &mut Config, value: &str) -> Result<()> {
    config.destination.width = Some(value.trim().parse()?);
    Ok(())
}

fn set_destination_height(config: &mut Config, value: &str) -> Result<()> {
    config.destination.height = Some(value.trim().parse()?);
    Ok(())
}

fn set_log_path(config: &mut Config, value: &str) -> Result<()> {
    config.log.path = Some(PathBuf::from(value));
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        other => Err(anyhow!("invalid boolean {other:?}")),
    }
}

/// Treat `path: ""` the same as an absent path.
fn non_empty(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}

impl Config {
    /// Read `path` when it exists; a missing or empty file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Replace fields with every non-empty variable returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for entry in ENV_OVERRIDES {
            let Some(value) = lookup(entry.key).filter(|v| !v.is_empty()) else {
                continue;
            };
            (entry.apply)(self, &value).with_context(|| format!("invalid value for {}", entry.key))?;
        }
        Ok(())
    }

    /// Splash screen width; zero or unset means the default.
    pub fn width(&self) -> u32 {
        self.destination.width.filter(|w| *w > 0).unwrap_or(DEFAULT_WIDTH)
    }

    /// Splash screen height; zero or unset means the default.
    pub fn height(&self) -> u32 {
        self.destination.height.filter(|h| *h > 0).unwrap_or(DEFAULT_HEIGHT)
    }

    /// Log file named in the config or `LOG_PATH`, if any.
    pub fn log_path(&self) -> Option<&Path> {
        non_empty(&self.log.path)
    }

    /// Configured source folder, else the result of `fallback`.
    pub fn resolve_source<F>(&self, fallback: F) -> Result<PathBuf>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        non_empty(&self.source.path)
            .map(Path::to_path_buf)
            .or_else(fallback)
            .ok_or_else(|| anyhow!("source.path is required"))
    }

    /// Configured destination folder, else the result of `fallback`.
    pub fn resolve_destination<F>(&self, fallback: F) -> Result<PathBuf>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        non_empty(&self.destination.path)
            .map(Path::to_path_buf)
            .or_else(fallback)
            .ok_or_else(|| anyhow!("destination.path is required"))
    }

    /// Combine resolved folders with the remaining fields and validate them.
    pub fn into_settings(self, source: PathBuf, destination: PathBuf) -> Result<Settings> {
        let settings = Settings {
            source,
            recursive: self.source.recursive,
            width: self.width(),
            height: self.height(),
            destination,
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Validated parameters for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: PathBuf,
    pub recursive: bool,
    pub destination: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Settings {
    /// Check that both folders exist, the game folder has `EasyAntiCheat`
    /// and the size is non-zero.
    pub fn validate(&self) -> Result<()> {
        if !self.source.is_dir() {
            bail!("source path '{}' does not exist", self.source.display());
        }
        if !self.destination.is_dir() {
            bail!("destination path '{}' does not exist", self.destination.display());
        }
        if !self.destination.join(EAC_DIR).is_dir() {
            bail!(
                "{EAC_DIR} directory not found in destination path '{}'",
                self.destination.display()
            );
        }
        if self.width == 0 {
            bail!("destination width must be greater than 0");
        }
        if self.height == 0 {
            bail!("destination height must be greater than 0");
        }
        Ok(())
    }

    /// Full path of the splash screen written into the game folder.
    pub fn splash_path(&self) -> PathBuf {
        self.destination.join(EAC_DIR).join("SplashScreen.png")
    }
}

/// "Environment Variables" block appended to `--help`.
pub fn env_help() -> String {
    let mut out = String::from("Environment Variables:\n");
    out.push_str(&format!(
        "  {CONFIG_PATH_ENV:<20} Path to the configuration file (default: data/config.yml)\n"
    ));
    for entry in ENV_OVERRIDES {
        let line = match entry.default {
            Some(default) => format!("  {:<20} {} (default: {default})\n", entry.key, entry.help),
            None => format!("  {:<20} {}\n", entry.key, entry.help),
        };
        out.push_str(&line);
    }
    out
}
