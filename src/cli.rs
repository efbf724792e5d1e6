//! Command-line arguments and default file locations.

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser};

use crate::settings::env_help;

const PROJECT_URL: &str = "https://github.com/tomacheese/splashscreen-changer";

#[derive(Debug, Parser)]
#[command(name = "splashscreen-changer")]
#[command(about = "Replace a game's splash screen with a random screenshot")]
#[command(disable_version_flag = true)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH", env = "CONFIG_PATH", hide_env = true)]
    pub config: Option<PathBuf>,

    /// Path to the log file
    #[arg(short, long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Show version
    #[arg(short = 'V', long)]
    pub version: bool,
}

impl Args {
    /// Parse process arguments, appending the environment variable listing to `--help`.
    pub fn parse_with_env_help() -> Result<Self> {
        let command = Self::command().after_help(format!("{}\nGitHub: {PROJECT_URL}", env_help()));
        let matches = command.get_matches();
        Ok(Self::from_arg_matches(&matches)?)
    }
}

/// Folder that holds `data/` and `logs/`.
///
/// This is the executable's folder, except under `cargo run` where the
/// working directory is used so the checkout's `data/` is picked up.
pub fn app_dir() -> PathBuf {
    if std::env::var_os("CARGO").is_some() {
        return PathBuf::new();
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_default()
}

/// `--config`/`CONFIG_PATH`, else `<app dir>/data/config.yml`.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| app_dir().join("data").join("config.yml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from(["splashscreen-changer", "-c", "a.yml", "--log", "b.log"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("a.yml")));
        assert_eq!(args.log, Some(PathBuf::from("b.log")));
        assert!(!args.version);
    }

    #[test]
    fn version_flag_is_plain_bool() {
        let args = Args::try_parse_from(["splashscreen-changer", "-V"]).unwrap();
        assert!(args.version);
    }

    #[test]
    fn explicit_config_path_wins() {
        assert_eq!(config_path(Some(PathBuf::from("x.yml"))), PathBuf::from("x.yml"));
    }

    #[test]
    fn default_config_path_ends_in_data_dir() {
        let path = config_path(None);
        assert!(path.ends_with("data/config.yml"));
    }

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }
}
