//! Logger setup: every record goes to stdout and to a dated log file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use env_logger::{Builder, Env, Target, WriteStyle};

/// Log file location: `explicit` if given, else `<app_dir>/logs/<date>.log`.
pub fn log_file_path(explicit: Option<&Path>, app_dir: &Path, date: NaiveDate) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => app_dir
            .join("logs")
            .join(format!("{}.log", date.format("%Y-%m-%d"))),
    }
}

/// Open `path` for appending, creating its parent folder when needed.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Install the global logger. `RUST_LOG` overrides the default `info` filter.
pub fn init(path: &Path) -> Result<()> {
    let file = open_log_file(path)?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(Tee {
            stdout: io::stdout(),
            file,
        })))
        .try_init()
        .context("logger already initialised")?;
    Ok(())
}

/// Writer duplicating output to stdout and a file.
struct Tee<A, B> {
    stdout: A,
    file: B,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdout.write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn dated_path_under_app_dir() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let path = log_file_path(None, Path::new("/opt/app"), date);
        assert_eq!(path, Path::new("/opt/app/logs/2024-03-09.log"));
    }

    #[test]
    fn explicit_path_wins() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let path = log_file_path(Some(Path::new("custom.log")), Path::new("/opt/app"), date);
        assert_eq!(path, Path::new("custom.log"));
    }

    #[test]
    fn open_creates_parent_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("today.log");

        open_log_file(&path).unwrap().write_all(b"first\n").unwrap();
        open_log_file(&path).unwrap().write_all(b"second\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn tee_writes_both_sides() {
        let mut tee = Tee {
            stdout: Vec::new(),
            file: Vec::new(),
        };
        tee.write_all(b"hello").unwrap();
        tee.flush().unwrap();
        assert_eq!(tee.stdout, b"hello");
        assert_eq!(tee.file, b"hello");
    }
}
