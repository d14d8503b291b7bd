//! Supervisor logging and managed-process log rotation.
//!
//! botctl itself logs through `tracing` to stderr. The bot's own output
//! goes to `process.log_file`, which is rotated to `<name>.1` (one backup
//! kept) before each launch once it exceeds `process.max_log_mb`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const BACKUP_SUFFIX: &str = ".1";

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum log level: "debug", "info", "warn", or "error".
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

/// Log severity levels accepted in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parses a level name. Unknown names fall back to `Info`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "trace" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// Installs the global `tracing` subscriber. Call once at startup.
///
/// `RUST_LOG` takes precedence over `config.level`. Calling this twice
/// is harmless; the second call is ignored.
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::parse(&config.level).as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

/// Returns the backup path for a rotated log: `bot.log` -> `bot.log.1`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Rotates `path` to its backup when it is at least `max_bytes` long.
///
/// Returns `true` if a rotation happened. A missing file or a
/// `max_bytes` of 0 is a no-op. Any previous backup is replaced.
pub fn rotate_if_oversized(path: &Path, max_bytes: u64) -> io::Result<bool> {
    if max_bytes == 0 {
        return Ok(false);
    }
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if len < max_bytes {
        return Ok(false);
    }
    fs::rename(path, backup_path(path))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parse_is_case_insensitive() {
        assert_eq!(Level::parse("DEBUG"), Level::Debug);
        assert_eq!(Level::parse("Warning"), Level::Warn);
        assert_eq!(Level::parse("error"), Level::Error);
        assert_eq!(Level::parse("verbose"), Level::Info);
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/srv/bot/bot.log")),
            Path::new("/srv/bot/bot.log.1")
        );
    }

    #[test]
    fn small_log_is_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("bot.log");
        fs::write(&log, "short").unwrap();

        assert!(!rotate_if_oversized(&log, 1024).unwrap());
        assert!(log.exists());
    }

    #[test]
    fn oversized_log_is_rotated_over_previous_backup() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("bot.log");
        fs::write(backup_path(&log), "old backup").unwrap();
        fs::write(&log, "x".repeat(64)).unwrap();

        assert!(rotate_if_oversized(&log, 64).unwrap());
        assert!(!log.exists());
        assert_eq!(fs::read_to_string(backup_path(&log)).unwrap(), "x".repeat(64));
    }

    #[test]
    fn missing_log_and_disabled_rotation_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("bot.log");

        assert!(!rotate_if_oversized(&log, 1).unwrap());
        fs::write(&log, "content").unwrap();
        assert!(!rotate_if_oversized(&log, 0).unwrap());
    }
}
