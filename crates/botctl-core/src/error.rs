//! Error taxonomy for supervisor operations.
//!
//! A missing or stale Lifecycle Record is a state, not an error, and
//! never shows up here. Everything in [`SupervisorError`] aborts the
//! current operation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Shared result type for supervisor operations.
pub type Result<T> = std::result::Result<T, SupervisorError>;

#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The configuration is unusable.
    #[error("config: {0}")]
    Config(String),

    /// Reading, writing, or deleting the Lifecycle Record failed.
    #[error("record storage {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another invocation holds the supervisor lock.
    #[error("another botctl invocation is running (lock held on {})", path.display())]
    Busy { path: PathBuf },

    /// The termination signal was refused by the OS. The record is kept
    /// because the process is most likely still alive.
    #[error("permission denied signalling PID {pid}; record kept, process may still be running")]
    SignalDenied { pid: u32 },

    /// Any other signal delivery failure.
    #[error("failed to signal PID {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: io::Error,
    },

    /// The migration hook ran and exited unsuccessfully.
    #[error("migration failed ({})", describe_code(*code))]
    MigrationFailed { code: Option<i32> },

    /// The migration hook could not be started at all.
    #[error("failed to run migration `{program}`: {source}")]
    MigrationSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The managed process could not be spawned.
    #[error("failed to launch `{program}`: {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process was launched but its record could not be written.
    #[error(
        "PID {pid} is running but UNTRACKED: could not write {}: {source}; stop it manually",
        path.display()
    )]
    Untracked {
        pid: u32,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SupervisorError {
    /// Builds a [`SupervisorError::Storage`] for `path`.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Exit status the CLI should terminate with.
    ///
    /// A failed migration passes the tool's own exit code through so
    /// callers see exactly what the migration tool reported.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MigrationFailed { code: Some(code) } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_exit_code_is_preserved() {
        let err = SupervisorError::MigrationFailed { code: Some(3) };
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "migration failed (exit code 3)");
    }

    #[test]
    fn migration_killed_by_signal_exits_one() {
        let err = SupervisorError::MigrationFailed { code: None };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn other_errors_exit_one() {
        let err = SupervisorError::storage("bot.pid", io::Error::other("disk full"));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("bot.pid"));
    }

    #[test]
    fn untracked_message_names_the_pid() {
        let err = SupervisorError::Untracked {
            pid: 4242,
            path: PathBuf::from("bot.pid"),
            source: io::Error::other("read-only file system"),
        };
        assert!(err.to_string().contains("4242"));
        assert!(err.to_string().contains("UNTRACKED"));
    }
}
