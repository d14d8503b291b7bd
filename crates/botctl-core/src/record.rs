//! The Lifecycle Record: the PID file naming the most recently
//! launched bot process.
//!
//! Format: the decimal PID on the first line, optionally followed by the
//! process start-time token on the second line. A bare PID (as written by
//! older shell tooling) is accepted on read.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{Result, SupervisorError};

/// Claim that the process `pid` was most recently launched by botctl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleRecord {
    pub pid: u32,
    /// Kernel start time of the process, used to detect PID reuse.
    pub start_token: Option<u64>,
}

impl LifecycleRecord {
    pub fn new(pid: u32, start_token: Option<u64>) -> Self {
        Self { pid, start_token }
    }
}

impl fmt::Display for LifecycleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start_token {
            Some(token) => write!(f, "{}\n{token}\n", self.pid),
            None => writeln!(f, "{}", self.pid),
        }
    }
}

impl FromStr for LifecycleRecord {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut lines = s.lines().map(str::trim).filter(|l| !l.is_empty());

        let pid_line = lines.next().ok_or("empty record")?;
        let pid: u32 = pid_line
            .parse()
            .map_err(|e| format!("invalid PID {pid_line:?}: {e}"))?;
        // PIDs are positive and must fit pid_t.
        if pid == 0 || pid > i32::MAX as u32 {
            return Err(format!("PID out of range: {pid}"));
        }

        let start_token = match lines.next() {
            Some(token) => Some(
                token
                    .parse()
                    .map_err(|e| format!("invalid start token {token:?}: {e}"))?,
            ),
            None => None,
        };

        if lines.next().is_some() {
            return Err("trailing data after start token".into());
        }

        Ok(Self { pid, start_token })
    }
}

/// What was found at the record location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    /// No record file.
    Missing,
    /// A well-formed record.
    Record(LifecycleRecord),
    /// A file exists but its contents cannot be interpreted.
    Corrupt(String),
}

/// Reads, replaces, and removes the Lifecycle Record at a fixed path.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record, if one exists.
    pub fn load(&self) -> Result<Stored> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Stored::Missing),
            Err(e) => return Err(SupervisorError::storage(&self.path, e)),
        };
        Ok(match contents.parse() {
            Ok(record) => Stored::Record(record),
            Err(reason) => Stored::Corrupt(reason),
        })
    }

    /// Reads the record, treating corrupt contents as absent.
    pub fn read(&self) -> Result<Option<LifecycleRecord>> {
        match self.load()? {
            Stored::Record(record) => Ok(Some(record)),
            Stored::Missing | Stored::Corrupt(_) => Ok(None),
        }
    }

    /// Replaces the record with `record`.
    ///
    /// The new contents go to a sibling temp file that is then renamed
    /// over the record, so readers never observe a half-written file.
    pub fn write(&self, record: &LifecycleRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, record.to_string())?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(())
    }

    /// Removes the record. Removing a missing record succeeds.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SupervisorError::storage(&self.path, e)),
        }
    }
}
