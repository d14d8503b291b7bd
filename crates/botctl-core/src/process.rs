//! Platform seam for everything that touches real OS processes.
//!
//! The supervisor only ever talks to processes through
//! [`ProcessControl`], so its logic can be exercised against an
//! in-memory fake. `botctl-unix` provides the real implementation.

use std::io;
use std::path::PathBuf;

/// Result of checking whether a PID currently names a live process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// A process exists. `start_token` is its kernel start time when the
    /// platform can report it.
    Alive { start_token: Option<u64> },
    /// No process (or only a zombie) has this PID.
    Gone,
}

/// Distinguishable outcomes of delivering a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The signal was delivered.
    Delivered,
    /// The process no longer exists.
    AlreadyGone,
    /// The OS refused: the process exists but we may not signal it.
    Denied,
}

/// How to launch the managed process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory of the new process.
    pub cwd: PathBuf,
    /// stdout and stderr are appended here.
    pub log: PathBuf,
}

/// A freshly launched, detached process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawned {
    pub pid: u32,
    pub start_token: Option<u64>,
}

/// A synchronous command run before launch (the migration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// How a hook finished. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookExit {
    pub code: Option<i32>,
}

impl HookExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Operations the supervisor needs from the operating system.
pub trait ProcessControl {
    /// Checks whether `pid` names a live process.
    fn probe(&self, pid: u32) -> Liveness;

    /// Asks `pid` to shut down gracefully (SIGTERM on Unix).
    fn terminate(&self, pid: u32) -> io::Result<SignalOutcome>;

    /// Forcibly kills `pid` (SIGKILL on Unix).
    fn kill(&self, pid: u32) -> io::Result<SignalOutcome>;

    /// Starts the managed process detached from the calling session and
    /// returns without waiting for it.
    fn spawn_detached(&self, spec: &LaunchSpec) -> io::Result<Spawned>;

    /// Runs a hook to completion with inherited stdio and environment.
    fn run_hook(&self, spec: &HookSpec) -> io::Result<HookExit>;
}
