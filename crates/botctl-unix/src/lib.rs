//! Unix implementation of [`botctl_core::ProcessControl`].

/// Liveness probing and signal delivery.
pub mod process;

/// `/proc/<pid>/stat` parsing (Linux).
pub mod proc_stat;

/// Detached launch and synchronous hooks.
pub mod spawn;

pub use process::UnixProcess;
