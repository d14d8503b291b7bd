use std::io;

use botctl_core::{HookExit, HookSpec, LaunchSpec, Liveness, ProcessControl, SignalOutcome, Spawned};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

use crate::{proc_stat, spawn};

/// Real process control through `kill(2)`, `/proc`, and `fork`/`exec`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixProcess;

impl UnixProcess {
    pub fn new() -> Self {
        Self
    }
}

/// Converts a recorded PID into a signal target.
///
/// PID 0 and anything beyond `pid_t` are rejected: `kill(0, ..)` and
/// negative PIDs address whole process groups.
fn target(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

/// Checks whether `pid` is alive.
///
/// Signal 0 probes existence without delivering anything. `EPERM` means
/// the process exists but belongs to someone else. Zombies are reported
/// as gone: they have exited and only await reaping.
pub fn probe(pid: u32) -> Liveness {
    let Some(target) = target(pid) else {
        return Liveness::Gone;
    };
    match kill(target, None) {
        Ok(()) | Err(Errno::EPERM) => {}
        Err(_) => return Liveness::Gone,
    }
    match proc_stat::read(pid) {
        Some(stat) if stat.is_zombie() => Liveness::Gone,
        Some(stat) => Liveness::Alive {
            start_token: Some(stat.start_time),
        },
        None => Liveness::Alive { start_token: None },
    }
}

/// Sends `signal` to `pid`, distinguishing a missing process from a
/// refused signal.
pub fn send(pid: u32, signal: Signal) -> io::Result<SignalOutcome> {
    let Some(target) = target(pid) else {
        return Ok(SignalOutcome::AlreadyGone);
    };
    match kill(target, signal) {
        Ok(()) => {
            tracing::debug!(pid, %signal, "signal delivered");
            Ok(SignalOutcome::Delivered)
        }
        Err(Errno::ESRCH) => Ok(SignalOutcome::AlreadyGone),
        Err(Errno::EPERM) => Ok(SignalOutcome::Denied),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

impl ProcessControl for UnixProcess {
    fn probe(&self, pid: u32) -> Liveness {
        probe(pid)
    }

    fn terminate(&self, pid: u32) -> io::Result<SignalOutcome> {
        send(pid, Signal::SIGTERM)
    }

    fn kill(&self, pid: u32) -> io::Result<SignalOutcome> {
        send(pid, Signal::SIGKILL)
    }

    fn spawn_detached(&self, spec: &LaunchSpec) -> io::Result<Spawned> {
        spawn::spawn_detached(spec)
    }

    fn run_hook(&self, spec: &HookSpec) -> io::Result<HookExit> {
        spawn::run_hook(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_zero_and_oversized_pids_are_never_targets() {
        assert_eq!(target(0), None);
        assert_eq!(target(u32::MAX), None);
        assert_eq!(target(42), Some(Pid::from_raw(42)));
    }

    #[test]
    fn pid_zero_is_gone_and_not_signalled() {
        assert_eq!(probe(0), Liveness::Gone);
        assert_eq!(send(0, Signal::SIGTERM).unwrap(), SignalOutcome::AlreadyGone);
    }

    #[test]
    fn own_process_is_alive() {
        assert!(matches!(probe(std::process::id()), Liveness::Alive { .. }));
    }
}
