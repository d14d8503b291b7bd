use std::fs::{self, OpenOptions};
use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use botctl_core::{HookExit, HookSpec, LaunchSpec, Spawned};
use nix::unistd::setsid;

use crate::proc_stat;

/// Launches `spec` in a new session with stdout and stderr appended to
/// `spec.log`, and returns without waiting.
///
/// The child becomes a session leader with no controlling terminal, so
/// it survives the invoking shell and botctl's own exit.
pub fn spawn_detached(spec: &LaunchSpec) -> io::Result<Spawned> {
    if let Some(parent) = spec.log.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let stdout = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&spec.log)?;
    let stderr = stdout.try_clone()?;

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .current_dir(&spec.cwd)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr);

    // SAFETY: the closure runs in the forked child before exec and only
    // calls setsid(2), which is async-signal-safe and allocates nothing.
    unsafe {
        cmd.pre_exec(|| setsid().map(drop).map_err(io::Error::from));
    }

    let child = cmd.spawn()?;
    let pid = child.id();
    // The fork already happened, so the start time is final even if exec
    // is still in progress.
    let start_token = proc_stat::read(pid).map(|stat| stat.start_time);
    tracing::debug!(pid, ?start_token, program = %spec.program, "spawned detached");

    // Dropping `Child` neither waits for nor kills the process.
    drop(child);

    Ok(Spawned { pid, start_token })
}

/// Runs `spec` to completion, inheriting stdio and environment.
pub fn run_hook(spec: &HookSpec) -> io::Result<HookExit> {
    let status = Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(&spec.cwd)
        .status()?;
    tracing::debug!(program = %spec.program, ?status, "hook finished");
    Ok(HookExit {
        code: status.code(),
    })
}
