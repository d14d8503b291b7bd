//! Integration tests against real processes.
//!
//! These spawn short-lived `sleep` and `sh` processes and require a
//! Linux `/proc` filesystem.

#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use botctl_core::{HookSpec, LaunchSpec, Liveness, ProcessControl, SignalOutcome};
use botctl_unix::UnixProcess;

fn launch(program: &str, args: &[&str], dir: &Path) -> LaunchSpec {
    LaunchSpec {
        program: program.into(),
        args: args.iter().map(|a| a.to_string()).collect(),
        cwd: dir.to_path_buf(),
        log: dir.join("logs").join("bot.log"),
    }
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    done()
}

#[test]
fn detached_process_is_alive_and_terminates_on_sigterm() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let os = UnixProcess::new();

    // Act
    let spawned = os.spawn_detached(&launch("sleep", &["30"], dir.path())).unwrap();

    // Assert
    assert!(spawned.start_token.is_some());
    assert_eq!(
        os.probe(spawned.pid),
        Liveness::Alive {
            start_token: spawned.start_token
        }
    );
    assert_eq!(os.terminate(spawned.pid).unwrap(), SignalOutcome::Delivered);
    assert!(wait_until(Duration::from_secs(5), || {
        os.probe(spawned.pid) == Liveness::Gone
    }));
}

#[test]
fn detached_process_leads_its_own_session() {
    let dir = tempfile::tempdir().unwrap();
    let os = UnixProcess::new();

    let spawned = os.spawn_detached(&launch("sleep", &["30"], dir.path())).unwrap();
    let pid = nix::unistd::Pid::from_raw(spawned.pid as i32);
    let sid = nix::unistd::getsid(Some(pid)).unwrap();

    assert_eq!(sid, pid);
    let _ = os.kill(spawned.pid);
}

#[test]
fn output_is_appended_to_log() {
    let dir = tempfile::tempdir().unwrap();
    let os = UnixProcess::new();
    let spec = launch("sh", &["-c", "echo out; echo err >&2"], dir.path());
    fs::create_dir_all(dir.path().join("logs")).unwrap();
    fs::write(&spec.log, "previous run\n").unwrap();

    os.spawn_detached(&spec).unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        let log = fs::read_to_string(&spec.log).unwrap_or_default();
        log.contains("out") && log.contains("err")
    }));
    let log = fs::read_to_string(&spec.log).unwrap();
    assert!(log.starts_with("previous run\n"));
}

#[test]
fn missing_program_fails_to_launch() {
    let dir = tempfile::tempdir().unwrap();
    let os = UnixProcess::new();

    let result = os.spawn_detached(&launch("botctl-no-such-program", &[], dir.path()));

    assert!(result.is_err());
}

#[test]
fn unused_pid_is_gone() {
    let os = UnixProcess::new();
    // Above the kernel's PID_MAX_LIMIT (4194304), so never allocated.
    let pid = 4_194_400;

    assert_eq!(os.probe(pid), Liveness::Gone);
    assert_eq!(os.terminate(pid).unwrap(), SignalOutcome::AlreadyGone);
}

#[test]
fn hook_reports_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let os = UnixProcess::new();
    let hook = |script: &str| HookSpec {
        program: "sh".into(),
        args: vec!["-c".into(), script.into()],
        cwd: dir.path().to_path_buf(),
    };

    assert!(os.run_hook(&hook("exit 0")).unwrap().success());
    assert_eq!(os.run_hook(&hook("exit 3")).unwrap().code, Some(3));
}

#[test]
fn hook_runs_in_app_root() {
    let dir = tempfile::tempdir().unwrap();
    let os = UnixProcess::new();
    let hook = HookSpec {
        program: "sh".into(),
        args: vec!["-c".into(), "touch migrated".into()],
        cwd: dir.path().to_path_buf(),
    };

    os.run_hook(&hook).unwrap();

    assert!(dir.path().join("migrated").exists());
}

#[test]
fn missing_hook_program_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let os = UnixProcess::new();
    let hook = HookSpec {
        program: "botctl-no-such-migration".into(),
        args: Vec::new(),
        cwd: dir.path().to_path_buf(),
    };

    assert!(os.run_hook(&hook).is_err());
}
