//! End-to-end supervisor scenarios with real processes.

#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use botctl_core::{
    Config, Departure, Liveness, ProcessControl, ProcessState, StartOptions, Supervisor,
    SupervisorError,
};
use botctl_unix::UnixProcess;

fn config() -> Config {
    let mut config = Config::default();
    config.process.program = "sleep".into();
    config.process.args = vec!["30".into()];
    config.migration.program = "sh".into();
    config.migration.args = vec!["-c".into(), "exit 0".into()];
    config.stop.grace_period_secs = 5;
    config.stop.poll_interval_ms = 20;
    config
}

fn supervisor(config: &Config, dir: &Path) -> Supervisor<UnixProcess> {
    Supervisor::new(config, config.paths(dir), UnixProcess::new())
}

fn gone_within(pid: u32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if UnixProcess::new().probe(pid) == Liveness::Gone {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn start_status_stop_round() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let sup = supervisor(&config(), dir.path());

    // Act
    let launched = sup.start(StartOptions::default()).unwrap();

    // Assert
    let contents = fs::read_to_string(&sup.paths().record).unwrap();
    assert_eq!(contents.lines().next(), Some(launched.record.pid.to_string().as_str()));
    assert_eq!(sup.status().unwrap(), ProcessState::Running(launched.record));

    sup.stop().unwrap();
    assert_eq!(sup.status().unwrap(), ProcessState::NotRunning);
    assert!(gone_within(launched.record.pid, Duration::from_secs(5)));
}

#[test]
fn restart_yields_new_pid_and_old_one_exits() {
    let dir = tempfile::tempdir().unwrap();
    let sup = supervisor(&config(), dir.path());
    let first = sup.start(StartOptions::default()).unwrap();

    let second = sup.restart_with_migration().unwrap();

    assert_ne!(first.record.pid, second.record.pid);
    let replaced = second.replaced.unwrap();
    assert_eq!(replaced.pid, first.record.pid);
    assert_eq!(replaced.departure, Departure::Exited);
    assert_eq!(sup.status().unwrap().pid(), Some(second.record.pid));

    sup.stop().unwrap();
}

#[test]
fn stale_record_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let sup = supervisor(&config(), dir.path());
    fs::write(&sup.paths().record, "4194400").unwrap();

    let state = sup.status().unwrap();

    assert!(!state.is_running());
    assert!(!sup.paths().record.exists());
    assert_eq!(sup.status().unwrap(), ProcessState::NotRunning);
}

#[test]
fn failing_migration_leaves_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.migration.args = vec!["-c".into(), "exit 7".into()];
    let sup = supervisor(&config, dir.path());

    let err = sup.restart_with_migration().unwrap_err();

    assert!(matches!(err, SupervisorError::MigrationFailed { code: Some(7) }));
    assert!(!sup.paths().record.exists());
}
