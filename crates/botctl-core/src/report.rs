use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Paths;
use crate::supervisor::{ProcessState, StaleReason};

/// Machine-readable snapshot printed by `botctl status --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    pub state: State,
    /// PID of the running instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// For a stale record: why it was discarded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
    pub record: PathBuf,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Running,
    NotRunning,
    Stale,
}

impl StatusReport {
    pub fn new(state: &ProcessState, paths: &Paths) -> Self {
        let (kind, pid, stale_reason) = match state {
            ProcessState::Running(record) => (State::Running, Some(record.pid), None),
            ProcessState::NotRunning => (State::NotRunning, None, None),
            ProcessState::Stale { record, reason } => {
                let reason = match reason {
                    StaleReason::Exited => "exited",
                    StaleReason::PidReused => "pid_reused",
                    StaleReason::Corrupt => "corrupt",
                };
                let stale_pid = record.map(|r| r.pid);
                let reason = match stale_pid {
                    Some(pid) => format!("{reason} (pid {pid})"),
                    None => reason.to_string(),
                };
                (State::Stale, None, Some(reason))
            }
        };
        Self {
            state: kind,
            pid,
            stale_reason,
            record: paths.record.clone(),
            log_file: paths.log.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{Config, LifecycleRecord};

    fn paths() -> Paths {
        Config::default().paths(Path::new("/srv/bot"))
    }

    #[test]
    fn running_report_serializes_pid() {
        let state = ProcessState::Running(LifecycleRecord::new(99, Some(1)));

        let json = serde_json::to_value(StatusReport::new(&state, &paths())).unwrap();

        assert_eq!(json["state"], "running");
        assert_eq!(json["pid"], 99);
        assert!(json.get("stale_reason").is_none());
    }

    #[test]
    fn stale_report_explains_reason() {
        let state = ProcessState::Stale {
            record: Some(LifecycleRecord::new(12345, None)),
            reason: StaleReason::Exited,
        };

        let report = StatusReport::new(&state, &paths());

        assert_eq!(report.state, State::Stale);
        assert_eq!(report.pid, None);
        assert_eq!(report.stale_reason.as_deref(), Some("exited (pid 12345)"));
    }

    #[test]
    fn not_running_report_has_paths() {
        let report = StatusReport::new(&ProcessState::NotRunning, &paths());

        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("\"not_running\""));
        assert!(json.contains("bot.pid"));
    }
}
