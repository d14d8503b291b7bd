//! Lifecycle of the single managed bot process.
//!
//! All operations run under [`SupervisorLock`]. State transitions:
//!
//! ```text
//! NotRunning --start--> Running
//! Running    --stop---> NotRunning
//! Running    --start--> Running (new PID, old one signalled first)
//! Running    --crash--> Stale --(next status/stop/start)--> NotRunning
//! ```
//!
//! Nothing here is transactional. If botctl is interrupted half-way the
//! system is left in whatever state the last completed step produced.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, info_span, warn};

use crate::config::{Config, Paths, StopConfig};
use crate::lock::SupervisorLock;
use crate::log;
use crate::process::{HookSpec, LaunchSpec, Liveness, ProcessControl, SignalOutcome};
use crate::record::{LifecycleRecord, RecordStore, Stored};
use crate::{Result, SupervisorError};

/// Observed state of the managed process slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// No record exists.
    NotRunning,
    /// A record existed but did not describe a live process. It has
    /// been removed; callers treat this exactly like `NotRunning`.
    Stale {
        record: Option<LifecycleRecord>,
        reason: StaleReason,
    },
    /// The recorded process is alive.
    Running(LifecycleRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// No process has the recorded PID.
    Exited,
    /// The PID belongs to a different process than the one launched.
    PidReused,
    /// The record file could not be parsed.
    Corrupt,
}

impl ProcessState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    /// PID of the live process, if any.
    pub fn pid(&self) -> Option<u32> {
        match self {
            Self::Running(record) => Some(record.pid),
            _ => None,
        }
    }
}

/// What [`Supervisor::stop`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// There was nothing to stop.
    NotRunning,
    /// SIGTERM was delivered. Exit is not awaited.
    Signalled(LifecycleRecord),
    /// The process vanished between the liveness check and the signal.
    AlreadyGone(LifecycleRecord),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Run the migration hook before launching.
    pub migrate: bool,
}

/// A successful start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Launched {
    pub record: LifecycleRecord,
    /// The instance that was stopped to make room, if any.
    pub replaced: Option<Replaced>,
    pub migrated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replaced {
    pub pid: u32,
    pub departure: Departure,
}

/// How the old instance went away during a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// Exited within the grace period.
    Exited,
    /// Had to be killed after the grace period.
    Killed,
    /// Still alive when the new instance was launched.
    Lingering,
}

/// Owns the lifecycle of exactly one managed process.
#[derive(Debug)]
pub struct Supervisor<P> {
    platform: P,
    paths: Paths,
    records: RecordStore,
    launch: LaunchSpec,
    migration: Option<HookSpec>,
    stop: StopConfig,
    max_log_bytes: u64,
}

impl<P: ProcessControl> Supervisor<P> {
    pub fn new(config: &Config, paths: Paths, platform: P) -> Self {
        Self {
            records: RecordStore::new(&paths.record),
            launch: config.launch_spec(&paths),
            migration: config.migration_hook(&paths),
            stop: config.stop.clone(),
            max_log_bytes: config.process.max_log_mb.saturating_mul(1024 * 1024),
            paths,
            platform,
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Reports the current state, removing the record if it is stale.
    pub fn status(&self) -> Result<ProcessState> {
        let _lock = self.lock()?;
        self.status_locked()
    }

    /// Sends SIGTERM to the running instance and removes its record.
    ///
    /// Idempotent: with nothing running it succeeds and leaves no record.
    /// Does not wait for the process to exit.
    pub fn stop(&self) -> Result<StopOutcome> {
        let _span = info_span!("stop").entered();
        let _lock = self.lock()?;
        self.stop_locked()
    }

    /// Stops any running instance, optionally migrates, then launches a
    /// new detached instance and records its PID.
    pub fn start(&self, options: StartOptions) -> Result<Launched> {
        let _span = info_span!("start", migrate = options.migrate).entered();

        let hook = match (options.migrate, &self.migration) {
            (false, _) => None,
            (true, Some(hook)) => Some(hook),
            (true, None) => {
                return Err(SupervisorError::Config(
                    "no migration command configured".into(),
                ));
            }
        };

        let _lock = self.lock()?;

        let replaced = match self.stop_locked()? {
            StopOutcome::Signalled(record) => Some(Replaced {
                pid: record.pid,
                departure: self.await_exit(&record),
            }),
            StopOutcome::AlreadyGone(record) => Some(Replaced {
                pid: record.pid,
                departure: Departure::Exited,
            }),
            StopOutcome::NotRunning => None,
        };

        if let Some(hook) = hook {
            self.migrate(hook)?;
        }

        self.rotate_log();

        info!(program = %self.launch.program, cwd = %self.launch.cwd.display(), "launching");
        let spawned = self
            .platform
            .spawn_detached(&self.launch)
            .map_err(|source| SupervisorError::LaunchFailed {
                program: self.launch.program.clone(),
                source,
            })?;

        let record = LifecycleRecord::new(spawned.pid, spawned.start_token);
        if let Err(source) = self.records.write(&record) {
            error!(pid = spawned.pid, "launched but could not write record");
            return Err(SupervisorError::Untracked {
                pid: spawned.pid,
                path: self.records.path().to_path_buf(),
                source,
            });
        }
        info!(pid = record.pid, log = %self.launch.log.display(), "launched");

        Ok(Launched {
            record,
            replaced,
            migrated: options.migrate,
        })
    }

    /// Plain restart: stop, then start without migrating.
    pub fn restart(&self) -> Result<Launched> {
        self.start(StartOptions { migrate: false })
    }

    /// Stop, migrate, then start.
    pub fn restart_with_migration(&self) -> Result<Launched> {
        self.start(StartOptions { migrate: true })
    }

    fn lock(&self) -> Result<SupervisorLock> {
        SupervisorLock::acquire(&self.paths.lock)
    }

    fn status_locked(&self) -> Result<ProcessState> {
        let record = match self.records.load()? {
            Stored::Missing => return Ok(ProcessState::NotRunning),
            Stored::Corrupt(reason) => {
                warn!(record = %self.records.path().display(), %reason, "removing unreadable record");
                self.records.remove()?;
                return Ok(ProcessState::Stale {
                    record: None,
                    reason: StaleReason::Corrupt,
                });
            }
            Stored::Record(record) => record,
        };

        match self.identify(&record) {
            None => Ok(ProcessState::Running(record)),
            Some(reason) => {
                info!(pid = record.pid, ?reason, "removing stale record");
                self.records.remove()?;
                Ok(ProcessState::Stale {
                    record: Some(record),
                    reason,
                })
            }
        }
    }

    /// Returns why `record` no longer describes our process, or `None`
    /// if it still does.
    fn identify(&self, record: &LifecycleRecord) -> Option<StaleReason> {
        match self.platform.probe(record.pid) {
            Liveness::Gone => Some(StaleReason::Exited),
            Liveness::Alive {
                start_token: Some(current),
            } if record.start_token.is_some_and(|expected| expected != current) => {
                Some(StaleReason::PidReused)
            }
            Liveness::Alive { .. } => None,
        }
    }

    fn stop_locked(&self) -> Result<StopOutcome> {
        let record = match self.status_locked()? {
            ProcessState::Running(record) => record,
            ProcessState::NotRunning | ProcessState::Stale { .. } => {
                self.records.remove()?;
                info!("not running");
                return Ok(StopOutcome::NotRunning);
            }
        };

        info!(pid = record.pid, "sending SIGTERM");
        let outcome = self
            .platform
            .terminate(record.pid)
            .map_err(|source| SupervisorError::Signal {
                pid: record.pid,
                source,
            })?;

        let stopped = match outcome {
            SignalOutcome::Delivered => StopOutcome::Signalled(record),
            SignalOutcome::AlreadyGone => StopOutcome::AlreadyGone(record),
            SignalOutcome::Denied => {
                warn!(pid = record.pid, "SIGTERM denied; keeping record");
                return Err(SupervisorError::SignalDenied { pid: record.pid });
            }
        };

        self.records.remove()?;
        info!(pid = record.pid, ?outcome, "stopped");
        Ok(stopped)
    }

    /// Polls for the old process to go away, escalating to SIGKILL after
    /// the grace period when configured. Best effort: never fails.
    fn await_exit(&self, record: &LifecycleRecord) -> Departure {
        let grace = Duration::from_secs(self.stop.grace_period_secs);
        if self.poll_until_gone(record, grace) {
            info!(pid = record.pid, "previous instance exited");
            return Departure::Exited;
        }

        if !self.stop.force_kill {
            warn!(pid = record.pid, ?grace, "previous instance still running after grace period");
            return Departure::Lingering;
        }

        warn!(pid = record.pid, "grace period elapsed; sending SIGKILL");
        match self.platform.kill(record.pid) {
            Ok(SignalOutcome::Delivered | SignalOutcome::AlreadyGone) => {}
            Ok(SignalOutcome::Denied) => {
                warn!(pid = record.pid, "SIGKILL denied");
                return Departure::Lingering;
            }
            Err(e) => {
                warn!(pid = record.pid, error = %e, "SIGKILL failed");
                return Departure::Lingering;
            }
        }

        if self.poll_until_gone(record, grace.max(Duration::from_secs(1))) {
            Departure::Killed
        } else {
            warn!(pid = record.pid, "previous instance survived SIGKILL");
            Departure::Lingering
        }
    }

    fn poll_until_gone(&self, record: &LifecycleRecord, limit: Duration) -> bool {
        let interval = Duration::from_millis(self.stop.poll_interval_ms);
        let deadline = Instant::now() + limit;
        loop {
            if self.identify(record).is_some() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(interval.min(deadline - now));
        }
    }

    fn migrate(&self, hook: &HookSpec) -> Result<()> {
        info!(program = %hook.program, args = ?hook.args, "running migration");
        let exit = self
            .platform
            .run_hook(hook)
            .map_err(|source| SupervisorError::MigrationSpawn {
                program: hook.program.clone(),
                source,
            })?;
        if !exit.success() {
            error!(code = ?exit.code, "migration failed; not launching");
            return Err(SupervisorError::MigrationFailed { code: exit.code });
        }
        info!("migration finished");
        Ok(())
    }

    fn rotate_log(&self) {
        match log::rotate_if_oversized(&self.launch.log, self.max_log_bytes) {
            Ok(true) => info!(log = %self.launch.log.display(), "rotated log"),
            Ok(false) => {}
            Err(e) => warn!(log = %self.launch.log.display(), error = %e, "log rotation failed"),
        }
    }
}
