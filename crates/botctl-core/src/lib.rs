pub mod config;
pub mod error;
pub mod lock;
pub mod log;
pub mod process;
pub mod record;
pub mod report;
pub mod supervisor;

pub use config::{Config, Paths};
pub use error::{Result, SupervisorError};
pub use process::{HookExit, HookSpec, LaunchSpec, Liveness, ProcessControl, SignalOutcome, Spawned};
pub use record::{LifecycleRecord, RecordStore};
pub use report::StatusReport;
pub use supervisor::{
    Departure, Launched, ProcessState, Replaced, StaleReason, StartOptions, StopOutcome, Supervisor,
};
