use std::path::Path;

use botctl_core::{StopOutcome, SupervisorError};

pub fn execute(config: Option<&Path>) -> Result<(), SupervisorError> {
    let supervisor = super::supervisor(config)?;

    match supervisor.stop()? {
        StopOutcome::Signalled(record) => println!("Bot stopped (sent SIGTERM to PID {}).", record.pid),
        StopOutcome::AlreadyGone(record) => println!("Bot already exited (PID {}).", record.pid),
        StopOutcome::NotRunning => println!("Bot is not running."),
    }
    Ok(())
}
