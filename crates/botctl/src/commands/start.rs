use std::path::Path;

use botctl_core::{Departure, StartOptions, SupervisorError};

pub fn execute(config: Option<&Path>, migrate: bool) -> Result<(), SupervisorError> {
    let supervisor = super::supervisor(config)?;

    let launched = supervisor.start(StartOptions { migrate })?;

    if let Some(old) = launched.replaced {
        match old.departure {
            Departure::Exited => println!("Stopped previous bot (PID: {}).", old.pid),
            Departure::Killed => println!("Killed previous bot (PID: {}).", old.pid),
            Departure::Lingering => println!(
                "Previous bot (PID: {}) was signalled but has not exited yet.",
                old.pid
            ),
        }
    }
    if launched.migrated {
        println!("Migration complete.");
    }
    println!(
        "Bot started (PID: {}). Output: {}",
        launched.record.pid,
        supervisor.paths().log.display()
    );
    Ok(())
}
