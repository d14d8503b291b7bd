use std::path::Path;

use botctl_core::{ProcessState, StatusReport, SupervisorError};

pub fn execute(config: Option<&Path>, json: bool) -> Result<(), SupervisorError> {
    let supervisor = super::supervisor(config)?;
    let state = supervisor.status()?;

    if json {
        let report = StatusReport::new(&state, supervisor.paths());
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Error: could not encode status: {e}");
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    match state {
        ProcessState::Running(record) => println!("Bot is running (PID: {}).", record.pid),
        ProcessState::NotRunning => println!("Bot is not running."),
        ProcessState::Stale { record, .. } => match record {
            Some(record) => println!(
                "Bot is not running (cleaned up stale record for PID {}).",
                record.pid
            ),
            None => println!("Bot is not running (cleaned up unreadable record)."),
        },
    }
    Ok(())
}
