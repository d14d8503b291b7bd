pub mod doctor;
pub mod init;
pub mod start;
pub mod status;
pub mod stop;

use std::path::Path;

use botctl_core::config::{self, LoadedConfig};
use botctl_core::{Supervisor, SupervisorError};
use botctl_unix::UnixProcess;

/// Loads the config and starts logging.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, SupervisorError> {
    let loaded = config::load(explicit).map_err(SupervisorError::Config)?;
    botctl_core::log::init(&loaded.config.logging);
    match &loaded.path {
        Some(path) => tracing::debug!(config = %path.display(), "config loaded"),
        None => tracing::debug!("no config file found, using defaults"),
    }
    Ok(loaded)
}

/// Builds the supervisor for the configured bot.
pub fn supervisor(explicit: Option<&Path>) -> Result<Supervisor<UnixProcess>, SupervisorError> {
    let loaded = load(explicit)?;
    let base = loaded
        .base_dir()
        .map_err(|e| SupervisorError::Config(format!("cannot resolve working directory: {e}")))?;
    let paths = loaded.config.paths(&base);
    Ok(Supervisor::new(&loaded.config, paths, UnixProcess::new()))
}
