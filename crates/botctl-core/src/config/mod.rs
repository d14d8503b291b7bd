mod loader;
pub mod template;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::log::LogConfig;
use crate::process::{HookSpec, LaunchSpec};

pub use loader::{LoadedConfig, LOCAL_CONFIG_NAME, config_dir, config_path, load, locate, try_load_from};

/// Top-level configuration for botctl.
///
/// Loaded from `botctl.toml` (or `~/.config/botctl/config.toml`).
/// Missing sections fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application directory settings.
    pub app: AppConfig,
    /// The managed bot process.
    pub process: ProcessConfig,
    /// Pre-start migration hook.
    pub migration: MigrationConfig,
    /// Stop and grace-period behaviour.
    pub stop: StopConfig,
    /// Supervisor log output.
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Working directory of the bot. Relative paths are resolved against
    /// the directory containing the config file.
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Entry point executable.
    pub program: String,
    /// Arguments passed to `program`.
    pub args: Vec<String>,
    /// File that receives the bot's stdout and stderr (appended).
    pub log_file: PathBuf,
    /// Lifecycle Record location.
    pub record_file: PathBuf,
    /// Rotate `log_file` before launch once it exceeds this size. 0 disables.
    pub max_log_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Migration tool executable.
    pub program: String,
    /// Arguments passed to `program`.
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StopConfig {
    /// Longest time a restart waits for the old process to exit.
    pub grace_period_secs: u64,
    /// How often liveness is re-checked during the grace period.
    pub poll_interval_ms: u64,
    /// Send SIGKILL when the old process outlives the grace period.
    pub force_kill: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { root: ".".into() }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            program: "python3".into(),
            args: vec!["main.py".into()],
            log_file: "bot.log".into(),
            record_file: "bot.pid".into(),
            max_log_mb: 50,
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            program: "alembic".into(),
            args: vec!["upgrade".into(), "head".into()],
        }
    }
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 3,
            poll_interval_ms: 100,
            force_kill: false,
        }
    }
}

/// Absolute locations derived from a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root: PathBuf,
    pub record: PathBuf,
    pub lock: PathBuf,
    pub log: PathBuf,
}

impl Config {
    /// Clamps timing values to safe ranges and rejects unusable settings.
    pub fn validate(&mut self) -> Result<(), String> {
        self.stop.grace_period_secs = self.stop.grace_period_secs.min(300);
        self.stop.poll_interval_ms = self.stop.poll_interval_ms.clamp(10, 5000);

        if self.process.program.trim().is_empty() {
            return Err("process.program must not be empty".into());
        }
        if self.process.record_file.as_os_str().is_empty() {
            return Err("process.record_file must not be empty".into());
        }
        if self.process.log_file.as_os_str().is_empty() {
            return Err("process.log_file must not be empty".into());
        }
        Ok(())
    }

    /// Resolves every configured path against `base`.
    ///
    /// `app.root` is taken relative to `base`; the record, lock, and
    /// log files are taken relative to the resolved root.
    pub fn paths(&self, base: &Path) -> Paths {
        let root = base.join(&self.app.root);
        let record = root.join(&self.process.record_file);
        let mut lock = record.clone().into_os_string();
        lock.push(".lock");
        Paths {
            log: root.join(&self.process.log_file),
            lock: PathBuf::from(lock),
            record,
            root,
        }
    }

    /// Builds the launch description for the managed process.
    pub fn launch_spec(&self, paths: &Paths) -> LaunchSpec {
        LaunchSpec {
            program: self.process.program.clone(),
            args: self.process.args.clone(),
            cwd: paths.root.clone(),
            log: paths.log.clone(),
        }
    }

    /// Builds the migration hook description, if one is configured.
    pub fn migration_hook(&self, paths: &Paths) -> Option<HookSpec> {
        if self.migration.program.trim().is_empty() {
            return None;
        }
        Some(HookSpec {
            program: self.migration.program.clone(),
            args: self.migration.args.clone(),
            cwd: paths.root.clone(),
        })
    }
}
