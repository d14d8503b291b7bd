use std::path::{Path, PathBuf};

use super::Config;

/// File name looked up in the current directory before the user config.
pub const LOCAL_CONFIG_NAME: &str = "botctl.toml";

/// A parsed configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// `None` when built-in defaults are in use.
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory that relative paths in the config are resolved against:
    /// the config file's directory, or the current directory for defaults.
    pub fn base_dir(&self) -> std::io::Result<PathBuf> {
        match self.path.as_deref().and_then(Path::parent) {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.to_path_buf()),
            _ => std::env::current_dir(),
        }
    }
}

/// Returns the config directory: `~/.config/botctl/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("botctl"))
}

/// Returns the user config file path: `~/.config/botctl/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Picks the config file to use.
///
/// An explicit path always wins. Otherwise `./botctl.toml` is preferred
/// over the user config; `None` means no file exists and defaults apply.
pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG_NAME);
    if local.is_file() {
        return Some(local);
    }
    config_path().filter(|p| p.is_file())
}

/// Tries to load, parse, and validate the config file at `path`.
///
/// Returns an error string describing what went wrong (IO error, parse
/// error, invalid value).
pub fn try_load_from(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut config: Config =
        toml::from_str(&content).map_err(|e| format!("{}: {e}", path.display()))?;
    config
        .validate()
        .map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(config)
}

/// Loads the configuration.
///
/// An explicitly requested file must exist and be valid. An implicitly
/// discovered file that fails to parse is reported and defaults are used.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, String> {
    let Some(path) = locate(explicit) else {
        return Ok(LoadedConfig {
            config: Config::default(),
            path: None,
        });
    };

    match try_load_from(&path) {
        Ok(config) => Ok(LoadedConfig {
            config,
            path: Some(path),
        }),
        Err(e) if explicit.is_some() => Err(e),
        Err(e) => {
            eprintln!("Warning: {e} (using defaults)");
            Ok(LoadedConfig {
                config: Config::default(),
                path: None,
            })
        }
    }
}
