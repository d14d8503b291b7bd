use std::path::Path;

use botctl_core::config::{self, template};

/// Creates a commented config file.
///
/// Writes to `--config` when given, otherwise `./botctl.toml`. An
/// existing file is never overwritten.
pub fn execute(explicit: Option<&Path>) {
    let path = explicit.unwrap_or(Path::new(config::LOCAL_CONFIG_NAME));

    if path.exists() {
        println!("Already exists: {}", path.display());
        return;
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("Error: could not create {}: {e}", parent.display());
        std::process::exit(1);
    }

    match std::fs::write(path, template::generate_config()) {
        Ok(()) => {
            println!("Created {}", path.display());
            println!("\nEdit it to point botctl at your bot's entry point and migration tool.");
        }
        Err(e) => {
            eprintln!("Error: could not write {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}
