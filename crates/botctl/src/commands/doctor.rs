use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use botctl_core::config::{self, Config, Paths};
use botctl_core::{ProcessState, Supervisor};
use botctl_unix::UnixProcess;

/// ANSI escape helpers for doctor output.
const OK: &str = "\x1b[32m[ok]\x1b[0m";
const WARN: &str = "\x1b[33m[warn]\x1b[0m";
const FAIL: &str = "\x1b[31m[fail]\x1b[0m";
const FIXED: &str = "\x1b[36m[fixed]\x1b[0m";

pub fn execute(explicit: Option<&Path>) {
    println!();
    let Some(config) = check_config_file(explicit) else {
        println!();
        return;
    };
    let base = match config.base_dir() {
        Ok(base) => base,
        Err(e) => {
            println!("  {FAIL} Cannot resolve working directory: {e}");
            return;
        }
    };
    let paths = config.config.paths(&base);

    check_root(&paths);
    check_program("Bot", &config.config.process.program, &paths.root);
    check_migration(&config.config, &paths.root);
    check_record_dir(&paths);
    check_process(&config.config, paths);
    println!();
}

fn check_config_file(explicit: Option<&Path>) -> Option<config::LoadedConfig> {
    let Some(path) = config::locate(explicit) else {
        println!("  {WARN} No config file found (using defaults; run 'botctl init')");
        return config::load(None).ok();
    };
    match config::try_load_from(&path) {
        Ok(_) => println!("  {OK} {} is valid", path.display()),
        Err(e) => {
            println!("  {FAIL} {e}");
            return None;
        }
    }
    config::load(Some(&path)).ok()
}

fn check_root(paths: &Paths) {
    if paths.root.is_dir() {
        println!("  {OK} App root exists ({})", paths.root.display());
    } else {
        println!("  {FAIL} App root does not exist ({})", paths.root.display());
    }
}

fn check_program(label: &str, program: &str, root: &Path) {
    match resolve_program(program, root) {
        Some(path) => println!("  {OK} {label} program found ({})", path.display()),
        None => println!("  {FAIL} {label} program not found or not executable: {program}"),
    }
}

fn check_migration(config: &Config, root: &Path) {
    if config.migration.program.trim().is_empty() {
        println!("  {WARN} No migration command configured");
        return;
    }
    check_program("Migration", &config.migration.program, root);
}

fn check_record_dir(paths: &Paths) {
    let dir = paths.record.parent().unwrap_or(Path::new("."));
    match std::fs::metadata(dir) {
        Ok(meta) if meta.permissions().readonly() => {
            println!("  {FAIL} Record directory is read-only ({})", dir.display());
        }
        Ok(_) => println!("  {OK} Record directory is writable ({})", dir.display()),
        Err(_) => println!(
            "  {WARN} Record directory missing, will be created ({})",
            dir.display()
        ),
    }
}

fn check_process(config: &Config, paths: Paths) {
    let supervisor = Supervisor::new(config, paths, UnixProcess::new());
    match supervisor.status() {
        Ok(ProcessState::Running(record)) => {
            println!("  {OK} Bot is running (PID: {})", record.pid);
        }
        Ok(ProcessState::NotRunning) => println!("  {WARN} Bot is not running"),
        Ok(ProcessState::Stale { record, .. }) => match record {
            Some(record) => println!("  {FIXED} Removed stale record (PID: {})", record.pid),
            None => println!("  {FIXED} Removed unreadable record"),
        },
        Err(e) => println!("  {FAIL} Could not determine bot state: {e}"),
    }
}

/// Finds `program` the way `exec` would: paths containing `/` are taken
/// relative to the app root, bare names are looked up on `PATH`.
fn resolve_program(program: &str, root: &Path) -> Option<PathBuf> {
    if program.contains('/') {
        let path = root.join(program);
        return is_executable(&path).then_some(path);
    }
    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_shell_on_path() {
        assert!(resolve_program("sh", Path::new("/")).is_some());
    }

    #[test]
    fn missing_program_is_not_found() {
        assert!(resolve_program("botctl-no-such-program", Path::new("/")).is_none());
    }

    #[test]
    fn relative_path_resolves_against_root() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.sh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(
            resolve_program("./run.sh", dir.path()),
            Some(dir.path().join("./run.sh"))
        );
    }

    #[test]
    fn non_executable_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("notes.txt");
        std::fs::write(&script, "hello").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

        assert!(resolve_program("./notes.txt", dir.path()).is_none());
    }
}
