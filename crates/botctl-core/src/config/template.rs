/// Generates the default `botctl.toml` contents with explanatory comments.
///
/// Used by `botctl init` to create a starter config file that operators
/// can immediately edit.
pub fn generate_config() -> String {
    r##"# botctl configuration
# Location: ./botctl.toml or ~/.config/botctl/config.toml

[app]
# Working directory of the bot. Relative to this file.
root = "."

[process]
# Entry point of the bot, started detached from the terminal.
program = "python3"
args = ["main.py"]
# stdout and stderr of the bot are appended here (relative to root).
log_file = "bot.log"
# Lifecycle record holding the PID of the running bot (relative to root).
record_file = "bot.pid"
# Rotate log_file to log_file.1 before launch once it grows past this size.
# Set to 0 to never rotate.
max_log_mb = 50

[migration]
# Run by `botctl restart-with-migration` before the bot starts.
# A non-zero exit aborts the restart and nothing is launched.
program = "alembic"
args = ["upgrade", "head"]

[stop]
# Seconds a restart waits for the old bot to exit after SIGTERM.
grace_period_secs = 3
# How often (milliseconds) the old bot is checked during that wait.
poll_interval_ms = 100
# Send SIGKILL if the old bot is still alive after the grace period.
force_kill = false

[logging]
# Minimum log level: "debug", "info", "warn", or "error".
# RUST_LOG overrides this when set.
level = "info"
# Emit JSON lines instead of human-readable output.
json = false
"##
    .to_string()
}
