mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "botctl",
    version,
    about = "Start, stop, and restart a long-running bot process"
)]
struct Cli {
    /// Config file (default: ./botctl.toml, then ~/.config/botctl/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a commented botctl.toml
    Init,
    /// Stop the running bot (if any) and start a new instance
    Start,
    /// Stop the running bot
    Stop,
    /// Stop the bot, run the migration, then start a new instance
    RestartWithMigration,
    /// Show whether the bot is running
    Status {
        /// Print a JSON report instead of a sentence
        #[arg(long)]
        json: bool,
    },
    /// Check configuration, paths, and programs
    Doctor,
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init => {
            commands::init::execute(config);
            Ok(())
        }
        Commands::Doctor => {
            commands::doctor::execute(config);
            Ok(())
        }
        Commands::Start => commands::start::execute(config, false),
        Commands::RestartWithMigration => commands::start::execute(config, true),
        Commands::Stop => commands::stop::execute(config),
        Commands::Status { json } => commands::status::execute(config, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
