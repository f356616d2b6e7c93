//! Botdeck: Discord bot dashboard service and control CLI.
//!
//! # Usage
//!
//! ```text
//! botdeck serve [--config <path>]
//! botdeck config init [--force]
//! botdeck config check|show [--config <path>]
//! botdeck bots status [--json] [--url <url>] [--token <token>]
//! botdeck bots start|stop <id> [--url <url>] [--token <token>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{bots::BotsCommand, config::ConfigCommand, serve::ServeArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "botdeck",
    version,
    about = "Run the bot dashboard and control its bot processes",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the dashboard HTTP service in the foreground.
    Serve(ServeArgs),

    /// Create, validate or print the dashboard configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Query and control bots through a running dashboard.
    Bots {
        #[command(subcommand)]
        command: BotsCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
        Commands::Bots { command } => commands::bots::run(command),
    }
}
