//! `botdeck config init|check|show`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use botdeck_core::{config, ConfigError, DashboardConfig};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write ~/.botdeck/config.yaml with the stock bot entries.
    Init(InitArgs),
    /// Load and validate the configuration.
    Check(PathArgs),
    /// Print the effective configuration.
    Show(PathArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Config file to use instead of ~/.botdeck/config.yaml.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Tabled)]
struct BotRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "command")]
    command: String,
    #[tabled(rename = "directory")]
    directory: String,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init(args) => init(args),
        ConfigCommand::Check(args) => check(args),
        ConfigCommand::Show(args) => show(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    match config::init(args.force) {
        Ok((path, cfg)) => {
            println!("✓ Wrote {}", path.display());
            println!("  {} bots configured; edit their paths before starting them.", cfg.bots.len());
            println!("  Add a token under auth.tokens to protect the API.");
            Ok(())
        }
        Err(ConfigError::AlreadyExists { path }) => Err(anyhow::anyhow!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        )),
        Err(err) => Err(err).context("failed to write config"),
    }
}

fn check(args: PathArgs) -> Result<()> {
    let (path, cfg) = super::load_config(args.config.as_deref())?;
    println!(
        "✓ {} is valid ({} bots, listening on {})",
        path.display(),
        cfg.bots.len(),
        cfg.listen
    );
    for bot in &cfg.bots {
        if !bot.path.is_dir() {
            println!(
                "  {} {}: directory {} does not exist",
                "warning".yellow(),
                bot.id,
                bot.path.display()
            );
        }
    }
    Ok(())
}

fn show(args: PathArgs) -> Result<()> {
    let (path, cfg) = super::load_config(args.config.as_deref())?;
    print_config(&path, &cfg);
    Ok(())
}

fn print_config(path: &std::path::Path, cfg: &DashboardConfig) {
    println!("{} {}", "config:".bold(), path.display());
    println!("{} {}", "listen:".bold(), cfg.listen);
    let auth = if cfg.auth.is_open() {
        "open (no tokens)".red().to_string()
    } else {
        format!("{} token(s)", cfg.auth.tokens.len())
    };
    println!("{} {}", "auth:".bold(), auth);
    match &cfg.store {
        Some(store) => println!("{} {}", "store:".bold(), store.path.display()),
        None => println!("{} in-memory (empty)", "store:".bold()),
    }
    println!("{} {}", "stop bots on shutdown:".bold(), cfg.stop_bots_on_shutdown);

    if cfg.bots.is_empty() {
        println!("No bots configured.");
        return;
    }
    let rows: Vec<BotRow> = cfg
        .bots
        .iter()
        .map(|bot| BotRow {
            id: bot.id.to_string(),
            name: bot.name.clone(),
            command: bot.command_line(),
            directory: bot.path.display().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
