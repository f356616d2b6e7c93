//! `botdeck serve [--config <path>]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

/// Run the dashboard HTTP service until ctrl-c / SIGTERM.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Config file to use instead of ~/.botdeck/config.yaml.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let (_, config) = super::load_config(self.config.as_deref())?;
        botdeck_server::start_blocking(config).context("server exited with error")
    }
}
