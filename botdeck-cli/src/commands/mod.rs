pub mod bots;
pub mod config;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use botdeck_core::{config as core_config, DashboardConfig};

/// Load `path` if given, else `~/.botdeck/config.yaml`, then apply `$PORT`.
pub(crate) fn load_config(path: Option<&Path>) -> Result<(PathBuf, DashboardConfig)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => core_config::config_path().context("could not determine home directory")?,
    };
    let mut cfg = core_config::load_from(&path).with_context(|| {
        format!(
            "failed to load {}; run `botdeck config init` first",
            path.display()
        )
    })?;
    core_config::apply_env_overrides(&mut cfg).context("invalid PORT override")?;
    Ok((path, cfg))
}
