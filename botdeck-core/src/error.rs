//! Error types for botdeck-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::BotId;

/// All errors that can arise from loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, including file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`; `~/.botdeck/` cannot be located.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// `init` refused to overwrite an existing file.
    #[error("config already exists at {path}")]
    AlreadyExists { path: PathBuf },

    #[error("bot id '{id}' is invalid: {reason}")]
    InvalidBotId { id: String, reason: &'static str },

    #[error("bot id '{0}' is configured more than once")]
    DuplicateBot(BotId),

    #[error("bot '{id}' is missing a {field}")]
    MissingField { id: BotId, field: &'static str },

    #[error("invalid PORT override '{0}'")]
    InvalidPort(String),
}
