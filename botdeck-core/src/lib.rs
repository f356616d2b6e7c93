//! Botdeck core library: domain types, configuration persistence, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and configuration structs
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / save / init / validate

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{AuthConfig, BotConfig, BotId, DashboardConfig, StoreConfig};
