//! YAML configuration for the dashboard service.
//!
//! # Storage layout
//!
//! ```text
//! ~/.botdeck/
//!   config.yaml    (mode 0600, written by `botdeck config init`)
//! ```
//!
//! # API pattern
//!
//! Every function that touches the home directory has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{AuthConfig, BotConfig, BotId, DashboardConfig};

/// Identifiers and display names of the bots written by `init`.
const TEMPLATE_BOTS: [(&str, &str); 4] = [
    ("inusual", "Inusual Boosting"),
    ("verification", "Verification Bot"),
    ("vouch", "Vouch Bot"),
    ("support", "Support Bot"),
];

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.botdeck/` (pure, no I/O).
pub fn botdeck_root_at(home: &Path) -> PathBuf {
    home.join(".botdeck")
}

/// `<home>/.botdeck/config.yaml` (pure, no I/O).
pub fn config_path_at(home: &Path) -> PathBuf {
    botdeck_root_at(home).join("config.yaml")
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load and validate the config file at `path`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_from(path: &Path) -> Result<DashboardConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let config: DashboardConfig =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
    validate(&config)?;
    Ok(config)
}

/// Load `<home>/.botdeck/config.yaml`.
pub fn load_at(home: &Path) -> Result<DashboardConfig, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<DashboardConfig, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically write `config` to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_to(path: &Path, config: &DashboardConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            set_dir_permissions(parent)?;
        }
    }
    let tmp_path = path.with_extension("yaml.tmp");
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Save to `<home>/.botdeck/config.yaml`.
pub fn save_at(home: &Path, config: &DashboardConfig) -> Result<(), ConfigError> {
    save_to(&config_path_at(home), config)
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// The config written by `init`: the four stock bots under `<home>/bots/<id>`.
pub fn template_at(home: &Path) -> DashboardConfig {
    DashboardConfig {
        auth: AuthConfig::default(),
        bots: TEMPLATE_BOTS
            .iter()
            .map(|(id, name)| BotConfig::new(*id, *name, home.join("bots").join(id)))
            .collect(),
        ..DashboardConfig::default()
    }
}

/// Write the template config to `<home>/.botdeck/config.yaml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_at(home: &Path, force: bool) -> Result<(PathBuf, DashboardConfig), ConfigError> {
    let path = config_path_at(home);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists { path });
    }
    let config = template_at(home);
    save_to(&path, &config)?;
    Ok((path, config))
}

/// `init_at` convenience wrapper.
pub fn init(force: bool) -> Result<(PathBuf, DashboardConfig), ConfigError> {
    init_at(&home()?, force)
}

// ---------------------------------------------------------------------------
// 5. Validation and overrides
// ---------------------------------------------------------------------------

/// Check bot entries: ids well-formed and unique, names and paths present.
pub fn validate(config: &DashboardConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for bot in &config.bots {
        validate_bot_id(&bot.id)?;
        if !seen.insert(bot.id.clone()) {
            return Err(ConfigError::DuplicateBot(bot.id.clone()));
        }
        if bot.name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                id: bot.id.clone(),
                field: "name",
            });
        }
        if bot.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                id: bot.id.clone(),
                field: "path",
            });
        }
        if bot.command.trim().is_empty() {
            return Err(ConfigError::MissingField {
                id: bot.id.clone(),
                field: "command",
            });
        }
    }
    Ok(())
}

fn validate_bot_id(id: &BotId) -> Result<(), ConfigError> {
    if id.0.is_empty() {
        return Err(ConfigError::InvalidBotId {
            id: id.0.clone(),
            reason: "must not be empty",
        });
    }
    let valid = id
        .0
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ConfigError::InvalidBotId {
            id: id.0.clone(),
            reason: "only ASCII letters, digits, '-' and '_' are allowed",
        });
    }
    Ok(())
}

/// Replace the listen port with `port` (the value of `$PORT`), if given.
pub fn apply_port_override(
    config: &mut DashboardConfig,
    port: Option<&str>,
) -> Result<(), ConfigError> {
    let Some(raw) = port.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    let port: u16 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
    config.listen.set_port(port);
    Ok(())
}

/// Apply `$PORT` from the process environment.
pub fn apply_env_overrides(config: &mut DashboardConfig) -> Result<(), ConfigError> {
    let port = std::env::var("PORT").ok();
    apply_port_override(config, port.as_deref())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
