//! Domain types for the Botdeck configuration.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde + serde_yaml.

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed identifier for a managed bot (e.g. `vouch`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BotId(pub String);

impl BotId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BotId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BotId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Bot entries
// ---------------------------------------------------------------------------

/// One managed bot program: where it lives and how to launch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    pub id: BotId,
    /// Display name used in log lines and API messages.
    pub name: String,
    /// Working directory the bot is launched in.
    pub path: PathBuf,
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Run `command args…` through the platform shell (`sh -c` / `cmd /C`).
    #[serde(default = "default_true")]
    pub shell: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl BotConfig {
    /// A bot launched with the defaults (`npm start` through the shell).
    pub fn new(id: impl Into<BotId>, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            command: default_command(),
            args: default_args(),
            shell: true,
            env: BTreeMap::new(),
        }
    }

    /// `command` followed by `args`, space separated; the line handed to the shell.
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// Service configuration
// ---------------------------------------------------------------------------

/// Session tokens accepted by the HTTP gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl AuthConfig {
    pub fn is_open(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Location of the ticket/vouch snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

/// Root of `~/.botdeck/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,
    #[serde(default = "default_true")]
    pub stop_bots_on_shutdown: bool,
    #[serde(default)]
    pub bots: Vec<BotConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            auth: AuthConfig::default(),
            store: None,
            stop_bots_on_shutdown: true,
            bots: vec![],
        }
    }
}

impl DashboardConfig {
    pub fn bot(&self, id: &str) -> Option<&BotConfig> {
        self.bots.iter().find(|bot| bot.id.0 == id)
    }
}

fn default_command() -> String {
    "npm".to_string()
}

fn default_args() -> Vec<String> {
    vec!["start".to_string()]
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_id_display() {
        assert_eq!(BotId::from("vouch").to_string(), "vouch");
        assert_eq!(BotId::from(String::from("x")), BotId::from("x"));
    }

    #[test]
    fn bot_defaults_match_npm_start() {
        let yaml = "id: vouch\nname: Vouch Bot\npath: /srv/vouch\n";
        let bot: BotConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(bot.command, "npm");
        assert_eq!(bot.args, vec!["start".to_string()]);
        assert!(bot.shell);
        assert_eq!(bot.command_line(), "npm start");
    }

    #[test]
    fn dashboard_defaults_apply_to_minimal_yaml() {
        let cfg: DashboardConfig = serde_yaml::from_str("bots: []\n").expect("parse");
        assert_eq!(cfg.listen, default_listen());
        assert!(cfg.auth.is_open());
        assert!(cfg.stop_bots_on_shutdown);
        assert!(cfg.store.is_none());
    }

    #[test]
    fn bot_lookup_by_id() {
        let cfg = DashboardConfig {
            bots: vec![BotConfig::new("a", "A", "/a"), BotConfig::new("b", "B", "/b")],
            ..DashboardConfig::default()
        };
        assert_eq!(cfg.bot("b").map(|b| b.name.as_str()), Some("B"));
        assert!(cfg.bot("c").is_none());
    }
}
