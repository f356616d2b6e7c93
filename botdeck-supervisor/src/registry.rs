//! Bot process registry.
//!
//! One [`Slot`] per configured bot. A slot's entry is `Some` only while the
//! bot's process is believed to be alive; the entry is cleared either by the
//! exit watcher task or by [`BotRegistry::stop`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::process::Child;
use tokio::sync::Mutex;

use botdeck_core::types::{BotConfig, BotId};

use crate::error::SupervisorError;
use crate::{launch, terminate};

/// Derived, caller-visible state of one bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BotStatus {
    pub running: bool,
    pub pid: Option<u32>,
    /// Whole seconds since the bot was started; 0 when not running.
    pub uptime: u64,
}

impl BotStatus {
    const STOPPED: BotStatus = BotStatus {
        running: false,
        pid: None,
        uptime: 0,
    };
}

/// Result of a successful [`BotRegistry::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Started {
    pub name: String,
    pub pid: u32,
}

/// Result of a successful [`BotRegistry::stop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopped {
    pub name: String,
    pub pid: u32,
}

struct Entry {
    pid: u32,
    generation: u64,
    started: Instant,
    /// Flipped by the exit watcher as soon as the OS reports the exit.
    alive: Arc<AtomicBool>,
}

impl Entry {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn status(&self) -> BotStatus {
        BotStatus {
            running: true,
            pid: Some(self.pid),
            uptime: self.started.elapsed().as_secs(),
        }
    }
}

type SharedEntry = Arc<Mutex<Option<Entry>>>;

struct Slot {
    config: BotConfig,
    entry: SharedEntry,
}

/// Tracks zero or one live process per configured bot.
///
/// Construct one per service instance and share it behind an `Arc`.
pub struct BotRegistry {
    slots: Vec<Slot>,
    next_generation: AtomicU64,
}

impl BotRegistry {
    pub fn new(bots: &[BotConfig]) -> Self {
        Self {
            slots: bots
                .iter()
                .map(|config| Slot {
                    config: config.clone(),
                    entry: Arc::new(Mutex::new(None)),
                })
                .collect(),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Status of every configured bot, keyed by id.
    pub async fn status(&self) -> BTreeMap<BotId, BotStatus> {
        let mut out = BTreeMap::new();
        for slot in &self.slots {
            let entry = slot.entry.lock().await;
            let status = match entry.as_ref() {
                Some(entry) if entry.is_alive() => entry.status(),
                _ => BotStatus::STOPPED,
            };
            out.insert(slot.config.id.clone(), status);
        }
        out
    }

    /// Status of a single bot.
    pub async fn status_of(&self, id: &str) -> Result<BotStatus, SupervisorError> {
        let slot = self.slot(id)?;
        let entry = slot.entry.lock().await;
        Ok(match entry.as_ref() {
            Some(entry) if entry.is_alive() => entry.status(),
            _ => BotStatus::STOPPED,
        })
    }

    /// Launch the bot `id` unless it is already running.
    ///
    /// Returns as soon as the process has been spawned; the bot's own
    /// initialisation is not awaited.
    pub async fn start(&self, id: &str) -> Result<Started, SupervisorError> {
        let slot = self.slot(id)?;
        let name = slot.config.name.clone();
        let mut entry = slot.entry.lock().await;

        if let Some(current) = entry.as_ref() {
            if current.is_alive() {
                return Err(SupervisorError::AlreadyRunning(id.to_string()));
            }
            tracing::debug!(bot = %id, pid = current.pid, "pruning stale entry");
            *entry = None;
        }

        let mut child = launch::spawn(&slot.config).map_err(|source| {
            tracing::error!(bot = %id, error = %source, "failed to launch bot");
            SupervisorError::LaunchFailure {
                name: name.clone(),
                source,
            }
        })?;
        let Some(pid) = child.id() else {
            return Err(SupervisorError::LaunchFailure {
                name,
                source: std::io::Error::other("process exited before its pid was read"),
            });
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let alive = Arc::new(AtomicBool::new(true));

        launch::forward_output(&slot.config.id, &mut child);
        tokio::spawn(watch_exit(
            child,
            slot.entry.clone(),
            generation,
            alive.clone(),
            slot.config.id.clone(),
        ));

        *entry = Some(Entry {
            pid,
            generation,
            started: Instant::now(),
            alive,
        });
        tracing::info!(bot = %id, pid, "{name} started");
        Ok(Started { name, pid })
    }

    /// Kill the process tree of bot `id` and forget it.
    ///
    /// The entry is cleared once the kill signal has been delivered; the
    /// registry does not wait for the process to be reaped.
    pub async fn stop(&self, id: &str) -> Result<Stopped, SupervisorError> {
        let slot = self.slot(id)?;
        let name = slot.config.name.clone();
        let mut entry = slot.entry.lock().await;

        let pid = match entry.as_ref() {
            Some(current) if current.is_alive() => current.pid,
            _ => {
                *entry = None;
                return Err(SupervisorError::NotRunning(id.to_string()));
            }
        };

        terminate::kill_tree(pid).map_err(|source| {
            tracing::error!(bot = %id, pid, error = %source, "failed to stop bot");
            SupervisorError::TerminationFailure {
                name: name.clone(),
                pid,
                source,
            }
        })?;

        *entry = None;
        tracing::info!(bot = %id, pid, "{name} stopped");
        Ok(Stopped { name, pid })
    }

    /// Stop every running bot. Returns how many were stopped.
    ///
    /// Failures are logged and skipped.
    pub async fn stop_all(&self) -> usize {
        let mut stopped = 0;
        for slot in &self.slots {
            match self.stop(slot.config.id.as_str()).await {
                Ok(_) => stopped += 1,
                Err(SupervisorError::NotRunning(_)) => {}
                Err(err) => tracing::warn!(bot = %slot.config.id, error = %err, "stop on shutdown failed"),
            }
        }
        stopped
    }

    /// Number of bots currently believed to be alive.
    pub async fn running_count(&self) -> usize {
        let mut count = 0;
        for slot in &self.slots {
            if slot.entry.lock().await.as_ref().is_some_and(Entry::is_alive) {
                count += 1;
            }
        }
        count
    }

    fn slot(&self, id: &str) -> Result<&Slot, SupervisorError> {
        self.slots
            .iter()
            .find(|slot| slot.config.id.as_str() == id)
            .ok_or_else(|| SupervisorError::UnknownBot(id.to_string()))
    }
}

/// Owns the child until it exits, then clears the entry it was spawned for.
///
/// A newer launch has a different generation and is left untouched.
async fn watch_exit(
    mut child: Child,
    entry: SharedEntry,
    generation: u64,
    alive: Arc<AtomicBool>,
    bot: BotId,
) {
    let result = child.wait().await;
    alive.store(false, Ordering::SeqCst);
    match result {
        Ok(status) => tracing::info!(bot = %bot, code = ?status.code(), "bot process exited"),
        Err(err) => tracing::warn!(bot = %bot, error = %err, "lost track of bot process"),
    }

    let mut entry = entry.lock().await;
    if entry.as_ref().is_some_and(|e| e.generation == generation) {
        *entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BotRegistry {
        BotRegistry::new(&[
            BotConfig::new("a", "Bot A", "/nonexistent/a"),
            BotConfig::new("b", "Bot B", "/nonexistent/b"),
        ])
    }

    #[tokio::test]
    async fn fresh_registry_reports_everything_stopped() {
        let status = registry().status().await;
        assert_eq!(status.len(), 2);
        for st in status.values() {
            assert_eq!(*st, BotStatus::STOPPED);
        }
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected_everywhere() {
        let reg = registry();
        assert!(matches!(reg.start("zzz").await, Err(SupervisorError::UnknownBot(_))));
        assert!(matches!(reg.stop("zzz").await, Err(SupervisorError::UnknownBot(_))));
        assert!(matches!(reg.status_of("zzz").await, Err(SupervisorError::UnknownBot(_))));
    }

    #[tokio::test]
    async fn stop_without_start_is_not_running() {
        let reg = registry();
        let err = reg.stop("a").await.unwrap_err();
        assert!(matches!(err, SupervisorError::NotRunning(ref id) if id == "a"));
        assert_eq!(reg.running_count().await, 0);
    }

    #[tokio::test]
    async fn launch_failure_leaves_slot_empty() {
        let reg = registry();
        let err = reg.start("a").await.unwrap_err();
        assert!(matches!(err, SupervisorError::LaunchFailure { .. }), "got: {err}");
        assert!(err.to_string().contains("Bot A"));
        assert_eq!(reg.status_of("a").await.unwrap(), BotStatus::STOPPED);
    }

    #[tokio::test]
    async fn dead_entries_are_reported_as_stopped() {
        let reg = registry();
        let alive = Arc::new(AtomicBool::new(false));
        *reg.slots[0].entry.lock().await = Some(Entry {
            pid: 4242,
            generation: 7,
            started: Instant::now(),
            alive,
        });
        assert_eq!(reg.status_of("a").await.unwrap(), BotStatus::STOPPED);
        assert!(matches!(reg.stop("a").await, Err(SupervisorError::NotRunning(_))));
        assert!(reg.slots[0].entry.lock().await.is_none(), "stale entry must be pruned");
    }

    #[test]
    fn status_serializes_with_null_pid() {
        let json = serde_json::to_value(BotStatus::STOPPED).unwrap();
        assert_eq!(json, serde_json::json!({"running": false, "pid": null, "uptime": 0}));
    }
}
