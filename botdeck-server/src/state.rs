//! Shared handler state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use botdeck_core::types::{AuthConfig, DashboardConfig};
use botdeck_store::{snapshot, Snapshot, StoreError};
use botdeck_supervisor::BotRegistry;

/// In-memory snapshot plus the file it is persisted to, if any.
pub struct SnapshotStore {
    path: Option<PathBuf>,
    data: RwLock<Snapshot>,
}

impl SnapshotStore {
    /// Snapshot that is never written back.
    pub fn in_memory(snapshot: Snapshot) -> Self {
        Self {
            path: None,
            data: RwLock::new(snapshot),
        }
    }

    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let snapshot = snapshot::load_at(&path)?;
        tracing::info!(
            path = %path.display(),
            tickets = snapshot.tickets.len(),
            vouches = snapshot.vouches.len(),
            "snapshot loaded",
        );
        Ok(Self {
            path: Some(path),
            data: RwLock::new(snapshot),
        })
    }

    /// Run `f` against the current snapshot.
    pub async fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        let data = self.data.read().await;
        f(&data)
    }

    /// Close ticket `id` and persist.
    ///
    /// The in-memory copy only changes once the file write has succeeded.
    pub async fn close_ticket(&self, id: u64, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        let mut updated = data.clone();
        let changed = updated.close_ticket(id, now)?;
        if changed {
            if let Some(path) = &self.path {
                snapshot::save_at(path, &updated)?;
            }
            *data = updated;
        }
        Ok(changed)
    }
}

/// Everything a request handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<BotRegistry>,
    pub store: Arc<SnapshotStore>,
    pub auth: Arc<AuthConfig>,
    /// When the service came up; reported as `uptime` by `/health`.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(registry: BotRegistry, store: SnapshotStore, auth: AuthConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            store: Arc::new(store),
            auth: Arc::new(auth),
            started_at: Instant::now(),
        }
    }

    /// Fresh registry for the configured bots and the configured snapshot.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, StoreError> {
        let store = match &config.store {
            Some(store) => SnapshotStore::open(store.path.clone())?,
            None => SnapshotStore::in_memory(Snapshot::default()),
        };
        Ok(Self::new(
            BotRegistry::new(&config.bots),
            store,
            config.auth.clone(),
        ))
    }
}
