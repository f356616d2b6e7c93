//! Snapshot persistence.
//!
//! The snapshot is a single JSON document. Writes use the same atomic
//! `.tmp` + rename pattern as the config file.

use std::path::{Path, PathBuf};

use crate::error::{io_err, StoreError};
use crate::models::Snapshot;

/// Load the snapshot at `path`.
///
/// Returns an empty snapshot if the file does not yet exist.
pub fn load_at(path: &Path) -> Result<Snapshot, StoreError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no snapshot yet, starting empty");
        return Ok(Snapshot::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically write `snapshot` to `path`.
pub fn save_at(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }
    let tmp = tmp_path(path);
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("snapshot.json");
    path.with_file_name(format!("{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ticket, TicketStatus};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn load_missing_returns_empty() {
        let dir = TempDir::new().expect("tempdir");
        let snap = load_at(&dir.path().join("data.json")).expect("load");
        assert_eq!(snap, Snapshot::default());
    }

    #[test]
    fn save_then_load_preserves_tickets() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("data.json");
        let snap = Snapshot {
            tickets: vec![Ticket {
                id: 3,
                channel_id: "c3".to_string(),
                username: "ana".to_string(),
                kind: "Boost".to_string(),
                status: TicketStatus::Open,
                created_at: Utc::now(),
                closed_at: None,
                details: Some(serde_json::json!({"server": "inusual"})),
            }],
            ..Snapshot::default()
        };
        save_at(&path, &snap).expect("save");
        assert!(!dir.path().join("nested").join("data.json.tmp").exists());
        assert_eq!(load_at(&path).expect("load"), snap);
    }

    #[test]
    fn corrupt_snapshot_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").expect("write");
        let err = load_at(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("data.json"));
    }
}
