//! Error types for botdeck-store.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from snapshot operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed snapshot document.
    #[error("failed to parse snapshot at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (save path).
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ticket {0} not found")]
    TicketNotFound(u64),
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
