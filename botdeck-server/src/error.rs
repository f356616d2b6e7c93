use std::net::SocketAddr;

use thiserror::Error;

/// Error surface for the service runtime.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("failed to build tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("snapshot error: {0}")]
    Store(#[from] botdeck_store::StoreError),
}
