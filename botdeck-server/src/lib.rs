//! Dashboard HTTP service: session gate, bot control routes, data routes.

mod auth;
mod error;
pub mod routes;
mod runtime;
pub mod state;

pub use error::ServerError;
pub use routes::router;
pub use runtime::{init_tracing, run, shutdown_signal, start_blocking};
pub use state::{AppState, SnapshotStore};
