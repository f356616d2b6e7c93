//! Error types for botdeck-supervisor.

use thiserror::Error;

/// Failures of registry operations.
///
/// `AlreadyRunning` and `NotRunning` are state preconditions rather than
/// faults; the HTTP layer reports them with a success status.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("bot '{0}' is not configured")]
    UnknownBot(String),

    #[error("bot '{0}' is already running")]
    AlreadyRunning(String),

    #[error("bot '{0}' is not running")]
    NotRunning(String),

    #[error("failed to launch '{name}': {source}")]
    LaunchFailure {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stop '{name}' (pid {pid}): {source}")]
    TerminationFailure {
        name: String,
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}
