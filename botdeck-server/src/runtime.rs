//! Service runtime: tracing setup, listener, graceful shutdown.

use std::future::Future;

use tokio::net::TcpListener;

use botdeck_core::types::DashboardConfig;

use crate::error::ServerError;
use crate::routes::router;
use crate::state::AppState;

/// Selects JSON log lines instead of the human-readable format.
pub const LOG_FORMAT_ENV: &str = "BOTDECK_LOG_FORMAT";

/// Start the service and block the current thread until it exits.
pub fn start_blocking(config: DashboardConfig) -> Result<(), ServerError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ServerError::Runtime)?;
    runtime.block_on(run(config, shutdown_signal()))
}

/// Serve until `shutdown` resolves, then settle any bots still running.
pub async fn run(
    config: DashboardConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let state = AppState::from_config(&config)?;
    if config.auth.is_open() {
        tracing::warn!("no auth tokens configured, /api is open to anyone who can reach it");
    }

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen,
            source,
        })?;
    let addr = listener.local_addr().map_err(ServerError::Serve)?;
    tracing::info!(
        %addr,
        bots = config.bots.len(),
        version = env!("CARGO_PKG_VERSION"),
        "botdeck listening",
    );

    let registry = state.registry.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    if config.stop_bots_on_shutdown {
        let stopped = registry.stop_all().await;
        tracing::info!(stopped, "shutdown complete");
    } else {
        let running = registry.running_count().await;
        if running > 0 {
            tracing::warn!(running, "leaving bots running after shutdown");
        }
    }
    Ok(())
}

/// Resolves on ctrl-c, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "ctrl-c handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

/// Install the global subscriber. Filter from `RUST_LOG`, default `info`.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let _ = if json {
        fmt().json().with_env_filter(filter).with_target(false).try_init()
    } else {
        fmt().with_env_filter(filter).with_target(false).try_init()
    };
}
