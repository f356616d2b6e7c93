//! Router assembly and the JSON error surface shared by all handlers.

mod bots;
mod data;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use botdeck_supervisor::SupervisorError;

use crate::auth::require_session;
use crate::state::AppState;

/// Full application router: public `/health` plus the gated `/api` tree.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/bots/status", get(bots::status))
        .route("/bots/{id}/start", post(bots::start))
        .route("/bots/{id}/stop", post(bots::stop))
        .route("/stats", get(data::stats))
        .route("/stats/breakdown", get(data::breakdown))
        .route("/tickets", get(data::tickets))
        .route("/ticket/{id}", get(data::ticket))
        .route("/ticket/{id}/close", post(data::close_ticket))
        .route("/vouches", get(data::vouches))
        .route("/trend-data", get(data::trend))
        .route("/activity-feed", get(data::activity_feed))
        .route("/top-users", get(data::top_users))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime": state.started_at.elapsed().as_secs(),
    }))
}

/// Handler failure rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Bot(SupervisorError),
    TicketNotFound,
    CloseFailed,
    Unauthorized,
}

impl From<SupervisorError> for ApiError {
    fn from(err: SupervisorError) -> Self {
        ApiError::Bot(err)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Bot(SupervisorError::UnknownBot(_)) => {
                (StatusCode::NOT_FOUND, "Bot not found".to_string())
            }
            // Precondition misses are reported with 200 and an error body.
            ApiError::Bot(SupervisorError::AlreadyRunning(_)) => {
                (StatusCode::OK, "Bot is already running".to_string())
            }
            ApiError::Bot(SupervisorError::NotRunning(_)) => {
                (StatusCode::OK, "Bot is not running".to_string())
            }
            ApiError::Bot(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::TicketNotFound => (StatusCode::NOT_FOUND, "Ticket not found".to_string()),
            ApiError::CloseFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to close ticket".to_string(),
            ),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_errors_keep_200() {
        let (status, msg) =
            ApiError::from(SupervisorError::AlreadyRunning("a".into())).status_and_message();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(msg, "Bot is already running");

        let (status, msg) =
            ApiError::from(SupervisorError::NotRunning("a".into())).status_and_message();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(msg, "Bot is not running");
    }

    #[test]
    fn launch_failure_is_500_with_cause() {
        let err = SupervisorError::LaunchFailure {
            name: "Vouch Bot".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let (status, msg) = ApiError::from(err).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(msg.contains("Vouch Bot"), "got: {msg}");
        assert!(msg.contains("no such file"), "got: {msg}");
    }

    #[test]
    fn unknown_bot_is_404() {
        let (status, msg) =
            ApiError::from(SupervisorError::UnknownBot("x".into())).status_and_message();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(msg, "Bot not found");
    }
}
