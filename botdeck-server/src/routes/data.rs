//! Read-mostly handlers over the ticket/vouch snapshot.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use botdeck_store::insights::{self, Activity, Breakdown, TopUser, Trend};
use botdeck_store::{Stats, StoreError, Ticket, TicketView, VouchView};

use super::ApiError;
use crate::state::AppState;

const TOP_USERS: usize = 5;

pub(crate) async fn stats(State(state): State<AppState>) -> Json<Stats> {
    Json(state.store.read(|s| s.stats()).await)
}

pub(crate) async fn breakdown(State(state): State<AppState>) -> Json<Breakdown> {
    Json(state.store.read(insights::breakdown).await)
}

pub(crate) async fn tickets(State(state): State<AppState>) -> Json<Vec<TicketView>> {
    Json(state.store.read(|s| s.ticket_views()).await)
}

/// The stored ticket document, unlike the list rows.
pub(crate) async fn ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let id = parse_ticket_id(&id)?;
    state
        .store
        .read(|s| s.ticket(id).cloned())
        .await
        .map(Json)
        .ok_or(ApiError::TicketNotFound)
}

pub(crate) async fn close_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_ticket_id(&id)?;
    match state.store.close_ticket(id, Utc::now()).await {
        Ok(changed) => {
            if changed {
                tracing::info!(ticket = id, "ticket closed");
            }
            Ok(Json(json!({
                "success": true,
                "message": "Ticket closed successfully",
            })))
        }
        Err(StoreError::TicketNotFound(_)) => Err(ApiError::TicketNotFound),
        Err(err) => {
            tracing::error!(ticket = id, error = %err, "failed to persist closed ticket");
            Err(ApiError::CloseFailed)
        }
    }
}

pub(crate) async fn vouches(State(state): State<AppState>) -> Json<Vec<VouchView>> {
    Json(state.store.read(|s| s.vouch_views()).await)
}

pub(crate) async fn trend(State(state): State<AppState>) -> Json<Trend> {
    let now = Utc::now();
    Json(state.store.read(|s| insights::trend(s, now)).await)
}

pub(crate) async fn activity_feed(State(state): State<AppState>) -> Json<Vec<Activity>> {
    Json(state.store.read(insights::activity_feed).await)
}

pub(crate) async fn top_users(State(state): State<AppState>) -> Json<Vec<TopUser>> {
    Json(state.store.read(|s| insights::top_users(s, TOP_USERS)).await)
}

/// Non-numeric ids can never match a ticket.
fn parse_ticket_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse().map_err(|_| ApiError::TicketNotFound)
}
