//! `/api/bots/*` handlers.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use botdeck_core::types::BotId;
use botdeck_supervisor::BotStatus;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct StartReply {
    success: bool,
    message: String,
    pid: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct StopReply {
    success: bool,
    message: String,
}

pub(crate) async fn status(State(state): State<AppState>) -> Json<BTreeMap<BotId, BotStatus>> {
    Json(state.registry.status().await)
}

pub(crate) async fn start(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StartReply>, ApiError> {
    let started = state.registry.start(&id).await?;
    Ok(Json(StartReply {
        success: true,
        message: format!("{} started", started.name),
        pid: started.pid,
    }))
}

pub(crate) async fn stop(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StopReply>, ApiError> {
    let stopped = state.registry.stop(&id).await?;
    Ok(Json(StopReply {
        success: true,
        message: format!("{} stopped", stopped.name),
    }))
}
