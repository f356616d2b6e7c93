//! Session gate for `/api`.
//!
//! Identity is established upstream; this layer only checks that the
//! request carries one of the configured session tokens.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::routes::ApiError;
use crate::state::AppState;

pub(crate) const SESSION_COOKIE: &str = "botdeck_session";

pub(crate) async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.auth.is_open() {
        return next.run(request).await;
    }
    let accepted = presented_token(request.headers())
        .is_some_and(|token| token_matches(&state.auth.tokens, token));
    if accepted {
        return next.run(request).await;
    }
    tracing::debug!(uri = %request.uri(), "rejecting unauthenticated request");
    ApiError::Unauthorized.into_response()
}

/// Constant-time check of `presented` against every known token.
fn token_matches(known: &[String], presented: &str) -> bool {
    known.iter().fold(0u8, |hit, token| {
        hit | token.as_bytes().ct_eq(presented.as_bytes()).unwrap_u8()
    }) == 1
}

/// Bearer token, falling back to the session cookie.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|t| !t.is_empty())
}
