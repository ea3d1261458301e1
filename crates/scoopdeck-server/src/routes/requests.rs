//! Request submission route.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use scoopdeck_types::ScoopRequest;
use std::sync::Arc;

/// POST /api/requests - Queue a Scoop request.
///
/// Bodies that are not a known request are rejected before reaching the
/// dispatcher.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScoopRequest>, JsonRejection>,
) -> Result<StatusCode, (StatusCode, String)> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(target: "scoopdeck::api", "Rejected request: {}", rejection.body_text());
        (rejection.status(), rejection.body_text())
    })?;

    tracing::info!(target: "scoopdeck::api", "Request {} queued", request.kind());

    state
        .dispatch
        .submit(request)
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    Ok(StatusCode::ACCEPTED)
}
