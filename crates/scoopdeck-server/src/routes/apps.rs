//! App and bucket snapshot routes.

use crate::state::AppState;
use axum::{extract::State, Json};
use scoopdeck_types::{AppRecord, BucketRecord};
use std::sync::Arc;

/// GET /api/apps - Current app records, sorted by name.
pub async fn list_apps(State(state): State<Arc<AppState>>) -> Json<Vec<AppRecord>> {
    Json(state.table.read().await.apps())
}

/// GET /api/buckets - Known buckets, sorted by name.
pub async fn list_buckets(State(state): State<Arc<AppState>>) -> Json<Vec<BucketRecord>> {
    Json(state.table.read().await.buckets())
}
