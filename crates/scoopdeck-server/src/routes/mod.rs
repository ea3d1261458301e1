//! HTTP route handlers.

pub mod apps;
pub mod requests;
pub mod ws;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// API and WebSocket routes, without static files or middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/apps", get(apps::list_apps))
        .route("/buckets", get(apps::list_buckets))
        .route("/requests", post(requests::submit))
        .route("/health", get(health));

    let ws_routes = Router::new().route("/events", get(ws::upgrade));

    Router::new()
        .nest("/api", api_routes)
        .nest("/ws", ws_routes)
        .with_state(state)
}
