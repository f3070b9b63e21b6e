//! Liveness endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use fatebot_scene::domain::document::CURRENT_SCHEMA_VERSION;
use serde::Serialize;

use crate::state::AppState;

/// Body of GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Scene document version this build writes.
    pub scene_schema_version: i64,
    /// Channels that have held a guard since startup.
    pub channels_seen: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        scene_schema_version: CURRENT_SCHEMA_VERSION,
        channels_seen: state.guards.len(),
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
