//! Route modules for the scene command surface.

use axum::Router;

use crate::state::AppState;

pub mod aspect;
pub mod boost;
pub mod health;
pub mod scene;

/// Builds the full API router: `/health` plus every scene route under
/// `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new().merge(health::router()).nest(
        "/api/v1",
        Router::new()
            .merge(scene::router())
            .merge(aspect::router())
            .merge(boost::router()),
    )
}
