//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fatebot_core::clock::Clock;
use fatebot_scene_store::pg_scene_repository::PgSceneRepository;
use fatebot_test_support::{FixedClock, RecordingDisplaySurface};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fatebot_api::routes;
use fatebot_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::at(2026, 1, 15, 10, 0, 0))
}

/// Build the app state with a real `PgSceneRepository`, a deterministic
/// clock, and the given recording display.
pub fn build_test_state(pool: PgPool, display: Arc<RecordingDisplaySurface>) -> AppState {
    AppState::new(
        fixed_clock(),
        Arc::new(PgSceneRepository::new(pool)),
        display,
    )
}

/// Build the full app router with a real `PgSceneRepository`. Uses the same
/// route structure as `main.rs`.
pub fn build_test_app(pool: PgPool, display: Arc<RecordingDisplaySurface>) -> Router {
    routes::api_router().with_state(build_test_state(pool, display))
}

/// Send a request with an optional JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, Some(body)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "GET", uri, None).await
}
