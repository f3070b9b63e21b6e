//! Tests for `HttpDisplaySurface` against a throwaway gateway server.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use fatebot_api::display::HttpDisplaySurface;
use fatebot_core::channel::{ChannelId, MessageId};
use fatebot_core::display::{DisplayError, DisplaySurface};
use serde_json::{Value, json};

/// One request seen by the fake gateway.
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    authorization: Option<String>,
    body: Option<Value>,
}

#[derive(Default)]
struct Gateway {
    requests: Mutex<Vec<Recorded>>,
}

/// Path segment `404` answers 404, `500` answers 500, channel `13` hands out
/// a malformed message id. Everything else succeeds.
async fn gateway(
    State(gateway): State<Arc<Gateway>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    gateway.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        authorization: headers
            .get("authorization")
            .map(|v| v.to_str().unwrap().to_string()),
        body: serde_json::from_slice(&body).ok(),
    });

    let segments: Vec<&str> = path.split('/').collect();
    if segments.contains(&"404") {
        return StatusCode::NOT_FOUND.into_response();
    }
    if segments.contains(&"500") {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if method == Method::POST && path.ends_with("/messages") {
        let id = if segments.contains(&"13") {
            "not-a-number"
        } else {
            "987654321"
        };
        return axum::Json(json!({ "id": id })).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Starts the fake gateway and returns a client pointed at it.
async fn start_gateway(authorization: Option<&str>) -> (HttpDisplaySurface, Arc<Gateway>) {
    let state = Arc::new(Gateway::default());
    let app = Router::new().fallback(gateway).with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let surface =
        HttpDisplaySurface::new(format!("http://{addr}/api/"), authorization.map(String::from))
            .unwrap();
    (surface, state)
}

fn recorded(gateway: &Gateway) -> Vec<Recorded> {
    gateway.requests.lock().unwrap().clone()
}

#[tokio::test]
async fn test_send_message_posts_content_and_parses_string_id() {
    // Arrange
    let (surface, gateway) = start_gateway(Some("Bot token-123")).await;

    // Act
    let id = surface
        .send_message(ChannelId(7), "Untitled scene")
        .await
        .unwrap();

    // Assert
    assert_eq!(id, MessageId(987_654_321));
    let requests = recorded(&gateway);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "/api/channels/7/messages");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bot token-123"));
    assert_eq!(
        requests[0].body,
        Some(json!({ "content": "Untitled scene" }))
    );
}

#[tokio::test]
async fn test_edit_message_patches_message() {
    let (surface, gateway) = start_gateway(None).await;

    surface
        .edit_message(ChannelId(7), MessageId(55), "Docks")
        .await
        .unwrap();

    let requests = recorded(&gateway);
    assert_eq!(requests[0].method, Method::PATCH);
    assert_eq!(requests[0].path, "/api/channels/7/messages/55");
    assert_eq!(requests[0].authorization, None);
    assert_eq!(requests[0].body, Some(json!({ "content": "Docks" })));
}

#[tokio::test]
async fn test_pin_and_unpin_use_pins_resource() {
    let (surface, gateway) = start_gateway(None).await;

    surface.pin_message(ChannelId(7), MessageId(55)).await.unwrap();
    surface
        .unpin_message(ChannelId(7), MessageId(55))
        .await
        .unwrap();

    let requests = recorded(&gateway);
    assert_eq!(requests[0].method, Method::PUT);
    assert_eq!(requests[0].path, "/api/channels/7/pins/55");
    assert_eq!(requests[1].method, Method::DELETE);
    assert_eq!(requests[1].path, "/api/channels/7/pins/55");
}

#[tokio::test]
async fn test_edit_of_missing_message_is_not_found() {
    let (surface, _) = start_gateway(None).await;

    let result = surface
        .edit_message(ChannelId(7), MessageId(404), "Docks")
        .await;

    match result {
        Err(DisplayError::NotFound(id)) => assert_eq!(id, MessageId(404)),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unpin_of_missing_message_is_not_found() {
    let (surface, _) = start_gateway(None).await;

    let result = surface.unpin_message(ChannelId(7), MessageId(404)).await;

    assert!(matches!(result, Err(DisplayError::NotFound(MessageId(404)))));
}

#[tokio::test]
async fn test_send_to_missing_channel_is_a_transport_error() {
    let (surface, _) = start_gateway(None).await;

    let result = surface.send_message(ChannelId(404), "Docks").await;

    assert!(matches!(result, Err(DisplayError::Transport(_))));
}

#[tokio::test]
async fn test_server_error_is_a_transport_error() {
    let (surface, _) = start_gateway(None).await;

    let result = surface
        .edit_message(ChannelId(500), MessageId(1), "Docks")
        .await;

    assert!(matches!(result, Err(DisplayError::Transport(_))));
}

#[tokio::test]
async fn test_malformed_message_id_is_a_transport_error() {
    let (surface, _) = start_gateway(None).await;

    let result = surface.send_message(ChannelId(13), "Docks").await;

    assert!(matches!(result, Err(DisplayError::Transport(_))));
}

#[tokio::test]
async fn test_unreachable_gateway_is_a_transport_error() {
    // Bind then drop a listener so the port is closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let surface = HttpDisplaySurface::new(format!("http://{addr}"), None).unwrap();

    let result = surface.pin_message(ChannelId(7), MessageId(1)).await;

    assert!(matches!(result, Err(DisplayError::Transport(_))));
}
