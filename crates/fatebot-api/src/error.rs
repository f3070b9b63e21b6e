//! fatebot API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fatebot_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// Tracing or trace exporter setup failed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Individual validation failures, when there are any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub complaints: Vec<String>,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::NoCurrentScene(_) => (StatusCode::NOT_FOUND, "no_current_scene"),
            DomainError::AspectNotFound(_) => (StatusCode::NOT_FOUND, "aspect_not_found"),
            DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::UnsupportedSchemaVersion { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "unsupported_schema_version",
            ),
            DomainError::CorruptDocument { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "corrupt_document")
            }
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        if status.is_server_error() {
            error!(error = %self.0, error_code, "request failed");
        }

        let complaints = match self.0 {
            DomainError::Validation {
                ref complaints, ..
            } => complaints.clone(),
            _ => Vec::new(),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
            complaints,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatebot_core::channel::ChannelId;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    async fn body_of(err: DomainError) -> serde_json::Value {
        let response = ApiError(err).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_no_current_scene_maps_to_404() {
        assert_eq!(
            status_of(DomainError::NoCurrentScene(ChannelId(1))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_aspect_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::AspectNotFound(9)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DomainError::validation("bad input", vec!["nope".into()])),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unreadable_documents_map_to_500() {
        assert_eq!(
            status_of(DomainError::UnsupportedSchemaVersion {
                channel_id: ChannelId(1),
                found: Some(0),
                expected: 1,
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(DomainError::CorruptDocument {
                channel_id: ChannelId(1),
                reason: "duplicate aspect id 2".into(),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_complaints() {
        let json = body_of(DomainError::validation(
            "the result for aspect 2 is not valid",
            vec!["aspect 2 is not a boost".into(), "name cannot be empty".into()],
        ))
        .await;

        assert_eq!(json["error"], "validation_error");
        assert_eq!(
            json["complaints"],
            serde_json::json!(["aspect 2 is not a boost", "name cannot be empty"])
        );
    }

    #[tokio::test]
    async fn test_non_validation_body_omits_complaints() {
        let json = body_of(DomainError::NoCurrentScene(ChannelId(4))).await;

        assert_eq!(json["error"], "no_current_scene");
        assert!(json.get("complaints").is_none());
    }

    #[tokio::test]
    async fn test_unsupported_schema_body_says_scene_could_not_load() {
        let json = body_of(DomainError::UnsupportedSchemaVersion {
            channel_id: ChannelId(4),
            found: None,
            expected: 1,
        })
        .await;

        assert_eq!(json["error"], "unsupported_schema_version");
        assert!(
            json["message"]
                .as_str()
                .unwrap()
                .starts_with("could not load scene")
        );
    }
}
