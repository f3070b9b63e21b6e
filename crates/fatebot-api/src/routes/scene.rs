//! Routes for scene lifecycle: start, end, sync, describe, and read.

use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::{Json, Router};
use fatebot_core::channel::ChannelId;
use fatebot_scene::application::command_handlers::{self, SceneCommandResult};
use fatebot_scene::application::query_handlers::{self, SceneView};
use fatebot_scene::domain::commands;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /channels/{channel_id}/scene.
#[derive(Debug, Default, Deserialize)]
pub struct StartSceneRequest {
    /// Optional narrative label.
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for PUT /channels/{channel_id}/scene/description.
#[derive(Debug, Default, Deserialize)]
pub struct DescribeSceneRequest {
    /// New description; absent or blank clears it.
    #[serde(default)]
    pub description: Option<String>,
}

/// Response body carrying the scene after a command.
#[derive(Debug, Serialize)]
pub struct SceneResponse {
    /// The scene as stored and displayed.
    pub scene: SceneView,
}

impl From<SceneCommandResult<()>> for SceneResponse {
    fn from(result: SceneCommandResult<()>) -> Self {
        Self {
            scene: result.scene,
        }
    }
}

/// Response body for DELETE /channels/{channel_id}/scene.
#[derive(Debug, Serialize)]
pub struct EndSceneResponse {
    /// The channel whose scene ended.
    pub channel_id: ChannelId,
    /// Always `true`.
    pub ended: bool,
}

/// POST /channels/{channel_id}/scene
#[instrument(skip(state, request), fields(channel_id = %channel_id))]
async fn start_scene(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Json(request): Json<StartSceneRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::StartScene {
        correlation_id: Uuid::new_v4(),
        channel_id,
        description: request.description,
    };

    info!(correlation_id = %command.correlation_id, "handling start_scene command");

    let result = command_handlers::handle_start_scene(&command, state.scene_context()).await?;

    Ok(Json(result.into()))
}

/// GET /channels/{channel_id}/scene
#[instrument(skip(state), fields(channel_id = %channel_id))]
async fn get_scene(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
) -> Result<Json<SceneView>, ApiError> {
    let view = query_handlers::get_scene(channel_id, &*state.scene_repository).await?;
    Ok(Json(view))
}

/// DELETE /channels/{channel_id}/scene
#[instrument(skip(state), fields(channel_id = %channel_id))]
async fn end_scene(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
) -> Result<Json<EndSceneResponse>, ApiError> {
    let command = commands::EndScene {
        correlation_id: Uuid::new_v4(),
        channel_id,
    };

    info!(correlation_id = %command.correlation_id, "handling end_scene command");

    command_handlers::handle_end_scene(&command, state.scene_context()).await?;

    Ok(Json(EndSceneResponse {
        channel_id,
        ended: true,
    }))
}

/// POST /channels/{channel_id}/scene/sync
#[instrument(skip(state), fields(channel_id = %channel_id))]
async fn sync_scene(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::SyncScene {
        correlation_id: Uuid::new_v4(),
        channel_id,
    };

    info!(correlation_id = %command.correlation_id, "handling sync_scene command");

    let result = command_handlers::handle_sync_scene(&command, state.scene_context()).await?;

    Ok(Json(result.into()))
}

/// PUT /channels/{channel_id}/scene/description
#[instrument(skip(state, request), fields(channel_id = %channel_id))]
async fn describe_scene(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Json(request): Json<DescribeSceneRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::DescribeScene {
        correlation_id: Uuid::new_v4(),
        channel_id,
        description: request.description,
    };

    info!(correlation_id = %command.correlation_id, "handling describe_scene command");

    let result = command_handlers::handle_describe_scene(&command, state.scene_context()).await?;

    Ok(Json(result.into()))
}

/// Returns the router for scene lifecycle routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/channels/{channel_id}/scene",
            post(start_scene).get(get_scene).delete(end_scene),
        )
        .route("/channels/{channel_id}/scene/sync", post(sync_scene))
        .route(
            "/channels/{channel_id}/scene/description",
            put(describe_scene),
        )
}
