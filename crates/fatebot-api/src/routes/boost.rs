//! Routes for boosts: add, upgrade to a regular aspect, and downgrade.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use fatebot_core::channel::ChannelId;
use fatebot_scene::application::command_handlers;
use fatebot_scene::domain::aggregates::AspectId;
use fatebot_scene::domain::commands;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::aspect::{AddAspectRequest, AspectCreatedResponse};
use super::scene::SceneResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for upgrading or downgrading a boost.
#[derive(Debug, Default, Deserialize)]
pub struct ChangeBoostRequest {
    /// Optional new name.
    #[serde(default)]
    pub name: Option<String>,
}

/// POST /channels/{channel_id}/boosts
#[instrument(skip(state, request), fields(channel_id = %channel_id))]
async fn add_boost(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Json(request): Json<AddAspectRequest>,
) -> Result<Json<AspectCreatedResponse>, ApiError> {
    let command = commands::AddBoost {
        correlation_id: Uuid::new_v4(),
        channel_id,
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling add_boost command");

    let result = command_handlers::handle_add_boost(&command, state.scene_context()).await?;

    Ok(Json(AspectCreatedResponse {
        aspect_id: result.outcome,
        scene: result.scene,
    }))
}

/// POST /channels/{channel_id}/boosts/{aspect_id}/upgrade
#[instrument(skip(state, request), fields(channel_id = %channel_id, aspect_id = %aspect_id))]
async fn upgrade_boost(
    State(state): State<AppState>,
    Path((channel_id, aspect_id)): Path<(ChannelId, AspectId)>,
    Json(request): Json<ChangeBoostRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::UpgradeBoost {
        correlation_id: Uuid::new_v4(),
        channel_id,
        aspect_id,
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling upgrade_boost command");

    let result = command_handlers::handle_upgrade_boost(&command, state.scene_context()).await?;

    Ok(Json(result.into()))
}

/// POST /channels/{channel_id}/boosts/{aspect_id}/downgrade
#[instrument(skip(state, request), fields(channel_id = %channel_id, aspect_id = %aspect_id))]
async fn downgrade_boost(
    State(state): State<AppState>,
    Path((channel_id, aspect_id)): Path<(ChannelId, AspectId)>,
    Json(request): Json<ChangeBoostRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::DowngradeBoost {
        correlation_id: Uuid::new_v4(),
        channel_id,
        aspect_id,
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling downgrade_boost command");

    let result = command_handlers::handle_downgrade_boost(&command, state.scene_context()).await?;

    Ok(Json(result.into()))
}

/// Returns the router for boost routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/channels/{channel_id}/boosts", post(add_boost))
        .route(
            "/channels/{channel_id}/boosts/{aspect_id}/upgrade",
            post(upgrade_boost),
        )
        .route(
            "/channels/{channel_id}/boosts/{aspect_id}/downgrade",
            post(downgrade_boost),
        )
}
