//! Routes for aspects: add, remove, rename, invoke, and invoke adjustment.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use fatebot_core::channel::ChannelId;
use fatebot_scene::application::command_handlers;
use fatebot_scene::application::query_handlers::SceneView;
use fatebot_scene::domain::aggregates::AspectId;
use fatebot_scene::domain::commands;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use super::scene::SceneResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for adding an aspect or boost.
#[derive(Debug, Deserialize)]
pub struct AddAspectRequest {
    /// The aspect name.
    pub name: String,
}

/// Request body for POST /channels/{channel_id}/aspects/remove.
#[derive(Debug, Deserialize)]
pub struct RemoveAspectsRequest {
    /// Aspects to remove; all must exist.
    pub aspect_ids: Vec<AspectId>,
}

/// Request body for POST /channels/{channel_id}/aspects/{aspect_id}/rename.
#[derive(Debug, Deserialize)]
pub struct RenameAspectRequest {
    /// The new name.
    pub name: String,
}

/// Request body for POST /channels/{channel_id}/aspects/{aspect_id}/invokes.
#[derive(Debug, Default, Deserialize)]
pub struct AdjustInvokesRequest {
    /// Signed change; defaults to `+1`.
    #[serde(default)]
    pub amount: Option<i64>,
}

/// Response body for a newly created aspect or boost.
#[derive(Debug, Serialize)]
pub struct AspectCreatedResponse {
    /// The id assigned to the new aspect.
    pub aspect_id: AspectId,
    /// The scene after the addition.
    pub scene: SceneView,
}

/// Response body for an invoke.
#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    /// Free invokes left on the aspect.
    pub remaining_invokes: u32,
    /// Whether the invoke used up a free invoke.
    pub consumed_free_invoke: bool,
    /// The scene after the invoke.
    pub scene: SceneView,
}

/// Response body for an invoke adjustment.
#[derive(Debug, Serialize)]
pub struct AdjustInvokesResponse {
    /// The aspect's new invoke count.
    pub invokes: u32,
    /// The scene after the adjustment.
    pub scene: SceneView,
}

/// POST /channels/{channel_id}/aspects
#[instrument(skip(state, request), fields(channel_id = %channel_id))]
async fn add_aspect(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Json(request): Json<AddAspectRequest>,
) -> Result<Json<AspectCreatedResponse>, ApiError> {
    let command = commands::AddAspect {
        correlation_id: Uuid::new_v4(),
        channel_id,
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling add_aspect command");

    let result = command_handlers::handle_add_aspect(&command, state.scene_context()).await?;

    Ok(Json(AspectCreatedResponse {
        aspect_id: result.outcome,
        scene: result.scene,
    }))
}

/// POST /channels/{channel_id}/aspects/remove
#[instrument(skip(state, request), fields(channel_id = %channel_id))]
async fn remove_aspects(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Json(request): Json<RemoveAspectsRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::RemoveAspects {
        correlation_id: Uuid::new_v4(),
        channel_id,
        aspect_ids: request.aspect_ids,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_aspects command");

    let result = command_handlers::handle_remove_aspects(&command, state.scene_context()).await?;

    Ok(Json(result.into()))
}

/// POST /channels/{channel_id}/aspects/{aspect_id}/rename
#[instrument(skip(state, request), fields(channel_id = %channel_id, aspect_id = %aspect_id))]
async fn rename_aspect(
    State(state): State<AppState>,
    Path((channel_id, aspect_id)): Path<(ChannelId, AspectId)>,
    Json(request): Json<RenameAspectRequest>,
) -> Result<Json<SceneResponse>, ApiError> {
    let command = commands::RenameAspect {
        correlation_id: Uuid::new_v4(),
        channel_id,
        aspect_id,
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling rename_aspect command");

    let result = command_handlers::handle_rename_aspect(&command, state.scene_context()).await?;

    Ok(Json(result.into()))
}

/// POST /channels/{channel_id}/aspects/{aspect_id}/invoke
#[instrument(skip(state), fields(channel_id = %channel_id, aspect_id = %aspect_id))]
async fn invoke_aspect(
    State(state): State<AppState>,
    Path((channel_id, aspect_id)): Path<(ChannelId, AspectId)>,
) -> Result<Json<InvokeResponse>, ApiError> {
    let command = commands::InvokeAspect {
        correlation_id: Uuid::new_v4(),
        channel_id,
        aspect_id,
    };

    info!(correlation_id = %command.correlation_id, "handling invoke_aspect command");

    let result = command_handlers::handle_invoke_aspect(&command, state.scene_context()).await?;

    Ok(Json(InvokeResponse {
        remaining_invokes: result.outcome.remaining_invokes,
        consumed_free_invoke: result.outcome.consumed_free_invoke,
        scene: result.scene,
    }))
}

/// POST /channels/{channel_id}/aspects/{aspect_id}/invokes
#[instrument(skip(state, request), fields(channel_id = %channel_id, aspect_id = %aspect_id))]
async fn adjust_invokes(
    State(state): State<AppState>,
    Path((channel_id, aspect_id)): Path<(ChannelId, AspectId)>,
    Json(request): Json<AdjustInvokesRequest>,
) -> Result<Json<AdjustInvokesResponse>, ApiError> {
    let command = commands::AdjustInvokes {
        correlation_id: Uuid::new_v4(),
        channel_id,
        aspect_id,
        amount: request.amount,
    };

    info!(correlation_id = %command.correlation_id, "handling adjust_invokes command");

    let result = command_handlers::handle_adjust_invokes(&command, state.scene_context()).await?;

    Ok(Json(AdjustInvokesResponse {
        invokes: result.outcome,
        scene: result.scene,
    }))
}

/// Returns the router for aspect routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/channels/{channel_id}/aspects", post(add_aspect))
        .route("/channels/{channel_id}/aspects/remove", post(remove_aspects))
        .route(
            "/channels/{channel_id}/aspects/{aspect_id}/rename",
            post(rename_aspect),
        )
        .route(
            "/channels/{channel_id}/aspects/{aspect_id}/invoke",
            post(invoke_aspect),
        )
        .route(
            "/channels/{channel_id}/aspects/{aspect_id}/invokes",
            post(adjust_invokes),
        )
}
