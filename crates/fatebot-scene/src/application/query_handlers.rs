//! Query handlers for the scene context.
//!
//! Queries read the stored document and return read-only view DTOs. They do
//! not take the channel guard: the store never exposes a half-written
//! document.

use fatebot_core::channel::{ChannelId, MessageId};
use fatebot_core::error::DomainError;
use fatebot_core::repository::SceneRepository;
use serde::Serialize;

use crate::domain::aggregates::{AspectId, Scene};
use crate::domain::document::decode_scene;
use crate::domain::render::render;

/// Read-only view of one aspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AspectView {
    /// The aspect identifier.
    pub id: AspectId,
    /// The aspect name.
    pub name: String,
    /// Whether the aspect is a boost.
    pub boost: bool,
    /// Remaining free invokes.
    pub invokes: u32,
}

/// Read-only view of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneView {
    /// The owning channel.
    pub channel_id: ChannelId,
    /// The scene description, if any.
    pub description: Option<String>,
    /// Aspects in display order.
    pub aspects: Vec<AspectView>,
    /// The id the next aspect will receive.
    pub next_aspect_id: AspectId,
    /// Messages currently showing the scene.
    pub display_message_ids: Vec<MessageId>,
    /// The text shown on the display surface.
    pub rendered: String,
}

impl From<&Scene> for SceneView {
    fn from(scene: &Scene) -> Self {
        Self {
            channel_id: scene.channel_id(),
            description: scene.description().map(str::to_owned),
            aspects: scene
                .aspects()
                .map(|(id, aspect)| AspectView {
                    id,
                    name: aspect.name().to_owned(),
                    boost: aspect.is_boost(),
                    invokes: aspect.invokes(),
                })
                .collect(),
            next_aspect_id: scene.next_aspect_id(),
            display_message_ids: scene.display_message_ids().iter().copied().collect(),
            rendered: render(scene),
        }
    }
}

/// Retrieves the current scene of a channel.
///
/// # Errors
///
/// Returns `DomainError::NoCurrentScene` if the channel has no scene, or a
/// codec error if the stored document cannot be read.
pub async fn get_scene(
    channel_id: ChannelId,
    repo: &dyn SceneRepository,
) -> Result<SceneView, DomainError> {
    let stored = repo.find(channel_id).await?;
    let scene = decode_scene(channel_id, &stored.document)?;
    Ok(SceneView::from(&scene))
}
