//! Maps `Scene` entities to and from the document store.

use fatebot_core::channel::ChannelId;
use fatebot_core::clock::Clock;
use fatebot_core::error::DomainError;
use fatebot_core::repository::{SceneRepository, StoredScene};
use tracing::debug;

use crate::domain::aggregates::Scene;
use crate::domain::document::{decode_scene, encode_scene};

/// Scene data access over a `SceneRepository`.
#[derive(Clone, Copy)]
pub struct SceneDao<'a> {
    repo: &'a dyn SceneRepository,
    clock: &'a dyn Clock,
}

impl<'a> SceneDao<'a> {
    /// Creates a DAO over the given repository, stamping writes with `clock`.
    #[must_use]
    pub fn new(repo: &'a dyn SceneRepository, clock: &'a dyn Clock) -> Self {
        Self { repo, clock }
    }

    /// Loads the current scene for a channel.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoCurrentScene` if the channel has no scene,
    /// the codec errors for unreadable documents, or the repository's error.
    pub async fn find(&self, channel_id: ChannelId) -> Result<Scene, DomainError> {
        let stored = self.repo.find(channel_id).await?;
        decode_scene(channel_id, &stored.document)
    }

    /// Upserts a scene.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn save(&self, scene: &Scene) -> Result<(), DomainError> {
        let stored = StoredScene {
            channel_id: scene.channel_id(),
            document: encode_scene(scene),
            updated_at: self.clock.now(),
        };
        self.repo.save(&stored).await?;
        debug!(channel_id = %scene.channel_id(), "scene saved");
        Ok(())
    }

    /// Deletes the scene for a channel, if any.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn remove(&self, channel_id: ChannelId) -> Result<(), DomainError> {
        self.repo.remove(channel_id).await
    }
}
