//! Scene document store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::channel::ChannelId;
use crate::error::DomainError;

/// Stored representation of a scene: a self-describing JSON document keyed by
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredScene {
    /// Channel that owns the scene. Unique across the store.
    pub channel_id: ChannelId,
    /// Serialized scene, including its embedded schema version tag.
    pub document: serde_json::Value,
    /// Timestamp of the last write.
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for loading, upserting, and deleting scene documents.
#[async_trait]
pub trait SceneRepository: Send + Sync {
    /// Load the document for a channel.
    ///
    /// Returns `DomainError::NoCurrentScene` when the channel has no document.
    async fn find(&self, channel_id: ChannelId) -> Result<StoredScene, DomainError>;

    /// Insert or replace the document for `scene.channel_id` atomically.
    async fn save(&self, scene: &StoredScene) -> Result<(), DomainError>;

    /// Delete the document for a channel. Deleting a missing document is not
    /// an error.
    async fn remove(&self, channel_id: ChannelId) -> Result<(), DomainError>;
}
