//! Domain error types.

use thiserror::Error;

use crate::channel::ChannelId;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The channel has no active scene.
    #[error("no current scene in channel {0}")]
    NoCurrentScene(ChannelId),

    /// The referenced aspect does not exist in the current scene.
    #[error("no aspect with id {0} in the current scene")]
    AspectNotFound(u64),

    /// A proposed mutation violates one or more invariants.
    #[error("{message}: {}", complaints.join("; "))]
    Validation {
        /// Summary of what was being validated.
        message: String,
        /// Every rule the mutation violated.
        complaints: Vec<String>,
    },

    /// A stored document carries a schema version with no decoder or
    /// migration path.
    #[error("could not load scene for channel {channel_id}: unsupported schema version {found:?} (expected {expected})")]
    UnsupportedSchemaVersion {
        /// The channel whose document could not be loaded.
        channel_id: ChannelId,
        /// The version tag found in the document, if any.
        found: Option<i64>,
        /// The version this build reads and writes.
        expected: i64,
    },

    /// A stored document of the current version could not be decoded or
    /// breaks the scene invariants.
    #[error("could not load scene for channel {channel_id}: {reason}")]
    CorruptDocument {
        /// The channel whose document could not be loaded.
        channel_id: ChannelId,
        /// What was wrong with the document.
        reason: String,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Builds a validation error from a summary and its complaints.
    #[must_use]
    pub fn validation(message: impl Into<String>, complaints: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            complaints,
        }
    }
}
