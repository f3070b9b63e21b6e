//! Display surface abstraction: the external place where a scene is shown as
//! a pinned message.

use async_trait::async_trait;
use thiserror::Error;

use crate::channel::{ChannelId, MessageId};
use crate::error::DomainError;

/// Failures reported by a display surface.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The target message no longer exists (for example, a user deleted it).
    #[error("display message {0} not found")]
    NotFound(MessageId),

    /// The surface could not be reached or rejected the request.
    #[error("display transport error: {0}")]
    Transport(String),
}

impl From<DisplayError> for DomainError {
    fn from(err: DisplayError) -> Self {
        Self::Infrastructure(err.to_string())
    }
}

/// Operations the scene engine needs from the chat surface.
#[async_trait]
pub trait DisplaySurface: Send + Sync {
    /// Replace the content of an existing message.
    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> Result<(), DisplayError>;

    /// Post a new message and return its id.
    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<MessageId, DisplayError>;

    /// Pin a message in its channel.
    async fn pin_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DisplayError>;

    /// Unpin a message in its channel.
    async fn unpin_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DisplayError>;
}
