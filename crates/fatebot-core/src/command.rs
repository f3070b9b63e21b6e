//! Command abstractions.

use uuid::Uuid;

use crate::channel::ChannelId;

/// Trait that all scene commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// The channel whose scene this command targets.
    fn channel_id(&self) -> ChannelId;
}
