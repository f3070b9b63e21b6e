//! Per-channel mutual exclusion.
//!
//! Every command touching a channel's scene holds that channel's guard for
//! its whole find → mutate → save → render sequence. Guards for different
//! channels are independent. Entries are created on first use and never
//! evicted; the map is bounded by the number of channels the bot can see.

use std::sync::Arc;

use dashmap::DashMap;
use fatebot_core::channel::ChannelId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held while a command owns a channel. Dropping it (including when the
/// owning task is cancelled) releases the channel.
pub type ChannelGuard = OwnedMutexGuard<()>;

/// Process-wide registry of per-channel locks.
#[derive(Debug, Default)]
pub struct ChannelGuards {
    locks: DashMap<ChannelId, Arc<Mutex<()>>>,
}

impl ChannelGuards {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive ownership of `channel_id`.
    pub async fn lock(&self, channel_id: ChannelId) -> ChannelGuard {
        // The map shard lock must be released before awaiting.
        let lock = Arc::clone(self.locks.entry(channel_id).or_default().value());
        lock.lock_owned().await
    }

    /// Takes ownership of `channel_id` only if no other command holds it.
    #[must_use]
    pub fn try_lock(&self, channel_id: ChannelId) -> Option<ChannelGuard> {
        let lock = Arc::clone(self.locks.entry(channel_id).or_default().value());
        lock.try_lock_owned().ok()
    }

    /// Number of channels that have ever been locked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no channel has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
