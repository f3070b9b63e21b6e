//! Test display surfaces: mock `DisplaySurface` implementations for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use fatebot_core::channel::{ChannelId, MessageId};
use fatebot_core::display::{DisplayError, DisplaySurface};

#[derive(Debug)]
struct DisplayState {
    messages: HashMap<(ChannelId, MessageId), String>,
    pinned: HashSet<(ChannelId, MessageId)>,
    next_id: u64,
    sent: usize,
}

/// An in-memory chat surface that records messages and pins. Tests can
/// delete a message to simulate a user removing it.
#[derive(Debug)]
pub struct RecordingDisplaySurface {
    state: Mutex<DisplayState>,
}

impl Default for RecordingDisplaySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDisplaySurface {
    /// Create an empty surface. Message ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DisplayState {
                messages: HashMap::new(),
                pinned: HashSet::new(),
                next_id: 1,
                sent: 0,
            }),
        }
    }

    /// Seed a message without counting it as sent by the code under test.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn post(&self, channel_id: ChannelId, content: &str) -> MessageId {
        let mut state = self.state.lock().unwrap();
        let id = MessageId(state.next_id);
        state.next_id += 1;
        state.messages.insert((channel_id, id), content.to_owned());
        id
    }

    /// Pin a seeded message.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn pin(&self, channel_id: ChannelId, message_id: MessageId) {
        self.state.lock().unwrap().pinned.insert((channel_id, message_id));
    }

    /// Delete a message (and its pin), as a user would.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) {
        let mut state = self.state.lock().unwrap();
        state.messages.remove(&(channel_id, message_id));
        state.pinned.remove(&(channel_id, message_id));
    }

    /// Current content of a message, if it exists.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn content(&self, channel_id: ChannelId, message_id: MessageId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .messages
            .get(&(channel_id, message_id))
            .cloned()
    }

    /// Whether a message is pinned.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn is_pinned(&self, channel_id: ChannelId, message_id: MessageId) -> bool {
        self.state
            .lock()
            .unwrap()
            .pinned
            .contains(&(channel_id, message_id))
    }

    /// Number of pinned messages in a channel.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn pinned_count(&self, channel_id: ChannelId) -> usize {
        self.state
            .lock()
            .unwrap()
            .pinned
            .iter()
            .filter(|(channel, _)| *channel == channel_id)
            .count()
    }

    /// Number of messages created through `send_message`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.state.lock().unwrap().sent
    }
}

#[async_trait]
impl DisplaySurface for RecordingDisplaySurface {
    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        let message = state
            .messages
            .get_mut(&(channel_id, message_id))
            .ok_or(DisplayError::NotFound(message_id))?;
        content.clone_into(message);
        Ok(())
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<MessageId, DisplayError> {
        let mut state = self.state.lock().unwrap();
        let id = MessageId(state.next_id);
        state.next_id += 1;
        state.sent += 1;
        state.messages.insert((channel_id, id), content.to_owned());
        Ok(id)
    }

    async fn pin_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if !state.messages.contains_key(&(channel_id, message_id)) {
            return Err(DisplayError::NotFound(message_id));
        }
        state.pinned.insert((channel_id, message_id));
        Ok(())
    }

    async fn unpin_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if !state.messages.contains_key(&(channel_id, message_id)) {
            return Err(DisplayError::NotFound(message_id));
        }
        state.pinned.remove(&(channel_id, message_id));
        Ok(())
    }
}

/// A display surface whose every call fails with a transport error.
#[derive(Debug)]
pub struct FailingDisplaySurface;

#[async_trait]
impl DisplaySurface for FailingDisplaySurface {
    async fn edit_message(
        &self,
        _channel_id: ChannelId,
        _message_id: MessageId,
        _content: &str,
    ) -> Result<(), DisplayError> {
        Err(DisplayError::Transport("gateway unavailable".into()))
    }

    async fn send_message(
        &self,
        _channel_id: ChannelId,
        _content: &str,
    ) -> Result<MessageId, DisplayError> {
        Err(DisplayError::Transport("gateway unavailable".into()))
    }

    async fn pin_message(
        &self,
        _channel_id: ChannelId,
        _message_id: MessageId,
    ) -> Result<(), DisplayError> {
        Err(DisplayError::Transport("gateway unavailable".into()))
    }

    async fn unpin_message(
        &self,
        _channel_id: ChannelId,
        _message_id: MessageId,
    ) -> Result<(), DisplayError> {
        Err(DisplayError::Transport("gateway unavailable".into()))
    }
}
