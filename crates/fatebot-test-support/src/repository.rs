//! Test repositories: mock `SceneRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fatebot_core::channel::ChannelId;
use fatebot_core::error::DomainError;
use fatebot_core::repository::{SceneRepository, StoredScene};

/// A scene repository backed by a `HashMap`. Optionally sleeps inside `find`
/// (after reading) and `save` (before writing) to widen race windows in
/// concurrency tests.
#[derive(Debug, Default)]
pub struct InMemorySceneRepository {
    documents: Mutex<HashMap<ChannelId, StoredScene>>,
    delay: Option<Duration>,
    saves: AtomicUsize,
}

impl InMemorySceneRepository {
    /// Create an empty repository with no artificial delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty repository whose reads and writes each take `delay`.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Seed a document directly, bypassing the delay.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert(&self, scene: StoredScene) {
        self.documents
            .lock()
            .unwrap()
            .insert(scene.channel_id, scene);
    }

    /// Returns a copy of the stored document for a channel.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stored(&self, channel_id: ChannelId) -> Option<StoredScene> {
        self.documents.lock().unwrap().get(&channel_id).cloned()
    }

    /// Number of documents currently stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    /// Whether the repository holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful `save` calls.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SceneRepository for InMemorySceneRepository {
    async fn find(&self, channel_id: ChannelId) -> Result<StoredScene, DomainError> {
        let found = self.documents.lock().unwrap().get(&channel_id).cloned();
        self.pause().await;
        found.ok_or(DomainError::NoCurrentScene(channel_id))
    }

    async fn save(&self, scene: &StoredScene) -> Result<(), DomainError> {
        self.pause().await;
        self.documents
            .lock()
            .unwrap()
            .insert(scene.channel_id, scene.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, channel_id: ChannelId) -> Result<(), DomainError> {
        self.documents.lock().unwrap().remove(&channel_id);
        Ok(())
    }
}

/// A scene repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingSceneRepository;

#[async_trait]
impl SceneRepository for FailingSceneRepository {
    async fn find(&self, _channel_id: ChannelId) -> Result<StoredScene, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save(&self, _scene: &StoredScene) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn remove(&self, _channel_id: ChannelId) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
