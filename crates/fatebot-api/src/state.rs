//! Shared application state.

use std::sync::Arc;

use fatebot_core::clock::Clock;
use fatebot_core::display::DisplaySurface;
use fatebot_core::repository::SceneRepository;
use fatebot_scene::application::channel_guard::ChannelGuards;
use fatebot_scene::application::command_handlers::SceneContext;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for document timestamps.
    pub clock: Arc<dyn Clock>,
    /// Per-channel guards; one registry for the whole process.
    pub guards: Arc<ChannelGuards>,
    /// Scene document store.
    pub scene_repository: Arc<dyn SceneRepository>,
    /// Chat surface that shows each scene.
    pub display: Arc<dyn DisplaySurface>,
}

impl AppState {
    /// Create new application state with an empty guard registry.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        scene_repository: Arc<dyn SceneRepository>,
        display: Arc<dyn DisplaySurface>,
    ) -> Self {
        Self {
            clock,
            guards: Arc::new(ChannelGuards::new()),
            scene_repository,
            display,
        }
    }

    /// Borrows the collaborators a scene command runs with.
    #[must_use]
    pub fn scene_context(&self) -> SceneContext<'_> {
        SceneContext {
            clock: self.clock.as_ref(),
            guards: &self.guards,
            repo: self.scene_repository.as_ref(),
            display: self.display.as_ref(),
        }
    }
}
