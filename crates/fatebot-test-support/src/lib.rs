//! Shared test doubles and utilities for the fatebot scene engine.

mod clock;
mod display;
mod repository;

pub use clock::FixedClock;
pub use display::{FailingDisplaySurface, RecordingDisplaySurface};
pub use repository::{FailingSceneRepository, InMemorySceneRepository};
