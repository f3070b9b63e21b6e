//! fatebot: scene and aspect state engine.
//!
//! Responsible for the per-channel scene document: aspect bookkeeping,
//! invariant enforcement, rendering, versioned persistence, per-channel
//! serialization of commands, and keeping the pinned display message in sync.

pub mod application;
pub mod domain;
