//! fatebot core: shared abstractions.
//!
//! This crate defines the identifiers, error taxonomy, and collaborator
//! traits (document store, display surface, clock) that the scene context
//! depends on. It contains no infrastructure code.

pub mod channel;
pub mod clock;
pub mod command;
pub mod display;
pub mod error;
pub mod repository;
