//! fatebot API server library.
//!
//! Exposes the scene command surface over HTTP and talks to the chat gateway
//! that shows each scene as a pinned message.

pub mod config;
pub mod display;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
