//! Application layer: per-channel guards, the scene DAO, display
//! reconciliation, and the command/query handlers built on them.

pub mod channel_guard;
pub mod command_handlers;
pub mod query_handlers;
pub mod reconcile;
pub mod scene_dao;
