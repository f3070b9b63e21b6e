//! PostgreSQL-backed scene document store.

pub mod pg_scene_repository;
pub mod schema;
