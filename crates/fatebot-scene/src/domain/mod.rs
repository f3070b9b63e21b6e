//! Pure scene model: entities, commands, rendering, and the document codec.

pub mod aggregates;
pub mod commands;
pub mod document;
pub mod render;
