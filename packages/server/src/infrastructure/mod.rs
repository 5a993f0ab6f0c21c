//! Infrastructure layer: concrete collaborators and wire formats.

pub mod dto;
pub mod media_engine;
pub mod registry;
