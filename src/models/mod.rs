//! Whisper model catalog and on-disk resolution.

pub mod catalog;
pub mod resolver;

pub use catalog::{ModelInfo, get_model, list_models};
pub use resolver::resolve_model;
