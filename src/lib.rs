//! subgen - media-to-subtitle transcription engine
//!
//! Turns a submitted media file into a timed SRT document through a staged
//! pipeline: embedded-track check, audio extraction, speech recognition,
//! quality post-processing and optional translation, orchestrated by an
//! in-memory job engine with bounded worker concurrency.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod jobs;
pub mod models;
pub mod pipeline;
pub mod process;
pub mod service;
pub mod stt;
pub mod subtitle;
pub mod translate;

// Core traits (collaborators the pipeline is generic over)
pub use audio::AudioExtractor;
pub use stt::RecognitionEngine;
pub use subtitle::container::ContainerParser;
pub use translate::TranslationProvider;

// Job engine surface
pub use jobs::{Job, JobRequest, JobStatus, TranscriptionResult};
pub use service::SubgenService;

// Error handling
pub use error::{Result, SubgenError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
