//! Default configuration constants for subgen.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Waveform sample rate in Hz expected by the recognition engines.
///
/// 16kHz mono is the standard input for speech recognition; the audio
/// extraction stage always resamples to this rate.
pub const SAMPLE_RATE: u32 = 16000;

/// Default recognition engine name.
pub const DEFAULT_ENGINE: &str = "whisper-cpp";

/// Default model tier.
///
/// "base" (multilingual) supports auto-detection of any language.
/// Use "base.en" explicitly for English-only optimized transcription.
pub const DEFAULT_MODEL: &str = "base";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Confidence recorded for segments when the engine reports none.
pub const PLACEHOLDER_CONFIDENCE: f64 = 0.95;

/// Delay between per-segment translation calls, to stay under the
/// provider's informal rate limit.
pub const TRANSLATE_CALL_DELAY: Duration = Duration::from_millis(100);

/// Maximum wall time for a single external tool invocation.
pub const STAGE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How long finished jobs and their files are kept before the sweeper
/// removes them.
pub const JOB_RETENTION: Duration = Duration::from_secs(48 * 60 * 60);

/// Interval between periodic retention sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Number of pipeline workers running jobs concurrently.
pub const MAX_CONCURRENT_JOBS: usize = 2;

/// Capacity of the submission queue feeding the worker pool.
pub const QUEUE_CAPACITY: usize = 64;

/// Characters of stderr kept in an external-tool error message.
pub const STDERR_EXCERPT_LEN: usize = 2000;

/// Number of leading segments sampled for source-language detection.
pub const DETECT_SAMPLE_SEGMENTS: usize = 5;
