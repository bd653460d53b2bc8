//! Speech recognition engines.

pub mod whisper;

use crate::config::ToolsConfig;
use crate::error::{Result, SubgenError};
use crate::subtitle::Segment;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reports recognition progress as a percentage of the audio processed.
pub type ProgressHook = Arc<dyn Fn(u8) + Send + Sync>;

/// One recognition invocation.
#[derive(Clone)]
pub struct RecognitionRequest {
    /// 16kHz mono WAV produced by the extraction stage
    pub wav_path: PathBuf,
    /// Resolved model file
    pub model_path: PathBuf,
    /// Source language code, or `None` for engine auto-detection
    pub language: Option<String>,
    /// Ask the engine to emit English regardless of the source language
    pub translate_to_english: bool,
    /// Optional in-stage progress reporting
    pub progress: Option<ProgressHook>,
}

/// Trait for speech-to-text recognition over an extracted waveform.
///
/// This trait allows swapping implementations (real whisper.cpp vs mock).
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Engine identifier used in job submissions.
    fn name(&self) -> &str;

    /// Transcribe the request's waveform into timed segments.
    ///
    /// An empty segment list is a valid outcome (silent audio); the caller
    /// decides whether that is an error.
    async fn transcribe(&self, request: RecognitionRequest) -> Result<Vec<Segment>>;
}

/// Look up a recognition engine by name.
///
/// Unknown names are rejected at submission time so a bad request never
/// occupies a worker.
pub fn resolve_engine(name: &str, tools: &ToolsConfig) -> Result<Arc<dyn RecognitionEngine>> {
    if name.contains("whisper") {
        return Ok(Arc::new(whisper::WhisperCppEngine::new(
            &tools.whisper_path,
            tools.stage_timeout(),
        )));
    }
    Err(SubgenError::UnsupportedEngine {
        engine: name.to_string(),
    })
}

/// Engine names [`resolve_engine`] accepts.
pub fn supported_engines() -> &'static [&'static str] {
    &["whisper-cpp"]
}

/// Mock engine for testing
pub struct MockRecognitionEngine {
    name: String,
    segments: Vec<Segment>,
    should_fail: bool,
    calls: AtomicUsize,
}

impl MockRecognitionEngine {
    /// Create a new mock engine with default settings
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            segments: vec![Segment::new(1, 0.0, 1.0, "mock transcription")],
            should_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the mock to return specific segments
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of transcribe calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockRecognitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecognitionEngine for MockRecognitionEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transcribe(&self, request: RecognitionRequest) -> Result<Vec<Segment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(progress) = &request.progress {
            progress(50);
            progress(100);
        }
        if self.should_fail {
            return Err(SubgenError::Other("mock recognition failure".to_string()));
        }
        Ok(self.segments.clone())
    }
}
