//! Subtitle translation.
//!
//! Translation runs per segment so timing is preserved exactly: N segments
//! in, N segments out, with only the text replaced. A failed call keeps that
//! segment's original text rather than failing the job, and calls are spaced
//! out to stay under the provider's informal rate limit.

use crate::defaults::DETECT_SAMPLE_SEGMENTS;
use crate::error::{Result, SubgenError};
use crate::subtitle::{Segment, renumber};
use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;

pub mod google;

/// Trait for text translation between languages.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate one piece of text. `source` may be "auto".
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Detect the language of a sample of text.
    async fn detect_language(&self, text: &str) -> Result<String>;

    /// `(name, code)` pairs of languages the provider can translate into.
    fn supported_languages(&self) -> &[(&'static str, &'static str)];
}

/// True when the provider can translate into `target`.
pub fn is_supported_target(provider: &dyn TranslationProvider, target: &str) -> bool {
    provider
        .supported_languages()
        .iter()
        .any(|(_, code)| *code == target)
}

/// Outcome of a segment-set translation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutcome {
    pub segments: Vec<Segment>,
    /// Detected source language, when detection succeeded
    pub detected_source: Option<String>,
    /// Segments whose translation call failed and kept their original text
    pub failed_segments: usize,
    /// True when translation was skipped because source and target match
    pub skipped: bool,
}

/// Translate a segment set into `target`, preserving count and timing.
///
/// The source language is detected from the leading segments; when it already
/// matches the target the set is returned unchanged. Individual call failures
/// are non-fatal.
pub async fn translate_segments(
    provider: &dyn TranslationProvider,
    mut segments: Vec<Segment>,
    target: &str,
    call_delay: Duration,
) -> TranslationOutcome {
    if segments.is_empty() {
        return TranslationOutcome {
            segments,
            detected_source: None,
            failed_segments: 0,
            skipped: false,
        };
    }

    let sample = segments
        .iter()
        .take(DETECT_SAMPLE_SEGMENTS)
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let detected_source = match provider.detect_language(&sample).await {
        Ok(lang) => Some(lang),
        Err(e) => {
            debug!("language detection failed, translating with auto source: {e}");
            None
        }
    };
    let source = detected_source.as_deref().unwrap_or("auto");

    if source == target {
        debug!("source language already {target}, skipping translation");
        return TranslationOutcome {
            segments,
            detected_source,
            failed_segments: 0,
            skipped: true,
        };
    }

    let mut failed_segments = 0;
    let count = segments.len();
    for (i, segment) in segments.iter_mut().enumerate() {
        match provider.translate(&segment.text, source, target).await {
            Ok(translated) if !translated.trim().is_empty() => {
                segment.text = translated;
            }
            Ok(_) => {
                warn!("empty translation for segment {}, keeping original", segment.number);
                failed_segments += 1;
            }
            Err(e) => {
                warn!(
                    "translation failed for segment {}, keeping original: {e}",
                    segment.number
                );
                failed_segments += 1;
            }
        }
        if i + 1 < count {
            tokio::time::sleep(call_delay).await;
        }
    }

    renumber(&mut segments);
    TranslationOutcome {
        segments,
        detected_source,
        failed_segments,
        skipped: false,
    }
}

/// Mock provider for testing
pub struct MockTranslationProvider {
    detected: String,
    fail_on: Option<String>,
}

impl MockTranslationProvider {
    /// Create a mock that detects the given source language and "translates"
    /// by tagging text with the target code.
    pub fn new(detected: &str) -> Self {
        Self {
            detected: detected.to_string(),
            fail_on: None,
        }
    }

    /// Configure the mock to fail on any text containing the substring
    pub fn with_failure_on(mut self, substring: &str) -> Self {
        self.fail_on = Some(substring.to_string());
        self
    }
}

#[async_trait]
impl TranslationProvider for MockTranslationProvider {
    async fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String> {
        if let Some(marker) = &self.fail_on
            && text.contains(marker.as_str())
        {
            return Err(SubgenError::Translation {
                message: "mock translation failure".to_string(),
            });
        }
        Ok(format!("[{target}] {text}"))
    }

    async fn detect_language(&self, _text: &str) -> Result<String> {
        Ok(self.detected.clone())
    }

    fn supported_languages(&self) -> &[(&'static str, &'static str)] {
        &[("English", "en"), ("Spanish", "es"), ("German", "de")]
    }
}
