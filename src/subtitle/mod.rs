//! Subtitle data model.

pub mod container;
pub mod srt;

use crate::defaults;
use serde::{Deserialize, Serialize};

/// One timed line of subtitle text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// 1-based sequence number, contiguous after renumbering
    pub number: u32,
    /// Start offset in seconds
    pub start_seconds: f64,
    /// End offset in seconds (>= start)
    pub end_seconds: f64,
    /// Segment text (may span multiple lines)
    pub text: String,
    /// Recognition confidence, or a fixed placeholder when the engine
    /// reports none
    pub confidence: f64,
}

impl Segment {
    /// Create a segment with the placeholder confidence.
    pub fn new(number: u32, start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            number,
            start_seconds,
            end_seconds,
            text: text.into(),
            confidence: defaults::PLACEHOLDER_CONFIDENCE,
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        (self.end_seconds - self.start_seconds).max(0.0)
    }
}

/// Renumber segments to a contiguous 1-based sequence.
///
/// Called after any operation that creates or modifies a segment set.
pub fn renumber(segments: &mut [Segment]) {
    for (i, segment) in segments.iter_mut().enumerate() {
        segment.number = (i + 1) as u32;
    }
}

/// Join all segment texts into a single transcript string.
pub fn full_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.replace('\n', " "))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count whitespace-separated words across all segments.
pub fn word_count(segments: &[Segment]) -> usize {
    segments
        .iter()
        .map(|s| s.text.split_whitespace().count())
        .sum()
}

/// End offset of the last segment, in seconds. Zero for an empty set.
pub fn total_duration(segments: &[Segment]) -> f64 {
    segments.last().map(|s| s.end_seconds).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(n: u32, start: f64, end: f64, text: &str) -> Segment {
        Segment::new(n, start, end, text)
    }

    #[test]
    fn test_renumber_makes_contiguous_sequence() {
        let mut segments = vec![seg(7, 0.0, 1.0, "a"), seg(2, 1.0, 2.0, "b"), seg(9, 2.0, 3.0, "c")];
        renumber(&mut segments);
        let numbers: Vec<u32> = segments.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_full_text_joins_with_spaces() {
        let segments = vec![seg(1, 0.0, 1.0, "Hello"), seg(2, 1.0, 2.0, "world\nagain")];
        assert_eq!(full_text(&segments), "Hello world again");
    }

    #[test]
    fn test_word_count() {
        let segments = vec![seg(1, 0.0, 1.0, "one two three"), seg(2, 1.0, 2.0, "four")];
        assert_eq!(word_count(&segments), 4);
    }

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        let segments = vec![seg(1, 0.0, 1.0, "  spaced   out  ")];
        assert_eq!(word_count(&segments), 2);
    }

    #[test]
    fn test_total_duration_is_last_end() {
        let segments = vec![seg(1, 0.0, 1.5, "a"), seg(2, 2.0, 4.25, "b")];
        assert_eq!(total_duration(&segments), 4.25);
    }

    #[test]
    fn test_total_duration_empty() {
        assert_eq!(total_duration(&[]), 0.0);
    }

    #[test]
    fn test_segment_duration_never_negative() {
        let s = seg(1, 2.0, 1.0, "inverted");
        assert_eq!(s.duration(), 0.0);
    }

    #[test]
    fn test_new_segment_uses_placeholder_confidence() {
        let s = seg(1, 0.0, 1.0, "x");
        assert_eq!(s.confidence, defaults::PLACEHOLDER_CONFIDENCE);
    }
}
