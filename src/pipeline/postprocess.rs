//! Subtitle quality post-processing.
//!
//! Recognition output is serviceable but rough: noise annotations like
//! `[BLANK_AUDIO]`, stuttered duplicate segments, missing sentence-final
//! punctuation, blink-and-miss display times. Each fix here is independently
//! switchable; the pipeline runs them all unless the request disables the
//! stage entirely.

use crate::subtitle::{Segment, renumber};

/// Shortest time a segment may stay on screen, in seconds.
const MIN_SEGMENT_DURATION: f64 = 0.5;

/// Largest gap across which consecutive duplicate segments are merged.
const MAX_MERGE_GAP: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct PostProcessOptions {
    /// Drop segments that are only noise annotations or whitespace
    pub strip_annotations: bool,
    /// Merge consecutive segments with identical text
    pub merge_duplicates: bool,
    /// Append a period to sentences left hanging
    pub add_periods: bool,
    /// Capitalize the first letter after a sentence break
    pub fix_casing: bool,
    /// Extend segments displayed too briefly to read
    pub fix_short_durations: bool,
}

impl Default for PostProcessOptions {
    fn default() -> Self {
        Self {
            strip_annotations: true,
            merge_duplicates: true,
            add_periods: true,
            fix_casing: true,
            fix_short_durations: true,
        }
    }
}

/// Apply the enabled fixes in order and renumber the result.
pub fn post_process(mut segments: Vec<Segment>, options: &PostProcessOptions) -> Vec<Segment> {
    if options.strip_annotations {
        segments.retain(|s| !is_annotation_only(&s.text));
    }
    if options.merge_duplicates {
        segments = merge_duplicates(segments);
    }
    if options.add_periods {
        add_periods(&mut segments);
    }
    if options.fix_casing {
        fix_casing(&mut segments);
    }
    if options.fix_short_durations {
        fix_short_durations(&mut segments);
    }
    renumber(&mut segments);
    segments
}

/// Whisper marks non-speech audio with bracketed or parenthesized tags
/// (`[BLANK_AUDIO]`, `(upbeat music)`, `♪ ... ♪`).
fn is_annotation_only(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    let stripped: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')' | '♪' | '*'))
        .collect();
    if stripped.trim().is_empty() {
        return true;
    }
    (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('(') && trimmed.ends_with(')'))
        || (trimmed.starts_with('♪') && trimmed.ends_with('♪'))
}

fn merge_duplicates(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        if let Some(last) = merged.last_mut()
            && last.text.trim() == segment.text.trim()
            && segment.start_seconds - last.end_seconds <= MAX_MERGE_GAP
        {
            last.end_seconds = last.end_seconds.max(segment.end_seconds);
            continue;
        }
        merged.push(segment);
    }
    merged
}

fn ends_with_terminal_punctuation(text: &str) -> bool {
    matches!(
        text.trim_end().chars().last(),
        Some('.' | '!' | '?' | ':' | ',' | ';' | '…' | '"' | '\'')
    )
}

fn add_periods(segments: &mut [Segment]) {
    let count = segments.len();
    for (i, segment) in segments.iter_mut().enumerate() {
        let text = segment.text.trim_end();
        if text.is_empty() || ends_with_terminal_punctuation(text) {
            continue;
        }
        // Only close a sentence at the end of the set; mid-set lines may
        // continue into the next segment.
        if i + 1 == count {
            segment.text = format!("{text}.");
        }
    }
}

fn fix_casing(segments: &mut [Segment]) {
    let mut sentence_start = true;
    for segment in segments.iter_mut() {
        if sentence_start {
            segment.text = capitalize_first(&segment.text);
        }
        sentence_start = matches!(
            segment.text.trim_end().chars().last(),
            Some('.' | '!' | '?' | '…')
        );
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn fix_short_durations(segments: &mut [Segment]) {
    let count = segments.len();
    for i in 0..count {
        if segments[i].duration() >= MIN_SEGMENT_DURATION {
            continue;
        }
        let wanted_end = segments[i].start_seconds + MIN_SEGMENT_DURATION;
        // Never overlap the following segment
        let limit = if i + 1 < count {
            segments[i + 1].start_seconds
        } else {
            f64::INFINITY
        };
        segments[i].end_seconds = wanted_end.min(limit).max(segments[i].end_seconds);
    }
}
