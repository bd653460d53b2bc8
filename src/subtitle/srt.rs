//! SubRip (SRT) serialization and parsing.
//!
//! Numbered blocks separated by blank lines, with
//! `HH:MM:SS,mmm --> HH:MM:SS,mmm` timing lines. Parsing is tolerant:
//! malformed blocks are skipped, CRLF input is accepted, and a `.` decimal
//! separator is accepted alongside the canonical `,`.

use crate::error::{Result, SubgenError};
use crate::subtitle::{Segment, renumber};

/// Serialize segments to SRT text.
///
/// Segments are written in order with their own numbering; callers that need
/// contiguous numbers renumber first.
pub fn serialize(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str(&segment.number.to_string());
        out.push('\n');
        out.push_str(&format_timestamp(segment.start_seconds));
        out.push_str(" --> ");
        out.push_str(&format_timestamp(segment.end_seconds));
        out.push('\n');
        out.push_str(segment.text.trim_end());
        out.push_str("\n\n");
    }
    out
}

/// Parse SRT text into segments.
///
/// Returns an error only when the input contains no parsable block at all;
/// individual malformed blocks are skipped. Output is renumbered.
pub fn deserialize(text: &str) -> Result<Vec<Segment>> {
    let normalized = text.replace("\r\n", "\n");
    let mut segments = Vec::new();

    for block in normalized.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        if let Some(segment) = parse_block(block) {
            segments.push(segment);
        }
    }

    if segments.is_empty() && !normalized.trim().is_empty() {
        return Err(SubgenError::SubtitleParse {
            message: "no valid subtitle blocks found".to_string(),
        });
    }

    renumber(&mut segments);
    Ok(segments)
}

fn parse_block(block: &str) -> Option<Segment> {
    let mut lines = block.lines();

    // First line: sequence number. Some emitters omit it; in that case the
    // timing line comes first.
    let first = lines.next()?.trim();
    let (number, timing_line) = match first.parse::<u32>() {
        Ok(n) => (n, lines.next()?.trim().to_string()),
        Err(_) => (0, first.to_string()),
    };

    let (start, end) = parse_timing(&timing_line)?;
    if end < start {
        return None;
    }

    let text = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    if text.is_empty() {
        return None;
    }

    Some(Segment::new(number, start, end, text))
}

fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let (start, end) = line.split_once("-->")?;
    Some((
        parse_timestamp(start.trim())?,
        parse_timestamp(end.trim())?,
    ))
}

/// Parse `HH:MM:SS,mmm` (or `HH:MM:SS.mmm`) into seconds.
fn parse_timestamp(ts: &str) -> Option<f64> {
    let normalized = ts.replace(',', ".");
    let mut parts = normalized.split(':');
    let hours: f64 = parts.next()?.trim().parse().ok()?;
    let minutes: f64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Format seconds as `HH:MM:SS,mmm`.
fn format_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let secs = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello there\n\n2\n00:00:03,000 --> 00:00:04,000\nSecond line\n";

    #[test]
    fn test_deserialize_sample() {
        let segments = deserialize(SAMPLE).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].number, 1);
        assert_eq!(segments[0].start_seconds, 1.0);
        assert_eq!(segments[0].end_seconds, 2.5);
        assert_eq!(segments[0].text, "Hello there");
        assert_eq!(segments[1].text, "Second line");
    }

    #[test]
    fn test_serialize_formats_timestamps() {
        let segments = vec![Segment::new(1, 1.0, 2.5, "Hello there")];
        let srt = serialize(&segments);
        assert!(srt.contains("00:00:01,000 --> 00:00:02,500"));
        assert!(srt.starts_with("1\n"));
        assert!(srt.ends_with("\n\n"));
    }

    #[test]
    fn test_round_trip_preserves_segments() {
        let original = deserialize(SAMPLE).unwrap();
        let reparsed = deserialize(&serialize(&original)).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_round_trip_multiline_text() {
        let segments = vec![Segment::new(1, 0.0, 2.0, "line one\nline two")];
        let reparsed = deserialize(&serialize(&segments)).unwrap();
        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].text, "line one\nline two");
    }

    #[test]
    fn test_deserialize_crlf_input() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        let segments = deserialize(&crlf).unwrap();
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_deserialize_dot_millis_separator() {
        let srt = "1\n00:00:00.500 --> 00:00:01.750\nDotted\n";
        let segments = deserialize(srt).unwrap();
        assert_eq!(segments[0].start_seconds, 0.5);
        assert_eq!(segments[0].end_seconds, 1.75);
    }

    #[test]
    fn test_deserialize_skips_malformed_block() {
        let srt = "1\nnot a timing line\ngarbage\n\n2\n00:00:01,000 --> 00:00:02,000\nGood\n";
        let segments = deserialize(srt).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Good");
        // Renumbered after the skip
        assert_eq!(segments[0].number, 1);
    }

    #[test]
    fn test_deserialize_rejects_end_before_start() {
        let srt = "1\n00:00:05,000 --> 00:00:02,000\nBackwards\n\n2\n00:00:06,000 --> 00:00:07,000\nOk\n";
        let segments = deserialize(srt).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Ok");
    }

    #[test]
    fn test_deserialize_empty_input() {
        let segments = deserialize("").unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_deserialize_garbage_is_error() {
        let result = deserialize("complete nonsense with no blocks");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_missing_number_line() {
        // whisper.cpp sometimes emits blocks without sequence numbers
        let srt = "00:00:00,000 --> 00:00:01,000\nNo number\n";
        let segments = deserialize(srt).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].number, 1);
    }

    #[test]
    fn test_format_timestamp_over_an_hour() {
        assert_eq!(format_timestamp(3723.042), "01:02:03,042");
    }

    #[test]
    fn test_parse_timestamp_rejects_extra_fields() {
        assert!(parse_timestamp("00:00:00:00,000").is_none());
    }
}
