//! Embedded subtitle track discovery and extraction.
//!
//! Media containers (mkv, mp4) often already carry a text subtitle track.
//! When one exists in a usable codec, extracting it is both faster and more
//! accurate than transcribing the audio, so the pipeline checks here first.

use crate::error::Result;
use crate::process::ToolCommand;
use crate::subtitle::{Segment, srt};
use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Subtitle codecs ffmpeg can convert to SRT without OCR.
/// Bitmap formats (hdmv_pgs_subtitle, dvd_subtitle) are deliberately absent.
const TEXT_CODECS: &[&str] = &["subrip", "srt", "ass", "ssa", "mov_text", "webvtt", "text"];

/// One text subtitle stream found inside a media container.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedTrack {
    /// Absolute stream index within the container
    pub index: u32,
    pub codec: String,
    pub language: Option<String>,
}

/// Discovers and extracts embedded subtitle tracks.
#[async_trait]
pub trait ContainerParser: Send + Sync {
    /// List text subtitle tracks in the container. Media without any
    /// compatible track yields an empty list, never an error.
    async fn list_subtitle_tracks(&self, media: &Path) -> Result<Vec<EmbeddedTrack>>;

    /// Extract one track as parsed segments.
    async fn extract_track(
        &self,
        media: &Path,
        track: &EmbeddedTrack,
        temp_dir: &Path,
    ) -> Result<Vec<Segment>>;
}

/// ffprobe/ffmpeg backed parser used in production.
pub struct FfmpegContainerParser {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: u32,
    codec_name: Option<String>,
    #[serde(default)]
    tags: ProbeTags,
}

#[derive(Debug, Deserialize, Default)]
struct ProbeTags {
    language: Option<String>,
}

impl FfmpegContainerParser {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    fn extraction_path(media: &Path, track: &EmbeddedTrack, temp_dir: &Path) -> PathBuf {
        let stem = media
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "media".to_string());
        temp_dir.join(format!(
            "{}_s{}_{}.srt",
            stem,
            track.index,
            Uuid::new_v4().simple()
        ))
    }
}

#[async_trait]
impl ContainerParser for FfmpegContainerParser {
    async fn list_subtitle_tracks(&self, media: &Path) -> Result<Vec<EmbeddedTrack>> {
        let probe = ToolCommand::new(&self.ffprobe_path, self.timeout)
            .args(["-v", "error", "-select_streams", "s"])
            .args(["-show_entries", "stream=index,codec_name:stream_tags=language"])
            .args(["-of", "json"])
            .arg(media.to_string_lossy())
            .run()
            .await;

        // A probe failure means the container has nothing we can use, which
        // is the same as having no tracks. The transcription path still runs.
        let output = match probe {
            Ok(output) => output,
            Err(e) => {
                warn!("ffprobe failed on {}: {}", media.display(), e);
                return Ok(Vec::new());
            }
        };

        let parsed: ProbeOutput = match serde_json::from_str(&output.stdout) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("unparsable ffprobe output for {}: {}", media.display(), e);
                return Ok(Vec::new());
            }
        };

        let tracks: Vec<EmbeddedTrack> = parsed
            .streams
            .into_iter()
            .filter_map(|stream| {
                let codec = stream.codec_name?;
                if !TEXT_CODECS.contains(&codec.as_str()) {
                    return None;
                }
                Some(EmbeddedTrack {
                    index: stream.index,
                    codec,
                    language: stream.tags.language,
                })
            })
            .collect();

        debug!(
            "{}: {} usable embedded subtitle track(s)",
            media.display(),
            tracks.len()
        );
        Ok(tracks)
    }

    async fn extract_track(
        &self,
        media: &Path,
        track: &EmbeddedTrack,
        temp_dir: &Path,
    ) -> Result<Vec<Segment>> {
        let out_path = Self::extraction_path(media, track, temp_dir);

        ToolCommand::new(&self.ffmpeg_path, self.timeout)
            .args(["-y", "-i"])
            .arg(media.to_string_lossy())
            .args(["-map", &format!("0:{}", track.index)])
            .args(["-c:s", "srt"])
            .arg(out_path.to_string_lossy())
            .expect_output(&out_path)
            .run()
            .await?;

        let text = tokio::fs::read_to_string(&out_path).await?;
        let _ = tokio::fs::remove_file(&out_path).await;
        srt::deserialize(&text)
    }
}

/// In-memory parser for tests. Returns a fixed track list and segment set.
pub struct MockContainerParser {
    tracks: Vec<EmbeddedTrack>,
    segments: Vec<Segment>,
}

impl MockContainerParser {
    /// A parser that finds no embedded tracks.
    pub fn empty() -> Self {
        Self {
            tracks: Vec::new(),
            segments: Vec::new(),
        }
    }

    /// A parser that reports one subrip track yielding the given segments.
    pub fn with_segments(segments: Vec<Segment>) -> Self {
        Self {
            tracks: vec![EmbeddedTrack {
                index: 2,
                codec: "subrip".to_string(),
                language: Some("eng".to_string()),
            }],
            segments,
        }
    }
}

#[async_trait]
impl ContainerParser for MockContainerParser {
    async fn list_subtitle_tracks(&self, _media: &Path) -> Result<Vec<EmbeddedTrack>> {
        Ok(self.tracks.clone())
    }

    async fn extract_track(
        &self,
        _media: &Path,
        _track: &EmbeddedTrack,
        _temp_dir: &Path,
    ) -> Result<Vec<Segment>> {
        Ok(self.segments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_output_parsing() {
        let json = r#"{
            "streams": [
                {"index": 2, "codec_name": "subrip", "tags": {"language": "eng"}},
                {"index": 3, "codec_name": "hdmv_pgs_subtitle", "tags": {"language": "fra"}},
                {"index": 4, "codec_name": "ass"}
            ]
        }"#;
        let parsed: ProbeOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.streams.len(), 3);
        assert_eq!(parsed.streams[0].tags.language.as_deref(), Some("eng"));
        assert!(parsed.streams[2].tags.language.is_none());
    }

    #[test]
    fn test_text_codec_filter() {
        assert!(TEXT_CODECS.contains(&"subrip"));
        assert!(TEXT_CODECS.contains(&"mov_text"));
        assert!(!TEXT_CODECS.contains(&"hdmv_pgs_subtitle"));
        assert!(!TEXT_CODECS.contains(&"dvd_subtitle"));
    }

    #[test]
    fn test_extraction_path_is_unique_per_call() {
        let media = Path::new("/media/movie.mkv");
        let track = EmbeddedTrack {
            index: 2,
            codec: "subrip".to_string(),
            language: None,
        };
        let a = FfmpegContainerParser::extraction_path(media, &track, Path::new("/tmp"));
        let b = FfmpegContainerParser::extraction_path(media, &track, Path::new("/tmp"));
        assert_ne!(a, b);
        assert!(a.to_string_lossy().contains("movie_s2_"));
    }

    #[tokio::test]
    async fn test_mock_empty_reports_no_tracks() {
        let parser = MockContainerParser::empty();
        let tracks = parser
            .list_subtitle_tracks(Path::new("/x.mkv"))
            .await
            .unwrap();
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_mock_with_segments_round_trip() {
        let segments = vec![Segment::new(1, 0.0, 1.0, "embedded")];
        let parser = MockContainerParser::with_segments(segments.clone());
        let tracks = parser
            .list_subtitle_tracks(Path::new("/x.mkv"))
            .await
            .unwrap();
        assert_eq!(tracks.len(), 1);
        let extracted = parser
            .extract_track(Path::new("/x.mkv"), &tracks[0], Path::new("/tmp"))
            .await
            .unwrap();
        assert_eq!(extracted, segments);
    }
}
