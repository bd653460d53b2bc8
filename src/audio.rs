//! Audio extraction.
//!
//! Converts arbitrary media input into the 16kHz mono WAV the recognition
//! engines expect, via ffmpeg. The produced file is probed with hound before
//! being handed to an engine so that a silently-broken extraction fails here
//! with a clear message rather than deep inside the engine.

use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, SubgenError};
use crate::process::ToolCommand;
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Produces the recognition input waveform from a media file.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract one audio track from `media` into a fresh WAV under `temp_dir`.
    ///
    /// `audio_track` selects among the container's audio streams (0 is the
    /// first audio stream regardless of its absolute index).
    async fn extract(&self, media: &Path, audio_track: u32, temp_dir: &Path) -> Result<PathBuf>;
}

/// ffmpeg-backed extractor used in production, configured from
/// [`crate::config::ToolsConfig`].
pub struct FfmpegAudioExtractor {
    ffmpeg_path: String,
    timeout: Duration,
}

/// Basic properties of an extracted waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_seconds: f64,
}

impl FfmpegAudioExtractor {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl AudioExtractor for FfmpegAudioExtractor {
    async fn extract(&self, media: &Path, audio_track: u32, temp_dir: &Path) -> Result<PathBuf> {
        let wav_path = wav_output_path(media, temp_dir);
        debug!(
            "extracting audio track {} of {} to {}",
            audio_track,
            media.display(),
            wav_path.display()
        );

        ToolCommand::new(&self.ffmpeg_path, self.timeout)
            .args(["-y", "-i"])
            .arg(media.to_string_lossy())
            .args(["-ar", &SAMPLE_RATE.to_string()])
            .args(["-ac", "1"])
            .args(["-map", &format!("0:a:{}", audio_track)])
            .arg(wav_path.to_string_lossy())
            .expect_output(&wav_path)
            .run()
            .await?;

        probe_wav(&wav_path)?;
        Ok(wav_path)
    }
}

/// In-memory extractor for tests. Writes an empty placeholder file instead
/// of running ffmpeg, or fails the way a broken extraction would.
pub struct MockAudioExtractor {
    fail: bool,
}

impl MockAudioExtractor {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// Configure the mock to fail on extract
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Default for MockAudioExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioExtractor for MockAudioExtractor {
    async fn extract(&self, _media: &Path, _audio_track: u32, temp_dir: &Path) -> Result<PathBuf> {
        if self.fail {
            return Err(SubgenError::ExternalTool {
                tool: "ffmpeg".to_string(),
                exit_code: Some(1),
                stderr_excerpt: "mock extraction failure".to_string(),
            });
        }
        let path = temp_dir.join(format!("mock_{}.wav", Uuid::new_v4().simple()));
        tokio::fs::write(&path, b"").await?;
        Ok(path)
    }
}

fn wav_output_path(media: &Path, temp_dir: &Path) -> PathBuf {
    let stem = media
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "media".to_string());
    temp_dir.join(format!("{}_{}.wav", stem, Uuid::new_v4().simple()))
}

/// Validate an extracted WAV and return its properties.
///
/// Rejects files with the wrong sample rate or channel count, and files with
/// no samples at all (media with an empty audio stream).
pub fn probe_wav(path: &Path) -> Result<WavInfo> {
    let reader = hound::WavReader::open(path).map_err(|e| SubgenError::Other(format!(
        "extracted WAV is unreadable ({}): {}",
        path.display(),
        e
    )))?;
    let spec = reader.spec();
    let samples = reader.len();

    if spec.sample_rate != SAMPLE_RATE {
        return Err(SubgenError::Other(format!(
            "extracted WAV has sample rate {} (expected {})",
            spec.sample_rate, SAMPLE_RATE
        )));
    }
    if spec.channels != 1 {
        return Err(SubgenError::Other(format!(
            "extracted WAV has {} channels (expected mono)",
            spec.channels
        )));
    }
    if samples == 0 {
        return Err(SubgenError::NoContent {
            message: "extracted audio contains no samples".to_string(),
        });
    }

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_seconds: samples as f64 / spec.sample_rate as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..samples * channels as usize {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_probe_valid_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.wav");
        write_wav(&path, SAMPLE_RATE, 1, 16000);
        let info = probe_wav(&path).unwrap();
        assert_eq!(info.sample_rate, SAMPLE_RATE);
        assert_eq!(info.channels, 1);
        assert!((info.duration_seconds - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_probe_rejects_wrong_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rate.wav");
        write_wav(&path, 44100, 1, 1000);
        let result = probe_wav(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("sample rate"));
    }

    #[test]
    fn test_probe_rejects_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, SAMPLE_RATE, 2, 1000);
        let result = probe_wav(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("channels"));
    }

    #[test]
    fn test_probe_rejects_empty_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&path, SAMPLE_RATE, 1, 0);
        match probe_wav(&path) {
            Err(SubgenError::NoContent { .. }) => {}
            other => panic!("expected NoContent, got {:?}", other),
        }
    }

    #[test]
    fn test_probe_missing_file_is_error() {
        assert!(probe_wav(Path::new("/nonexistent/x.wav")).is_err());
    }

    #[tokio::test]
    async fn test_mock_extractor_writes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = MockAudioExtractor::new()
            .extract(Path::new("/in/movie.mkv"), 0, dir.path())
            .await
            .unwrap();
        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with(".wav"));
    }

    #[tokio::test]
    async fn test_mock_extractor_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = MockAudioExtractor::new()
            .with_failure()
            .extract(Path::new("/in/movie.mkv"), 0, dir.path())
            .await;
        match result {
            Err(SubgenError::ExternalTool { tool, .. }) => assert_eq!(tool, "ffmpeg"),
            other => panic!("expected ExternalTool, got {:?}", other),
        }
    }

    #[test]
    fn test_wav_output_path_unique() {
        let a = wav_output_path(Path::new("/in/movie.mkv"), Path::new("/tmp"));
        let b = wav_output_path(Path::new("/in/movie.mkv"), Path::new("/tmp"));
        assert_ne!(a, b);
        assert!(a.to_string_lossy().ends_with(".wav"));
        assert!(a.to_string_lossy().contains("movie_"));
    }
}
