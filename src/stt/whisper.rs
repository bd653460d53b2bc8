//! whisper.cpp CLI recognition engine.
//!
//! Drives the `whisper-cli` binary over an extracted WAV with `--output-srt`,
//! then parses the SRT file it leaves next to the input. Different whisper.cpp
//! builds name that file either `input.wav.srt` or `input.srt`, so both are
//! checked.

use crate::error::{Result, SubgenError};
use crate::process::ToolCommand;
use crate::stt::{RecognitionEngine, RecognitionRequest};
use crate::subtitle::{Segment, srt};
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct WhisperCppEngine {
    whisper_path: String,
    timeout: Duration,
}

impl WhisperCppEngine {
    pub fn new(whisper_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            whisper_path: whisper_path.into(),
            timeout,
        }
    }

    fn srt_candidates(wav_path: &Path) -> [PathBuf; 2] {
        let appended = PathBuf::from(format!("{}.srt", wav_path.display()));
        let replaced = wav_path.with_extension("srt");
        [appended, replaced]
    }
}

#[async_trait]
impl RecognitionEngine for WhisperCppEngine {
    fn name(&self) -> &str {
        "whisper-cpp"
    }

    async fn transcribe(&self, request: RecognitionRequest) -> Result<Vec<Segment>> {
        let mut command = ToolCommand::new(&self.whisper_path, self.timeout)
            .args(["--model", &request.model_path.to_string_lossy()])
            .arg("--output-srt")
            .arg("--print-progress");

        if let Some(language) = &request.language {
            command = command.args(["--language", language]);
        }
        if request.translate_to_english {
            command = command.args(["--task", "translate"]);
        }
        if let Some(progress) = request.progress.clone() {
            command = command.on_stderr_line(Box::new(move |line| {
                if let Some(pct) = parse_progress_line(line) {
                    progress(pct);
                }
            }));
        }

        command
            .arg(request.wav_path.to_string_lossy())
            .run()
            .await?;

        let srt_path = Self::srt_candidates(&request.wav_path)
            .into_iter()
            .find(|p| p.exists())
            .ok_or_else(|| SubgenError::ExternalTool {
                tool: "whisper-cli".to_string(),
                exit_code: Some(0),
                stderr_excerpt: "exited successfully but wrote no SRT output".to_string(),
            })?;

        debug!("whisper output at {}", srt_path.display());
        let text = tokio::fs::read_to_string(&srt_path).await?;
        let _ = tokio::fs::remove_file(&srt_path).await;

        // Silent audio legitimately yields an empty file; let the caller
        // decide whether that is an error.
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        srt::deserialize(&text)
    }
}

/// Parse a whisper.cpp progress line, e.g.
/// `whisper_print_progress_callback: progress =  15%`.
fn parse_progress_line(line: &str) -> Option<u8> {
    if !line.contains("progress") {
        return None;
    }
    let (_, rest) = line.split_once('=')?;
    let digits = rest.trim().strip_suffix('%')?;
    let pct: u8 = digits.trim().parse().ok()?;
    Some(pct.min(100))
}
