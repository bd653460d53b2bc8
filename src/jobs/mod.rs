//! Job model and lifecycle state machine.

pub mod progress;
pub mod registry;
pub mod sweeper;

use crate::defaults;
use crate::subtitle::{self, Segment, srt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// Lifecycle states of a transcription job.
///
/// Transitions only move forward through the stage order, stages may be
/// skipped, and `Failed` is reachable from every non-terminal state.
/// Terminal states never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    ExtractingAudio,
    Transcribing,
    PostProcessing,
    Translating,
    Completed,
    Failed,
}

impl JobStatus {
    /// Position in the forward stage order. `Failed` sits outside it.
    fn rank(self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::ExtractingAudio => 1,
            JobStatus::Transcribing => 2,
            JobStatus::PostProcessing => 3,
            JobStatus::Translating => 4,
            JobStatus::Completed => 5,
            JobStatus::Failed => 6,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Single source of truth for legal transitions.
    pub fn can_transition(self, to: JobStatus) -> bool {
        if self.is_terminal() || to == self {
            return false;
        }
        if to == JobStatus::Failed {
            return true;
        }
        to.rank() > self.rank()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Queued => "Queued",
            JobStatus::ExtractingAudio => "ExtractingAudio",
            JobStatus::Transcribing => "Transcribing",
            JobStatus::PostProcessing => "PostProcessing",
            JobStatus::Translating => "Translating",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}

/// Caller-supplied parameters for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRequest {
    pub engine: String,
    pub model: String,
    /// Source language code, or "auto" for detection
    pub language: String,
    /// Target language for subtitle translation, when requested
    pub translate_to: Option<String>,
    pub use_post_processing: bool,
    /// Audio stream selector (0 is the container's first audio stream)
    pub audio_track: u32,
    /// Check for an embedded text subtitle track before transcribing
    pub prefer_embedded: bool,
}

impl Default for JobRequest {
    fn default() -> Self {
        Self {
            engine: defaults::DEFAULT_ENGINE.to_string(),
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::AUTO_LANGUAGE.to_string(),
            translate_to: None,
            use_post_processing: true,
            audio_track: 0,
            prefer_embedded: true,
        }
    }
}

/// Finished transcription payload attached to a Completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub segments: Vec<Segment>,
    pub srt_content: String,
    pub duration_seconds: f64,
    pub word_count: usize,
    pub segment_count: usize,
}

impl TranscriptionResult {
    /// Build the result payload from a final segment set.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self {
            text: subtitle::full_text(&segments),
            srt_content: srt::serialize(&segments),
            duration_seconds: subtitle::total_duration(&segments),
            word_count: subtitle::word_count(&segments),
            segment_count: segments.len(),
            segments,
        }
    }
}

/// One tracked transcription job.
///
/// Exactly one of `result` (Completed) and `error` (Failed) is set once the
/// job is terminal; both are `None` while it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub source_file_name: String,
    pub source_path: PathBuf,
    pub status: JobStatus,
    /// 0-100; monotonic while the job is not Failed
    pub progress: u8,
    pub engine: String,
    pub model: String,
    pub language: String,
    pub translate_to: Option<String>,
    pub output_path: Option<PathBuf>,
    pub result: Option<TranscriptionResult>,
    pub error: Option<String>,
    pub created_at: SystemTime,
    pub completed_at: Option<SystemTime>,
}

impl Job {
    pub fn new(
        id: impl Into<String>,
        source_file_name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        request: &JobRequest,
    ) -> Self {
        Self {
            id: id.into(),
            source_file_name: source_file_name.into(),
            source_path: source_path.into(),
            status: JobStatus::Queued,
            progress: 0,
            engine: request.engine.clone(),
            model: request.model.clone(),
            language: request.language.clone(),
            translate_to: request.translate_to.clone(),
            output_path: None,
            result: None,
            error: None,
            created_at: SystemTime::now(),
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        use JobStatus::*;
        assert!(Queued.can_transition(ExtractingAudio));
        assert!(ExtractingAudio.can_transition(Transcribing));
        assert!(Transcribing.can_transition(PostProcessing));
        assert!(PostProcessing.can_transition(Translating));
        assert!(Translating.can_transition(Completed));
    }

    #[test]
    fn test_stage_skipping_allowed() {
        use JobStatus::*;
        // Translation is optional
        assert!(PostProcessing.can_transition(Completed));
        // Embedded-track short-circuit skips extraction and recognition
        assert!(Queued.can_transition(PostProcessing));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        use JobStatus::*;
        assert!(!Transcribing.can_transition(ExtractingAudio));
        assert!(!PostProcessing.can_transition(Queued));
        assert!(!Translating.can_transition(Transcribing));
    }

    #[test]
    fn test_self_transition_rejected() {
        use JobStatus::*;
        assert!(!Queued.can_transition(Queued));
        assert!(!Transcribing.can_transition(Transcribing));
    }

    #[test]
    fn test_failed_reachable_from_every_non_terminal_state() {
        use JobStatus::*;
        for status in [Queued, ExtractingAudio, Transcribing, PostProcessing, Translating] {
            assert!(status.can_transition(Failed), "{status} -> Failed");
        }
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        use JobStatus::*;
        for terminal in [Completed, Failed] {
            for to in [Queued, ExtractingAudio, Transcribing, Completed, Failed] {
                assert!(!terminal.can_transition(to), "{terminal} -> {to}");
            }
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Translating.is_terminal());
    }

    #[test]
    fn test_default_request() {
        let request = JobRequest::default();
        assert_eq!(request.engine, "whisper-cpp");
        assert_eq!(request.model, "base");
        assert_eq!(request.language, "auto");
        assert!(request.translate_to.is_none());
        assert!(request.use_post_processing);
        assert_eq!(request.audio_track, 0);
        assert!(request.prefer_embedded);
    }

    #[test]
    fn test_new_job_starts_queued() {
        let job = Job::new("j1", "movie.mkv", "/in/movie.mkv", &JobRequest::default());
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_result_from_segments() {
        let segments = vec![
            Segment::new(1, 0.0, 1.5, "hello there"),
            Segment::new(2, 1.5, 3.0, "general"),
        ];
        let result = TranscriptionResult::from_segments(segments);
        assert_eq!(result.text, "hello there general");
        assert_eq!(result.word_count, 3);
        assert_eq!(result.segment_count, 2);
        assert_eq!(result.duration_seconds, 3.0);
        assert!(result.srt_content.contains("00:00:01,500"));
    }

    #[test]
    fn test_result_from_empty_segments() {
        let result = TranscriptionResult::from_segments(Vec::new());
        assert_eq!(result.segment_count, 0);
        assert_eq!(result.duration_seconds, 0.0);
        assert!(result.text.is_empty());
    }

    #[test]
    fn test_status_serializes_as_name() {
        let json = serde_json::to_string(&JobStatus::ExtractingAudio).unwrap();
        assert_eq!(json, "\"ExtractingAudio\"");
    }
}
