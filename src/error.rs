//! Error types for subgen.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubgenError {
    // Submission validation errors; no job exists yet when these fire
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // Job registry errors
    #[error("Job not found: {id}")]
    JobNotFound { id: String },

    #[error("Duplicate job id: {id}")]
    DuplicateJobId { id: String },

    #[error("Job {id} has no result yet (status: {status})")]
    ResultNotReady { id: String, status: String },

    // External tool errors
    #[error("{tool} failed with exit code {code}: {stderr_excerpt}", code = exit_code_text(.exit_code))]
    ExternalTool {
        tool: String,
        exit_code: Option<i32>,
        stderr_excerpt: String,
    },

    #[error("{tool} did not finish within {timeout_secs}s and was killed")]
    ExternalToolTimeout { tool: String, timeout_secs: u64 },

    // Model resolution errors
    #[error("Model '{requested}' not found. Available models: {list}", list = available_text(.available))]
    ModelNotFound {
        requested: String,
        available: Vec<String>,
    },

    #[error("Recognition engine not supported: {engine}")]
    UnsupportedEngine { engine: String },

    // Pipeline content errors
    #[error("No speech or subtitles found: {message}")]
    NoContent { message: String },

    // Translation errors (per-segment, non-fatal to the job)
    #[error("Translation failed: {message}")]
    Translation { message: String },

    // Subtitle format errors
    #[error("Subtitle parse error: {message}")]
    SubtitleParse { message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP client errors (translation provider)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "unknown".to_string(),
    }
}

fn available_text(available: &[String]) -> String {
    if available.is_empty() {
        "none downloaded yet".to_string()
    } else {
        available.join(", ")
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SubgenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_request_display() {
        let error = SubgenError::InvalidRequest {
            message: "file is empty".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid request: file is empty");
    }

    #[test]
    fn test_job_not_found_display() {
        let error = SubgenError::JobNotFound {
            id: "abc-123".to_string(),
        };
        assert_eq!(error.to_string(), "Job not found: abc-123");
    }

    #[test]
    fn test_external_tool_display_with_exit_code() {
        let error = SubgenError::ExternalTool {
            tool: "ffmpeg".to_string(),
            exit_code: Some(1),
            stderr_excerpt: "no such file".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "ffmpeg failed with exit code 1: no such file"
        );
    }

    #[test]
    fn test_external_tool_display_without_exit_code() {
        let error = SubgenError::ExternalTool {
            tool: "whisper-cli".to_string(),
            exit_code: None,
            stderr_excerpt: "killed by signal".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "whisper-cli failed with exit code unknown: killed by signal"
        );
    }

    #[test]
    fn test_external_tool_timeout_display() {
        let error = SubgenError::ExternalToolTimeout {
            tool: "whisper-cli".to_string(),
            timeout_secs: 1800,
        };
        assert_eq!(
            error.to_string(),
            "whisper-cli did not finish within 1800s and was killed"
        );
    }

    #[test]
    fn test_model_not_found_lists_available() {
        let error = SubgenError::ModelNotFound {
            requested: "large".to_string(),
            available: vec!["tiny.en".to_string(), "base".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Model 'large' not found. Available models: tiny.en, base"
        );
    }

    #[test]
    fn test_model_not_found_empty_available() {
        let error = SubgenError::ModelNotFound {
            requested: "base".to_string(),
            available: vec![],
        };
        assert!(error.to_string().contains("none downloaded yet"));
    }

    #[test]
    fn test_unsupported_engine_display() {
        let error = SubgenError::UnsupportedEngine {
            engine: "vosk".to_string(),
        };
        assert_eq!(error.to_string(), "Recognition engine not supported: vosk");
    }

    #[test]
    fn test_no_content_display() {
        let error = SubgenError::NoContent {
            message: "the audio may not contain speech".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "No speech or subtitles found: the audio may not contain speech"
        );
    }

    #[test]
    fn test_result_not_ready_display() {
        let error = SubgenError::ResultNotReady {
            id: "j1".to_string(),
            status: "Transcribing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Job j1 has no result yet (status: Transcribing)"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: SubgenError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: SubgenError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SubgenError>();
        assert_sync::<SubgenError>();
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
