use crate::defaults;
use crate::error::{Result, SubgenError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub tools: ToolsConfig,
    pub jobs: JobsConfig,
    pub translation: TranslationConfig,
}

/// Where uploads, intermediate files and finished subtitles live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
}

/// External tool locations and limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub whisper_path: String,
    pub models_dir: PathBuf,
    pub stage_timeout_secs: u64,
}

/// Job execution and retention configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JobsConfig {
    pub max_concurrent: usize,
    pub queue_capacity: usize,
    pub retention_secs: u64,
    pub sweep_interval_secs: u64,
}

/// Translation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationConfig {
    pub call_delay_ms: u64,
}

fn base_dir() -> PathBuf {
    std::env::temp_dir().join("subgen")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: base_dir().join("uploads"),
            output_dir: base_dir().join("outputs"),
            temp_dir: base_dir().join("temp"),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        let models_dir = dirs::cache_dir()
            .unwrap_or_else(base_dir)
            .join("subgen/models");
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            whisper_path: "whisper-cli".to_string(),
            models_dir,
            stage_timeout_secs: defaults::STAGE_TIMEOUT.as_secs(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::MAX_CONCURRENT_JOBS,
            queue_capacity: defaults::QUEUE_CAPACITY,
            retention_secs: defaults::JOB_RETENTION.as_secs(),
            sweep_interval_secs: defaults::SWEEP_INTERVAL.as_secs(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            call_delay_ms: defaults::TRANSLATE_CALL_DELAY.as_millis() as u64,
        }
    }
}

impl ToolsConfig {
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }
}

impl JobsConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl TranslationConfig {
    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.call_delay_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Config = toml::from_str(&contents)?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn validate(&self) -> Result<()> {
        fn at_least_one(key: &str) -> SubgenError {
            SubgenError::ConfigInvalidValue {
                key: key.to_string(),
                message: "must be at least 1".to_string(),
            }
        }
        if self.jobs.max_concurrent == 0 {
            return Err(at_least_one("jobs.max_concurrent"));
        }
        if self.jobs.queue_capacity == 0 {
            return Err(at_least_one("jobs.queue_capacity"));
        }
        if self.tools.stage_timeout_secs == 0 {
            return Err(at_least_one("tools.stage_timeout_secs"));
        }
        Ok(())
    }
}
