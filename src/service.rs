//! Service composition root.
//!
//! Wires the registry, pipeline, worker pool and sweeper together behind
//! the caller-facing submit/status/result/list surface. This is the one
//! place that creates storage directories and spawns background tasks.

use crate::audio::{AudioExtractor, FfmpegAudioExtractor};
use crate::config::Config;
use crate::error::{Result, SubgenError};
use crate::jobs::registry::JobRegistry;
use crate::jobs::sweeper;
use crate::jobs::{Job, JobRequest, TranscriptionResult};
use crate::pipeline::worker::WorkerPool;
use crate::pipeline::{EngineFactory, Pipeline};
use crate::stt::resolve_engine;
use crate::subtitle::container::{ContainerParser, FfmpegContainerParser};
use crate::translate::TranslationProvider;
use crate::translate::google::GoogleTranslateProvider;
use log::info;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub struct SubgenService {
    config: Config,
    registry: Arc<JobRegistry>,
    pipeline: Arc<Pipeline>,
    pool: WorkerPool,
    sweeper: JoinHandle<()>,
}

impl SubgenService {
    /// Production wiring: ffmpeg/ffprobe container parsing, Google
    /// translation, engines resolved by name.
    pub fn new(config: Config) -> Result<Self> {
        let container = Arc::new(FfmpegContainerParser::new(
            &config.tools.ffmpeg_path,
            &config.tools.ffprobe_path,
            config.tools.stage_timeout(),
        ));
        let translator = Arc::new(GoogleTranslateProvider::new());
        Self::with_collaborators(config, container, translator, None, None)
    }

    /// Wiring with explicit collaborators; tests pass mocks here. `None`
    /// falls back to the production engine factory and ffmpeg extraction.
    pub fn with_collaborators(
        config: Config,
        container: Arc<dyn ContainerParser>,
        translator: Arc<dyn TranslationProvider>,
        engines: Option<EngineFactory>,
        extractor: Option<Arc<dyn AudioExtractor>>,
    ) -> Result<Self> {
        for dir in [
            &config.storage.upload_dir,
            &config.storage.output_dir,
            &config.storage.temp_dir,
            &config.tools.models_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }

        let engines = engines.unwrap_or_else(|| {
            let tools = config.tools.clone();
            Box::new(move |name| resolve_engine(name, &tools))
        });
        let extractor = extractor.unwrap_or_else(|| {
            Arc::new(FfmpegAudioExtractor::new(
                &config.tools.ffmpeg_path,
                config.tools.stage_timeout(),
            ))
        });

        let registry = Arc::new(JobRegistry::new());
        let pipeline = Arc::new(Pipeline::with_collaborators(
            registry.clone(),
            config.clone(),
            container,
            translator,
            extractor,
            engines,
        ));
        let pool = WorkerPool::spawn(
            pipeline.clone(),
            config.jobs.max_concurrent,
            config.jobs.queue_capacity,
        );
        let sweeper = sweeper::spawn_sweeper(
            registry.clone(),
            config.jobs.retention(),
            config.jobs.sweep_interval(),
        );
        info!(
            "service up: {} worker(s), retention {}",
            config.jobs.max_concurrent,
            humantime::format_duration(config.jobs.retention())
        );

        Ok(Self {
            config,
            registry,
            pipeline,
            pool,
            sweeper,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submit a media file for transcription. Returns the new job id with
    /// the job Queued; all stage work happens on a worker.
    pub async fn submit(
        &self,
        path: &Path,
        file_name: &str,
        request: JobRequest,
    ) -> Result<String> {
        validate_file_name(file_name)?;
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| SubgenError::InvalidRequest {
                message: format!("source file does not exist: {}", path.display()),
            })?;
        if metadata.len() == 0 {
            return Err(SubgenError::InvalidRequest {
                message: "source file is empty".to_string(),
            });
        }
        self.pipeline.check_engine(&request.engine)?;

        let id = Uuid::new_v4().to_string();
        let upload_path = self
            .config
            .storage
            .upload_dir
            .join(format!("{id}_{file_name}"));
        tokio::fs::copy(path, &upload_path).await?;

        let job = Job::new(&id, file_name, &upload_path, &request);
        self.registry.create(job).await?;
        self.pool.submit(id.clone(), request).await?;
        info!("job {id} queued for {file_name}");
        Ok(id)
    }

    /// Snapshot of one job's state.
    pub async fn status(&self, id: &str) -> Result<Job> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| SubgenError::JobNotFound { id: id.to_string() })
    }

    /// Result payload of a Completed job.
    pub async fn result(&self, id: &str) -> Result<TranscriptionResult> {
        let job = self.status(id).await?;
        job.result.ok_or(SubgenError::ResultNotReady {
            id: job.id,
            status: job.status.to_string(),
        })
    }

    /// All jobs, most recent first.
    pub async fn list(&self) -> Vec<Job> {
        self.registry.list().await
    }

    /// Run a retention sweep immediately. Returns how many jobs were
    /// removed.
    pub async fn sweep_now(&self) -> usize {
        sweeper::sweep(&self.registry, self.config.jobs.retention()).await
    }

    /// Stop the sweeper, drain queued jobs and wait for workers to finish.
    pub async fn shutdown(self) {
        self.sweeper.abort();
        self.pool.shutdown().await;
    }
}

fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.trim().is_empty() {
        return Err(SubgenError::InvalidRequest {
            message: "file name is empty".to_string(),
        });
    }
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return Err(SubgenError::InvalidRequest {
            message: format!("file name must not contain path components: {file_name}"),
        });
    }
    Ok(())
}
