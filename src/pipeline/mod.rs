//! Pipeline orchestration.
//!
//! Runs the fixed stage order for one job: embedded-track check, audio
//! extraction, recognition, post-processing, optional translation, SRT
//! output. The whole pipeline for a job runs on one worker task; every
//! registry write goes through the validated mutation helpers so observable
//! state never skips the rules.

pub mod postprocess;
pub mod worker;

use crate::audio::{AudioExtractor, FfmpegAudioExtractor};
use crate::config::Config;
use crate::error::{Result, SubgenError};
use crate::jobs::progress::{self, TRANSLATED};
use crate::jobs::registry::JobRegistry;
use crate::jobs::{JobRequest, JobStatus, TranscriptionResult};
use crate::models::resolve_model;
use crate::stt::{RecognitionEngine, RecognitionRequest, resolve_engine};
use crate::subtitle::container::ContainerParser;
use crate::subtitle::{Segment, srt};
use crate::translate::{TranslationProvider, is_supported_target, translate_segments};
use log::{info, warn};
use postprocess::{PostProcessOptions, post_process};
use std::path::PathBuf;
use std::sync::Arc;

/// Produces an engine for a submitted engine name.
pub type EngineFactory =
    Box<dyn Fn(&str) -> Result<Arc<dyn RecognitionEngine>> + Send + Sync>;

pub struct Pipeline {
    registry: Arc<JobRegistry>,
    config: Config,
    container: Arc<dyn ContainerParser>,
    translator: Arc<dyn TranslationProvider>,
    extractor: Arc<dyn AudioExtractor>,
    engines: EngineFactory,
}

/// Removes temp artifacts on every exit path, including panics.
struct TempGuard {
    paths: Vec<PathBuf>,
}

impl TempGuard {
    fn new() -> Self {
        Self { paths: Vec::new() }
    }

    fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = std::fs::remove_file(path)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!("could not remove temp file {}: {}", path.display(), e);
            }
        }
    }
}

impl Pipeline {
    /// Production wiring: engines resolved by name from the tools config.
    pub fn new(
        registry: Arc<JobRegistry>,
        config: Config,
        container: Arc<dyn ContainerParser>,
        translator: Arc<dyn TranslationProvider>,
    ) -> Self {
        let tools = config.tools.clone();
        let engines: EngineFactory = Box::new(move |name| resolve_engine(name, &tools));
        Self::with_engines(registry, config, container, translator, engines)
    }

    /// Wiring with an explicit engine factory and ffmpeg extraction.
    pub fn with_engines(
        registry: Arc<JobRegistry>,
        config: Config,
        container: Arc<dyn ContainerParser>,
        translator: Arc<dyn TranslationProvider>,
        engines: EngineFactory,
    ) -> Self {
        let extractor = Arc::new(FfmpegAudioExtractor::new(
            &config.tools.ffmpeg_path,
            config.tools.stage_timeout(),
        ));
        Self::with_collaborators(registry, config, container, translator, extractor, engines)
    }

    /// Wiring with every collaborator explicit, used by tests to inject mocks.
    pub fn with_collaborators(
        registry: Arc<JobRegistry>,
        config: Config,
        container: Arc<dyn ContainerParser>,
        translator: Arc<dyn TranslationProvider>,
        extractor: Arc<dyn AudioExtractor>,
        engines: EngineFactory,
    ) -> Self {
        Self {
            registry,
            config,
            container,
            translator,
            extractor,
            engines,
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Verify an engine name resolves, without running anything.
    ///
    /// Submission-time check so an unsupported engine is rejected before a
    /// job exists, not after a worker picks it up.
    pub fn check_engine(&self, name: &str) -> Result<()> {
        (self.engines)(name).map(|_| ())
    }

    /// Run one job to a terminal state. Never returns an error: failures
    /// are recorded on the job itself.
    pub async fn execute(&self, job_id: &str, request: &JobRequest) {
        match self.run_stages(job_id, request).await {
            Ok(()) => info!("job {job_id} completed"),
            Err(e) => {
                warn!("job {job_id} failed: {e}");
                if let Err(e) = self.registry.fail(job_id, e.to_string()).await {
                    warn!("could not record failure for job {job_id}: {e}");
                }
            }
        }
    }

    async fn run_stages(&self, job_id: &str, request: &JobRequest) -> Result<()> {
        let job = self
            .registry
            .get(job_id)
            .await
            .ok_or_else(|| SubgenError::JobNotFound {
                id: job_id.to_string(),
            })?;
        let mut guard = TempGuard::new();

        // An embedded text track beats transcribing the audio.
        let mut via_embedded = false;
        let mut segments = if request.prefer_embedded {
            let embedded = self.try_embedded(&job.source_path).await;
            via_embedded = embedded.is_some();
            embedded
        } else {
            None
        };

        if segments.is_none() {
            segments = Some(self.transcribe(job_id, request, &job.source_path, &mut guard).await?);
        }
        let segments = segments.unwrap_or_default();

        if segments.is_empty() {
            return Err(SubgenError::NoContent {
                message: "the audio may not contain speech".to_string(),
            });
        }

        // The embedded short-circuit enters here directly from Queued.
        self.registry
            .transition(job_id, JobStatus::PostProcessing)
            .await?;
        let segments = if request.use_post_processing {
            let processed = post_process(segments, &PostProcessOptions::default());
            if processed.is_empty() {
                return Err(SubgenError::NoContent {
                    message: "no speech remained after post-processing".to_string(),
                });
            }
            processed
        } else {
            segments
        };

        let segments = self
            .maybe_translate(job_id, request, segments, via_embedded)
            .await?;

        let output_path = self.config.storage.output_dir.join(format!("{job_id}.srt"));
        tokio::fs::write(&output_path, srt::serialize(&segments)).await?;

        let result = TranscriptionResult::from_segments(segments);
        self.registry.complete(job_id, result, output_path).await
    }

    /// Embedded-track probe. `None` means fall through to transcription;
    /// "no track found" is not an error.
    async fn try_embedded(&self, source: &std::path::Path) -> Option<Vec<Segment>> {
        let tracks = match self.container.list_subtitle_tracks(source).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("embedded track probe failed, transcribing instead: {e}");
                return None;
            }
        };
        let track = tracks.first()?;
        info!(
            "using embedded subtitle track {} ({}) of {}",
            track.index,
            track.codec,
            source.display()
        );
        match self
            .container
            .extract_track(source, track, &self.config.storage.temp_dir)
            .await
        {
            Ok(segments) if !segments.is_empty() => Some(segments),
            Ok(_) => None,
            Err(e) => {
                warn!("embedded track extraction failed, transcribing instead: {e}");
                None
            }
        }
    }

    async fn transcribe(
        &self,
        job_id: &str,
        request: &JobRequest,
        source: &std::path::Path,
        guard: &mut TempGuard,
    ) -> Result<Vec<Segment>> {
        // Engine and model resolve before any heavy work runs.
        let engine = (self.engines)(&request.engine)?;
        let model_path = resolve_model(&self.config.tools.models_dir, &request.model)?;

        self.registry
            .transition(job_id, JobStatus::ExtractingAudio)
            .await?;
        let wav_path = self
            .extractor
            .extract(source, request.audio_track, &self.config.storage.temp_dir)
            .await?;
        guard.track(wav_path.clone());

        self.registry
            .transition(job_id, JobStatus::Transcribing)
            .await?;

        let language = if request.language == crate::defaults::AUTO_LANGUAGE {
            None
        } else {
            Some(request.language.clone())
        };
        // Ask the engine itself to produce English when that is the target
        // and the source is not already English.
        let translate_to_english = request.translate_to.as_deref() == Some("en")
            && request.language != "en";

        let progress_hook: crate::stt::ProgressHook = {
            let registry = self.registry.clone();
            let id = job_id.to_string();
            Arc::new(move |pct: u8| {
                let value = progress::stage_progress(JobStatus::Transcribing, pct as f64 / 100.0);
                let registry = registry.clone();
                let id = id.clone();
                tokio::spawn(async move {
                    let _ = registry.set_progress(&id, value).await;
                });
            })
        };

        engine
            .transcribe(RecognitionRequest {
                wav_path,
                model_path,
                language,
                translate_to_english,
                progress: Some(progress_hook),
            })
            .await
    }

    async fn maybe_translate(
        &self,
        job_id: &str,
        request: &JobRequest,
        segments: Vec<Segment>,
        via_embedded: bool,
    ) -> Result<Vec<Segment>> {
        let Some(target) = &request.translate_to else {
            return Ok(segments);
        };
        // On the transcription path the engine itself already produced
        // English; a second pass would only spend rate limit.
        if !via_embedded && target == "en" && request.language != "en" {
            return Ok(segments);
        }
        if !is_supported_target(self.translator.as_ref(), target) {
            warn!("translation target '{target}' not supported, keeping original text");
            return Ok(segments);
        }

        self.registry
            .transition(job_id, JobStatus::Translating)
            .await?;
        let outcome = translate_segments(
            self.translator.as_ref(),
            segments,
            target,
            self.config.translation.call_delay(),
        )
        .await;
        if outcome.failed_segments > 0 {
            warn!(
                "job {job_id}: {} segment(s) kept original text after translation failures",
                outcome.failed_segments
            );
        }
        self.registry.set_progress(job_id, TRANSLATED).await?;
        Ok(outcome.segments)
    }
}
