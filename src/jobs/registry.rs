//! In-memory job registry.
//!
//! Single source of truth for job state. All mutation goes through the
//! helpers here so the state machine and the monotonic-progress rule are
//! enforced in one place; callers only ever get clone-out snapshots. The
//! critical section holds no file I/O and no stage work.

use crate::error::{Result, SubgenError};
use crate::jobs::progress::stage_floor;
use crate::jobs::{Job, JobStatus, TranscriptionResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<String, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job. The id must be unused.
    pub async fn create(&self, job: Job) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(&job.id) {
            return Err(SubgenError::DuplicateJobId { id: job.id });
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    /// Snapshot of one job.
    pub async fn get(&self, id: &str) -> Option<Job> {
        self.jobs.lock().await.get(id).cloned()
    }

    /// Snapshots of all jobs, most recently created first.
    pub async fn list(&self) -> Vec<Job> {
        let jobs = self.jobs.lock().await;
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    pub async fn remove(&self, id: &str) -> Option<Job> {
        self.jobs.lock().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }

    /// Advance a job to `status`, applying the stage's progress floor.
    ///
    /// Rejects transitions the state machine forbids, including any mutation
    /// of a terminal job.
    pub async fn transition(&self, id: &str, status: JobStatus) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(id).ok_or_else(|| SubgenError::JobNotFound {
            id: id.to_string(),
        })?;
        if !job.status.can_transition(status) {
            return Err(SubgenError::Other(format!(
                "illegal transition {} -> {} for job {}",
                job.status, status, job.id
            )));
        }
        job.status = status;
        if status != JobStatus::Failed {
            job.progress = job.progress.max(stage_floor(status));
        }
        if status.is_terminal() && job.completed_at.is_none() {
            job.completed_at = Some(SystemTime::now());
        }
        Ok(())
    }

    /// Record an in-stage progress hint.
    ///
    /// Writes are clamped monotonic and capped below 100 so that full
    /// progress remains equivalent to Completed. Hints against terminal
    /// jobs are ignored (a tool may emit a final line after the job ended).
    pub async fn set_progress(&self, id: &str, pct: u8) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(id).ok_or_else(|| SubgenError::JobNotFound {
            id: id.to_string(),
        })?;
        if job.status.is_terminal() {
            return Ok(());
        }
        job.progress = job.progress.max(pct.min(99));
        Ok(())
    }

    /// Finish a job successfully with its result payload.
    pub async fn complete(
        &self,
        id: &str,
        result: TranscriptionResult,
        output_path: PathBuf,
    ) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(id).ok_or_else(|| SubgenError::JobNotFound {
            id: id.to_string(),
        })?;
        if !job.status.can_transition(JobStatus::Completed) {
            return Err(SubgenError::Other(format!(
                "illegal transition {} -> Completed for job {}",
                job.status, job.id
            )));
        }
        job.status = JobStatus::Completed;
        job.progress = 100;
        job.result = Some(result);
        job.output_path = Some(output_path);
        job.completed_at = Some(SystemTime::now());
        Ok(())
    }

    /// Finish a job as Failed, freezing progress at its last value.
    pub async fn fail(&self, id: &str, message: impl Into<String>) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(id).ok_or_else(|| SubgenError::JobNotFound {
            id: id.to_string(),
        })?;
        if !job.status.can_transition(JobStatus::Failed) {
            return Err(SubgenError::Other(format!(
                "illegal transition {} -> Failed for job {}",
                job.status, job.id
            )));
        }
        job.status = JobStatus::Failed;
        job.error = Some(message.into());
        job.completed_at = Some(SystemTime::now());
        Ok(())
    }
}
