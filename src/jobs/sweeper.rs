//! Retention sweeper.
//!
//! Eviction is purely age-based: every job older than the retention window
//! is removed along with its source and output files, regardless of state.
//! File deletion is best-effort; a job entry is always removed even when its
//! files cannot be.

use crate::jobs::registry::JobRegistry;
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;

/// Remove every job created before `now - retention`. Returns how many
/// were removed.
///
/// A zero retention window removes all jobs; a window too large to subtract
/// from the clock removes none.
pub async fn sweep(registry: &JobRegistry, retention: Duration) -> usize {
    let cutoff = match SystemTime::now().checked_sub(retention) {
        Some(cutoff) => cutoff,
        None => return 0,
    };

    let mut removed = 0;
    for job in registry.list().await {
        if job.created_at >= cutoff {
            continue;
        }
        remove_file_best_effort(&job.source_path).await;
        if let Some(output) = &job.output_path {
            remove_file_best_effort(output).await;
        }
        if registry.remove(&job.id).await.is_some() {
            debug!("swept job {} ({})", job.id, job.status);
            removed += 1;
        }
    }
    removed
}

async fn remove_file_best_effort(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not delete {}: {}", path.display(), e),
    }
}

/// Spawn the periodic sweep task. Runs until the handle is dropped or
/// aborted.
pub fn spawn_sweeper(
    registry: Arc<JobRegistry>,
    retention: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = sweep(&registry, retention).await;
            if removed > 0 {
                info!("retention sweep removed {} job(s)", removed);
            }
        }
    })
}
