//! Bounded worker pool.
//!
//! Submissions land on a bounded channel and a fixed set of workers drains
//! it, so a burst of jobs queues up instead of fanning out into unbounded
//! concurrent pipelines. Within one job the stages run strictly in order;
//! across jobs there is no fairness guarantee and no cancellation once a
//! job starts.

use crate::error::{Result, SubgenError};
use crate::jobs::JobRequest;
use crate::pipeline::Pipeline;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

struct WorkItem {
    job_id: String,
    request: JobRequest,
}

pub struct WorkerPool {
    tx: mpsc::Sender<WorkItem>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` pipeline workers sharing one bounded queue.
    pub fn spawn(pipeline: Arc<Pipeline>, workers: usize, queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<WorkItem>(queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let handles = (0..workers)
            .map(|worker| {
                let pipeline = pipeline.clone();
                let rx = rx.clone();
                tokio::spawn(async move {
                    loop {
                        // Hold the receiver lock only for the dequeue, so one
                        // running job never blocks the other workers.
                        let item = { rx.lock().await.recv().await };
                        let Some(item) = item else {
                            debug!("worker {worker} shutting down");
                            break;
                        };
                        info!("worker {worker} picked up job {}", item.job_id);
                        pipeline.execute(&item.job_id, &item.request).await;
                    }
                })
            })
            .collect();

        Self { tx, handles }
    }

    /// Enqueue a job for execution. Waits when the queue is at capacity,
    /// giving callers backpressure instead of an ever-growing backlog.
    pub async fn submit(&self, job_id: String, request: JobRequest) -> Result<()> {
        self.tx
            .send(WorkItem { job_id, request })
            .await
            .map_err(|e| SubgenError::Other(format!("worker pool is shut down: job {}", e.0.job_id)))
    }

    /// Stop accepting work and wait for in-flight jobs to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
