use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::jobs::JobRunner;
use crate::ports::{JobQueue, RepositoryError};

/// Claims jobs one at a time and runs each exactly once.
pub struct Worker {
    queue: Arc<dyn JobQueue>,
    runner: Arc<JobRunner>,
    idle_interval: Duration,
}

impl Worker {
    pub fn new(queue: Arc<dyn JobQueue>, runner: Arc<JobRunner>, idle_interval: Duration) -> Self {
        Self {
            queue,
            runner,
            idle_interval,
        }
    }

    /// Processes at most one job. Returns `false` when the queue was empty.
    pub async fn run_once(&self) -> Result<bool, RepositoryError> {
        let Some(queued) = self.queue.claim_next().await? else {
            return Ok(false);
        };

        debug!(job_id = %queued.id, kind = queued.job.kind(), "Running job");

        match self.runner.run(&queued.job).await {
            Ok(()) => self.queue.complete(queued.id).await?,
            Err(e) => {
                error!(job_id = %queued.id, kind = queued.job.kind(), error = %e, "Job failed");
                self.queue.fail(queued.id, &e.to_string()).await?;
            }
        }

        Ok(true)
    }

    /// Runs until `shutdown` flips to `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Job worker started");

        while !*shutdown.borrow() {
            let idle = match self.run_once().await {
                Ok(true) => false,
                Ok(false) => true,
                Err(e) => {
                    error!("Job queue error: {}", e);
                    true
                }
            };

            if idle {
                tokio::select! {
                    _ = sleep(self.idle_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        info!("Job worker stopped");
    }
}
