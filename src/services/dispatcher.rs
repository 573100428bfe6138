//! Schedules one poll per record still waiting on the gateway.
//!
//! Polling runs on a fixed interval. Dedup keys keep a slow poll from being
//! queued twice, and the gateway client's circuit breaker absorbs outages, so
//! there is no per-record backoff. Each pass first releases claims whose lease
//! ran out, so a crashed worker cannot hold a record's key forever.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::domain::{Job, TransactionState};
use crate::ports::{JobQueue, RepositoryResult, TransactionRepository};

pub const NOTHING_PENDING_MESSAGE: &str = "You do not have any unfinished Tingg/Transaction";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub pending: i64,
    pub dispatched: usize,
    pub skipped: usize,
    pub released: u64,
}

impl DispatchReport {
    pub fn message(&self) -> String {
        if self.pending == 0 {
            return NOTHING_PENDING_MESSAGE.to_string();
        }
        format!(
            "Dispatched {} Tingg/Transaction update job(s), {} already queued",
            self.dispatched, self.skipped
        )
    }
}

pub async fn dispatch_fetch_updates(
    transactions: &dyn TransactionRepository,
    queue: &dyn JobQueue,
) -> RepositoryResult<DispatchReport> {
    let released = queue.release_expired().await?;
    if released > 0 {
        warn!(released, "Released jobs whose lease expired");
    }

    let pending = transactions.count_in_state(TransactionState::Processing).await?;
    let mut report = DispatchReport {
        pending,
        dispatched: 0,
        skipped: 0,
        released,
    };
    if pending == 0 {
        return Ok(report);
    }

    for transaction_id in transactions
        .list_ids_in_state(TransactionState::Processing)
        .await?
    {
        if queue
            .dispatch(Job::FetchTransactionUpdate { transaction_id })
            .await?
        {
            report.dispatched += 1;
        } else {
            report.skipped += 1;
        }
    }

    Ok(report)
}

/// Calls [`dispatch_fetch_updates`] every `period` until `shutdown` flips.
pub async fn run_fetch_update_scheduler(
    transactions: Arc<dyn TransactionRepository>,
    queue: Arc<dyn JobQueue>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(interval_secs = period.as_secs(), "Fetch update scheduler started");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match dispatch_fetch_updates(transactions.as_ref(), queue.as_ref()).await {
                    Ok(report) => info!(
                        pending = report.pending,
                        dispatched = report.dispatched,
                        skipped = report.skipped,
                        released = report.released,
                        "{}",
                        report.message()
                    ),
                    Err(e) => error!("Fetch update dispatch failed: {}", e),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Fetch update scheduler stopped");
}
