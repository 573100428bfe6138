//! In-memory implementations of every port, used by tests and embedding hosts
//! that bring their own persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    Job, NewTransaction, ProviderDirectoryEntry, QueuedJob, TransactionChange, TransactionRecord,
    TransactionState, DEFAULT_JOB_LEASE, LEASE_EXPIRED_ERROR,
};
use crate::ports::{
    JobQueue, ProviderDirectory, RepositoryError, RepositoryResult, TransactionRepository,
};

struct StoredRecord {
    record: TransactionRecord,
    deleted: bool,
}

#[derive(Default)]
pub struct InMemoryTransactionRepository {
    data: Arc<RwLock<HashMap<Uuid, StoredRecord>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` as-is, bypassing the initial-state rule of `insert`.
    pub async fn seed(&self, record: TransactionRecord) {
        self.data.write().await.insert(
            record.id,
            StoredRecord {
                record,
                deleted: false,
            },
        );
    }

    /// Every live record, oldest first.
    pub async fn all(&self) -> Vec<TransactionRecord> {
        let data = self.data.read().await;
        let mut records: Vec<_> = data
            .values()
            .filter(|s| !s.deleted)
            .map(|s| s.record.clone())
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn insert(&self, tx: NewTransaction) -> RepositoryResult<TransactionRecord> {
        let mut data = self.data.write().await;

        let taken = data.values().any(|s| {
            s.record.upstream_transaction_id == tx.upstream_transaction_id
                || s.record.reference == tx.reference
        });
        if taken || data.contains_key(&tx.id) {
            return Err(RepositoryError::Conflict(format!(
                "transaction `{}` or reference `{}` already mirrored",
                tx.upstream_transaction_id, tx.reference
            )));
        }

        let record = tx.into_record(Utc::now());
        data.insert(
            record.id,
            StoredRecord {
                record: record.clone(),
                deleted: false,
            },
        );
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<TransactionRecord> {
        let data = self.data.read().await;
        data.get(&id)
            .filter(|s| !s.deleted)
            .map(|s| s.record.clone())
            .ok_or_else(|| RepositoryError::NotFound(format!("TinggTransaction `{}`", id)))
    }

    async fn find_by_upstream_transaction_id(
        &self,
        upstream_transaction_id: Uuid,
    ) -> RepositoryResult<Option<TransactionRecord>> {
        let data = self.data.read().await;
        Ok(data
            .values()
            .find(|s| !s.deleted && s.record.upstream_transaction_id == upstream_transaction_id)
            .map(|s| s.record.clone()))
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: TransactionState,
        change: TransactionChange,
    ) -> RepositoryResult<TransactionRecord> {
        let mut data = self.data.write().await;
        let stored = data
            .get_mut(&id)
            .filter(|s| !s.deleted)
            .ok_or_else(|| RepositoryError::NotFound(format!("TinggTransaction `{}`", id)))?;

        if stored.record.state != expected {
            return Err(RepositoryError::StateConflict { id, expected });
        }

        change.apply(&mut stored.record, Utc::now());
        Ok(stored.record.clone())
    }

    async fn count_in_state(&self, state: TransactionState) -> RepositoryResult<i64> {
        let data = self.data.read().await;
        Ok(data
            .values()
            .filter(|s| !s.deleted && s.record.state == state)
            .count() as i64)
    }

    async fn list_ids_in_state(&self, state: TransactionState) -> RepositoryResult<Vec<Uuid>> {
        let data = self.data.read().await;
        let mut matching: Vec<_> = data
            .values()
            .filter(|s| !s.deleted && s.record.state == state)
            .map(|s| (s.record.updated_at, s.record.id))
            .collect();
        matching.sort();
        Ok(matching.into_iter().map(|(_, id)| id).collect())
    }

    async fn soft_delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut data = self.data.write().await;
        match data.get_mut(&id).filter(|s| !s.deleted) {
            Some(stored) => {
                stored.deleted = true;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("TinggTransaction `{}`", id))),
        }
    }
}

#[derive(Default)]
pub struct InMemoryProviderDirectory {
    entries: Arc<RwLock<Vec<ProviderDirectoryEntry>>>,
}

impl InMemoryProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProviderDirectory for InMemoryProviderDirectory {
    async fn find_by_source_provider_id(
        &self,
        source_provider_id: Uuid,
    ) -> RepositoryResult<Option<ProviderDirectoryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|e| e.source_provider_id == source_provider_id)
            .cloned())
    }

    async fn insert(&self, entry: ProviderDirectoryEntry) -> RepositoryResult<ProviderDirectoryEntry> {
        let mut entries = self.entries.write().await;
        if entries
            .iter()
            .any(|e| e.source_provider_id == entry.source_provider_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "provider `{}` already has a code",
                entry.source_provider_id
            )));
        }
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self) -> RepositoryResult<Vec<ProviderDirectoryEntry>> {
        Ok(self.entries.read().await.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct JobEntry {
    pub id: Uuid,
    pub job: Job,
    pub status: JobStatus,
    pub last_error: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl JobEntry {
    fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}

struct QueueData {
    jobs: Vec<JobEntry>,
    active_keys: HashSet<String>,
}

/// Finished jobs are kept for inspection until [`InMemoryJobQueue::purge_finished`].
pub struct InMemoryJobQueue {
    data: Arc<RwLock<QueueData>>,
    lease: Duration,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::with_lease(DEFAULT_JOB_LEASE)
    }

    pub fn with_lease(lease: Duration) -> Self {
        Self {
            data: Arc::new(RwLock::new(QueueData {
                jobs: Vec::new(),
                active_keys: HashSet::new(),
            })),
            lease,
        }
    }

    /// Snapshot of every retained job, in dispatch order.
    pub async fn entries(&self) -> Vec<JobEntry> {
        self.data.read().await.jobs.clone()
    }

    /// Drops completed and failed jobs. Returns how many were removed.
    pub async fn purge_finished(&self) -> usize {
        let mut data = self.data.write().await;
        let before = data.jobs.len();
        data.jobs.retain(|e| !e.is_finished());
        before - data.jobs.len()
    }

    async fn finish(&self, id: Uuid, status: JobStatus, error: Option<&str>) -> RepositoryResult<()> {
        let mut data = self.data.write().await;
        let entry = data
            .jobs
            .iter_mut()
            .find(|e| e.id == id && e.status == JobStatus::Running)
            .ok_or_else(|| RepositoryError::NotFound(format!("running job `{}`", id)))?;
        entry.status = status;
        entry.last_error = error.map(str::to_string);
        let key = entry.job.dedup_key();
        data.active_keys.remove(&key);
        Ok(())
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn dispatch(&self, job: Job) -> RepositoryResult<bool> {
        let mut data = self.data.write().await;
        if !data.active_keys.insert(job.dedup_key()) {
            return Ok(false);
        }
        data.jobs.push(JobEntry {
            id: Uuid::new_v4(),
            job,
            status: JobStatus::Queued,
            last_error: None,
            claimed_at: None,
        });
        Ok(true)
    }

    async fn claim_next(&self) -> RepositoryResult<Option<QueuedJob>> {
        let mut data = self.data.write().await;
        Ok(data
            .jobs
            .iter_mut()
            .find(|e| e.status == JobStatus::Queued)
            .map(|entry| {
                entry.status = JobStatus::Running;
                entry.claimed_at = Some(Utc::now());
                QueuedJob {
                    id: entry.id,
                    job: entry.job.clone(),
                }
            }))
    }

    async fn complete(&self, id: Uuid) -> RepositoryResult<()> {
        self.finish(id, JobStatus::Completed, None).await
    }

    async fn fail(&self, id: Uuid, error: &str) -> RepositoryResult<()> {
        self.finish(id, JobStatus::Failed, Some(error)).await
    }

    async fn release_expired(&self) -> RepositoryResult<u64> {
        let Ok(lease) = chrono::Duration::from_std(self.lease) else {
            return Ok(0);
        };
        let cutoff = Utc::now() - lease;

        let mut data = self.data.write().await;
        let mut released = Vec::new();
        for entry in data.jobs.iter_mut() {
            let expired = entry.claimed_at.is_some_and(|at| at <= cutoff);
            if entry.status == JobStatus::Running && expired {
                entry.status = JobStatus::Failed;
                entry.last_error = Some(LEASE_EXPIRED_ERROR.to_string());
                released.push(entry.job.dedup_key());
            }
        }
        for key in &released {
            data.active_keys.remove(key);
        }
        Ok(released.len() as u64)
    }
}
