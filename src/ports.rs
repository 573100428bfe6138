//! Boundaries between the core operations and their collaborators.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    Job, NewTransaction, ProviderDirectoryEntry, QueuedJob, TransactionChange, TransactionRecord,
    TransactionState,
};
use crate::gateway::{GatewayError, GatewayResponse};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("record `{id}` is no longer in state `{expected}`")]
    StateConflict { id: Uuid, expected: TransactionState },

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            _ => RepositoryError::Database(e),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage of transaction records. Soft-deleted rows are invisible to every method.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Fails with `Conflict` when the upstream transaction id or reference is taken.
    async fn insert(&self, tx: NewTransaction) -> RepositoryResult<TransactionRecord>;

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<TransactionRecord>;

    async fn find_by_upstream_transaction_id(
        &self,
        upstream_transaction_id: Uuid,
    ) -> RepositoryResult<Option<TransactionRecord>>;

    /// Applies `change` only if the record is still in `expected`.
    async fn transition(
        &self,
        id: Uuid,
        expected: TransactionState,
        change: TransactionChange,
    ) -> RepositoryResult<TransactionRecord>;

    async fn count_in_state(&self, state: TransactionState) -> RepositoryResult<i64>;

    async fn list_ids_in_state(&self, state: TransactionState) -> RepositoryResult<Vec<Uuid>>;

    async fn soft_delete(&self, id: Uuid) -> RepositoryResult<()>;
}

/// Gateway provider codes keyed by the host's provider catalog id.
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn find_by_source_provider_id(
        &self,
        source_provider_id: Uuid,
    ) -> RepositoryResult<Option<ProviderDirectoryEntry>>;

    /// Fails with `Conflict` when the source provider already has an entry.
    async fn insert(&self, entry: ProviderDirectoryEntry) -> RepositoryResult<ProviderDirectoryEntry>;

    async fn list(&self) -> RepositoryResult<Vec<ProviderDirectoryEntry>>;
}

#[async_trait]
pub trait GatewayClient: Send + Sync {
    async fn submit_payment(&self, record: &TransactionRecord) -> Result<GatewayResponse, GatewayError>;

    async fn query_status(&self, record: &TransactionRecord) -> Result<GatewayResponse, GatewayError>;
}

/// Queue with dedup keys. Claimed jobs are never handed out again; a claim
/// that outlives the queue's lease is failed so its key can be dispatched anew.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Returns `false` if a job with the same dedup key is already queued or running.
    async fn dispatch(&self, job: Job) -> RepositoryResult<bool>;

    async fn claim_next(&self) -> RepositoryResult<Option<QueuedJob>>;

    async fn complete(&self, id: Uuid) -> RepositoryResult<()>;

    async fn fail(&self, id: Uuid, error: &str) -> RepositoryResult<()>;

    /// Fails every running job claimed longer ago than the lease. Returns how
    /// many were released.
    async fn release_expired(&self) -> RepositoryResult<u64>;
}
