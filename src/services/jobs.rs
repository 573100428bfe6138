//! Runs one job: the operation itself plus its failure hook and the
//! upstream state write-back.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::config::SenderOfRecord;
use crate::domain::upstream::{HostError, HostModels, ProcessingItem};
use crate::domain::{
    Job, ProcessingItemState, TransactionChange, TransactionRecord, TransactionState,
};
use crate::ports::{
    GatewayClient, JobQueue, ProviderDirectory, RepositoryError, TransactionRepository,
};
use crate::use_cases::{
    CreateMobileMoneyTransaction, CreateTransactionError, FetchTransactionUpdate, SendTransaction,
    TransactionJobError,
};

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Create(#[from] CreateTransactionError),

    #[error(transparent)]
    Transaction(#[from] TransactionJobError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Host(#[from] HostError),
}

pub struct JobRunner {
    transactions: Arc<dyn TransactionRepository>,
    queue: Arc<dyn JobQueue>,
    host: Arc<dyn HostModels>,
    create: CreateMobileMoneyTransaction,
    send: SendTransaction,
    fetch: FetchTransactionUpdate,
}

impl JobRunner {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        providers: Arc<dyn ProviderDirectory>,
        queue: Arc<dyn JobQueue>,
        gateway: Arc<dyn GatewayClient>,
        host: Arc<dyn HostModels>,
        sender: SenderOfRecord,
    ) -> Self {
        Self {
            create: CreateMobileMoneyTransaction::new(
                transactions.clone(),
                providers,
                host.clone(),
                sender,
            ),
            send: SendTransaction::new(transactions.clone(), gateway.clone()),
            fetch: FetchTransactionUpdate::new(transactions.clone(), gateway),
            transactions,
            queue,
            host,
        }
    }

    /// Runs `job` once. Failures are persisted before they are returned.
    pub async fn run(&self, job: &Job) -> Result<(), JobError> {
        match job {
            Job::CreateMobileMoneyTransaction { processing_item_id } => {
                self.create_transaction(*processing_item_id).await
            }
            Job::SendTransaction { transaction_id } => {
                let Some(record) = self.load(*transaction_id).await? else {
                    return Ok(());
                };
                let result = self.send.execute(&record).await;
                self.settle(record, result).await
            }
            Job::FetchTransactionUpdate { transaction_id } => {
                let Some(record) = self.load(*transaction_id).await? else {
                    return Ok(());
                };
                let result = self.fetch.execute(&record).await;
                self.settle(record, result).await
            }
        }
    }

    async fn create_transaction(&self, processing_item_id: Uuid) -> Result<(), JobError> {
        let Some(item) = self.host.find_processing_item(processing_item_id).await? else {
            tracing::warn!(%processing_item_id, "Processing item not found, skipping");
            return Ok(());
        };

        match self.create.execute(item.as_ref()).await {
            Ok(record) => {
                let dispatched = self
                    .queue
                    .dispatch(Job::SendTransaction {
                        transaction_id: record.id,
                    })
                    .await;
                if let Err(e) = dispatched {
                    self.park_unsent(&record, item.as_ref(), &e).await;
                    return Err(e.into());
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    %processing_item_id,
                    state = %e.state(),
                    error = %e,
                    "Mobile money transaction not created"
                );
                item.update_state_code(e.state(), &e.reason()).await?;
                Err(e.into())
            }
        }
    }

    /// A mirror whose send could not be queued would never leave
    /// `local_unprocessed`; park it and tell the processing item.
    async fn park_unsent(
        &self,
        record: &TransactionRecord,
        item: &dyn ProcessingItem,
        error: &RepositoryError,
    ) {
        let reason = format!(
            "{} `{}` could not be queued for sending: {}",
            record.model_name(),
            record.id,
            error
        );
        tracing::error!(transaction_id = %record.id, error = %error, "Send job not queued");

        if let Err(e) = self
            .transactions
            .transition(
                record.id,
                TransactionState::LocalUnprocessed,
                TransactionChange::Failed {
                    state: TransactionState::LocalException,
                    reason: reason.clone(),
                },
            )
            .await
        {
            tracing::error!(transaction_id = %record.id, error = %e, "Failed to park unsent transaction");
        }

        if let Err(e) = item
            .update_state_code(ProcessingItemState::Exception, &reason)
            .await
        {
            tracing::error!(
                transaction_id = %record.id,
                error = %e,
                "Failed to report unsent transaction to processing item"
            );
        }
    }

    async fn load(&self, id: Uuid) -> Result<Option<TransactionRecord>, JobError> {
        match self.transactions.get_by_id(id).await {
            Ok(record) => Ok(Some(record)),
            Err(RepositoryError::NotFound(_)) => {
                tracing::warn!(transaction_id = %id, "Transaction not found, skipping");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persists a classified failure against the state the record was loaded
    /// in, then reports the resulting state to the processing item.
    async fn settle(
        &self,
        record: TransactionRecord,
        result: Result<TransactionRecord, TransactionJobError>,
    ) -> Result<(), JobError> {
        let (current, failure) = match result {
            Ok(updated) => (updated, None),
            Err(e) if e.is_precondition() => {
                tracing::warn!(
                    transaction_id = %record.id,
                    state = %record.state,
                    error = %e,
                    "Transaction job precondition failed"
                );
                return Err(e.into());
            }
            Err(e) => {
                let change = TransactionChange::Failed {
                    state: e.state(),
                    reason: e.reason(),
                };
                let updated = self
                    .transactions
                    .transition(record.id, record.state, change)
                    .await
                    .map_err(|write_err| {
                        tracing::error!(
                            transaction_id = %record.id,
                            error = %e,
                            write_error = %write_err,
                            "Failed to record transaction failure"
                        );
                        write_err
                    })?;
                tracing::warn!(
                    transaction_id = %updated.id,
                    state = %updated.state,
                    reason = %e,
                    "Transaction parked"
                );
                (updated, Some(e))
            }
        };

        self.report_upstream(&current).await;

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    async fn report_upstream(&self, record: &TransactionRecord) {
        let state = record.state.processing_item_state();
        let reason = record.state_reason.clone().unwrap_or_else(|| {
            format!("{} `{}` state `{}`", record.model_name(), record.id, record.state)
        });

        match self.host.find_processing_item(record.processing_item_id).await {
            Ok(Some(item)) => {
                if let Err(e) = item.update_state_code(state, &reason).await {
                    tracing::error!(
                        transaction_id = %record.id,
                        error = %e,
                        "Failed to report state to processing item"
                    );
                }
            }
            Ok(None) => tracing::warn!(
                transaction_id = %record.id,
                processing_item_id = %record.processing_item_id,
                "Processing item not found for state report"
            ),
            Err(e) => tracing::error!(
                transaction_id = %record.id,
                error = %e,
                "Failed to load processing item"
            ),
        }
    }
}
