//! Submit operation: sends a fresh record to the gateway once.

use std::sync::Arc;

use crate::domain::{TransactionChange, TransactionRecord, TransactionState};
use crate::ports::{GatewayClient, TransactionRepository};

use super::{decode_response, TransactionJobError};

pub struct SendTransaction {
    transaction_repository: Arc<dyn TransactionRepository>,
    gateway: Arc<dyn GatewayClient>,
}

impl SendTransaction {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn GatewayClient>,
    ) -> Self {
        Self {
            transaction_repository,
            gateway,
        }
    }

    /// Submits `record` and persists the decoded outcome.
    ///
    /// Classified failures are returned without being persisted; the job
    /// runner decides what to write.
    pub async fn execute(
        &self,
        record: &TransactionRecord,
    ) -> Result<TransactionRecord, TransactionJobError> {
        if record.state != TransactionState::LocalUnprocessed {
            return Err(TransactionJobError::state_not_allowed(record));
        }

        let response = match self.gateway.submit_payment(record).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(transaction_id = %record.id, error = %e, "Payment submission failed");
                return Err(TransactionJobError::api_request(&e));
            }
        };

        let outcome = decode_response(&response)?;

        // a pending answer without a beep reference can never be polled
        let has_reference = outcome
            .remote_reference
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty());
        if outcome.state == TransactionState::Processing && !has_reference {
            tracing::warn!(
                transaction_id = %record.id,
                error_code = %outcome.error_code,
                "Pending gateway answer carries no remote reference"
            );
            return Err(TransactionJobError::rejected(
                TransactionState::NoRemoteReference,
                format!(
                    "{} `{}` accepted with status `{}` but no beepTransactionID in json `{}`",
                    record.model_name(),
                    record.id,
                    outcome.error_code,
                    response.raw_body
                ),
            ));
        }

        let updated = self
            .transaction_repository
            .transition(
                record.id,
                TransactionState::LocalUnprocessed,
                TransactionChange::Submitted {
                    state: outcome.state,
                    error_code: outcome.error_code,
                    error_description: outcome.description,
                    remote_reference: outcome.remote_reference,
                },
            )
            .await?;

        tracing::info!(
            transaction_id = %updated.id,
            state = %updated.state,
            error_code = %outcome.error_code,
            "Transaction submitted"
        );

        Ok(updated)
    }
}
