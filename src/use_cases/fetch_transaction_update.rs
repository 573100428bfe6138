//! Poll-Update operation: asks the gateway where a submitted record stands.

use std::sync::Arc;

use crate::domain::{TransactionChange, TransactionRecord, TransactionState};
use crate::ports::{GatewayClient, TransactionRepository};

use super::{decode_response, TransactionJobError};

pub struct FetchTransactionUpdate {
    transaction_repository: Arc<dyn TransactionRepository>,
    gateway: Arc<dyn GatewayClient>,
}

impl FetchTransactionUpdate {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn GatewayClient>,
    ) -> Self {
        Self {
            transaction_repository,
            gateway,
        }
    }

    /// Polls the gateway for `record`. Only the state is updated; the error
    /// code and remote reference were recorded at submission.
    pub async fn execute(
        &self,
        record: &TransactionRecord,
    ) -> Result<TransactionRecord, TransactionJobError> {
        if record.state != TransactionState::Processing {
            return Err(TransactionJobError::state_not_allowed(record));
        }

        if record.remote_reference().is_none() {
            return Err(TransactionJobError::precondition(
                TransactionState::NoRemoteReference,
                format!(
                    "{} `{}` remote_reference `{}` is empty",
                    record.model_name(),
                    record.id,
                    record.remote_reference.as_deref().unwrap_or_default()
                ),
            ));
        }

        let response = match self.gateway.query_status(record).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(transaction_id = %record.id, error = %e, "Payment status query failed");
                return Err(TransactionJobError::api_request(&e));
            }
        };

        let outcome = decode_response(&response)?;

        let updated = self
            .transaction_repository
            .transition(
                record.id,
                TransactionState::Processing,
                TransactionChange::Polled {
                    state: outcome.state,
                },
            )
            .await?;

        if updated.state != TransactionState::Processing {
            tracing::info!(
                transaction_id = %updated.id,
                state = %updated.state,
                "Transaction left processing"
            );
        } else {
            tracing::debug!(transaction_id = %updated.id, "Transaction still processing");
        }

        Ok(updated)
    }
}
