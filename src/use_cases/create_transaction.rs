//! Create-Mirror operation.
//! Validates an upstream transaction and persists its local mirror in `local_unprocessed`.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::config::SenderOfRecord;
use crate::domain::upstream::{
    HostError, HostModels, ProcessingItem, UpstreamTransactionState, UpstreamTransactionType,
};
use crate::domain::{NewTransaction, ProcessingItemState, TransactionRecord};
use crate::ports::{ProviderDirectory, RepositoryError, TransactionRepository};

/// Why a mirror was not created. `Rejected` carries the state to write back
/// onto the processing item; infrastructure failures map to `EXCEPTION`.
#[derive(Debug, Error)]
pub enum CreateTransactionError {
    #[error("{reason}")]
    Rejected {
        state: ProcessingItemState,
        reason: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl CreateTransactionError {
    fn rejected(state: ProcessingItemState, reason: impl Into<String>) -> Self {
        CreateTransactionError::Rejected {
            state,
            reason: reason.into(),
        }
    }

    pub fn state(&self) -> ProcessingItemState {
        match self {
            CreateTransactionError::Rejected { state, .. } => *state,
            _ => ProcessingItemState::Exception,
        }
    }

    pub fn reason(&self) -> String {
        self.to_string()
    }
}

pub struct CreateMobileMoneyTransaction {
    transaction_repository: Arc<dyn TransactionRepository>,
    provider_directory: Arc<dyn ProviderDirectory>,
    host: Arc<dyn HostModels>,
    sender: SenderOfRecord,
}

impl CreateMobileMoneyTransaction {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepository>,
        provider_directory: Arc<dyn ProviderDirectory>,
        host: Arc<dyn HostModels>,
        sender: SenderOfRecord,
    ) -> Self {
        Self {
            transaction_repository,
            provider_directory,
            host,
            sender,
        }
    }

    /// Runs the eligibility checks in order and inserts the mirror.
    /// No record is written unless every check passes.
    pub async fn execute(
        &self,
        item: &dyn ProcessingItem,
    ) -> Result<TransactionRecord, CreateTransactionError> {
        use CreateTransactionError as E;
        use ProcessingItemState as S;

        let transaction = item.transaction().await?.ok_or_else(|| {
            E::rejected(
                S::NoTransaction,
                format!("{} `{}` transaction not found", item.model_name(), item.id()),
            )
        })?;

        if transaction.kind() != UpstreamTransactionType::Mobile {
            return Err(E::rejected(
                S::TransactionTypeNotAllowed,
                format!(
                    "{} `{}` type `{}` not allowed",
                    transaction.model_name(),
                    transaction.id(),
                    transaction.kind().as_str()
                ),
            ));
        }

        if transaction.state() != UpstreamTransactionState::Processing {
            return Err(E::rejected(
                S::TransactionStateNotAllowed,
                format!(
                    "{} `{}` state `{}` not allowed",
                    transaction.model_name(),
                    transaction.id(),
                    transaction.state().as_str()
                ),
            ));
        }

        if let Some(existing) = self
            .transaction_repository
            .find_by_upstream_transaction_id(transaction.id())
            .await?
        {
            return Err(E::rejected(
                S::DuplicateTargetTransaction,
                format!("{} `{}` cannot be created twice", existing.model_name(), existing.id),
            ));
        }

        if transaction.sender().await?.is_none() {
            return Err(E::rejected(
                S::NoTransactionSender,
                format!("{} `{}` sender not found", transaction.model_name(), transaction.id()),
            ));
        }

        let recipient = transaction.recipient().await?.ok_or_else(|| {
            E::rejected(
                S::NoTransactionRecipient,
                format!("{} `{}` recipient not found", transaction.model_name(), transaction.id()),
            )
        })?;

        let mobile_provider = non_blank(recipient.mobile_provider()).ok_or_else(|| {
            E::rejected(
                S::NoTransactionRecipientMobileProvider,
                format!("{} `{}` has no `mobile_provider`", recipient.model_name(), recipient.id()),
            )
        })?;

        let phone_number = non_blank(recipient.phone_number()).ok_or_else(|| {
            E::rejected(
                S::NoTransactionRecipientPhoneNumber,
                format!("{} `{}` has no `phone_number`", recipient.model_name(), recipient.id()),
            )
        })?;

        let country_code = recipient.country_code();
        let provider = self
            .host
            .find_mobile_money_provider(&mobile_provider, &country_code)
            .await?
            .ok_or_else(|| {
                E::rejected(
                    S::NoTransactionRecipientMobileProvider,
                    format!(
                        "{} `{}` has no MobileMoneyProvider for `{}` in `{}`",
                        recipient.model_name(),
                        recipient.id(),
                        mobile_provider,
                        country_code
                    ),
                )
            })?;

        let entry = self
            .provider_directory
            .find_by_source_provider_id(provider.id())
            .await?
            .ok_or_else(|| {
                E::rejected(
                    S::NoTargetMobileProvider,
                    format!(
                        "{} `{}` has no TinggMobileMoneyProvider",
                        provider.model_name(),
                        provider.id()
                    ),
                )
            })?;

        let amount = transaction.output_amount();
        if !amount.is_positive() {
            return Err(E::rejected(
                S::TransactionAmountInvalid,
                format!(
                    "{} `{}` output amount `{}` not allowed",
                    transaction.model_name(),
                    transaction.id(),
                    amount
                ),
            ));
        }

        let new_transaction = NewTransaction {
            id: Uuid::new_v4(),
            upstream_transaction_id: transaction.id(),
            processing_item_id: item.id(),
            reference: transaction.reference_for_humans(),
            country_code,
            currency_code: amount.currency,
            amount: amount.amount,
            service_code: entry.provider_code,
            product_code: None,
            sender_name: self.sender.name.clone(),
            sender_phone_number: self.sender.phone_number.clone(),
            recipient_phone_number: phone_number,
        };

        let record = match self.transaction_repository.insert(new_transaction).await {
            Ok(record) => record,
            Err(RepositoryError::Conflict(detail)) => {
                return Err(E::rejected(
                    S::DuplicateTargetTransaction,
                    format!(
                        "{} `{}` cannot be created twice: {}",
                        transaction.model_name(),
                        transaction.id(),
                        detail
                    ),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            transaction_id = %record.id,
            upstream_transaction_id = %record.upstream_transaction_id,
            service_code = %record.service_code,
            "Mobile money transaction created"
        );

        Ok(record)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
