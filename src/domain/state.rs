//! Local and upstream state vocabularies.
//!
//! `TransactionState` is what a mirrored record carries. `ProcessingItemState`
//! is the coarser vocabulary the host pipeline understands; the mapping between
//! the two is an exhaustive `match` so a new local state cannot compile without
//! an upstream counterpart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    LocalUnprocessed,
    LocalException,
    StateNotAllowed,
    ApiRequestException,
    NoErrorCodeProperty,
    UnexpectedErrorCode,
    #[serde(rename = "no_transaction_auth_code_property")]
    NoAuthCodeProperty,
    #[serde(rename = "unexpected_transaction_auth_code")]
    UnexpectedAuthCode,
    NoRemoteReference,
    Paid,
    Processing,
    Failed,
    ApiError,
    ApiTimeout,
    InvalidAmount,
    DuplicateTransaction,
}

impl TransactionState {
    pub const ALL: [TransactionState; 16] = [
        TransactionState::LocalUnprocessed,
        TransactionState::LocalException,
        TransactionState::StateNotAllowed,
        TransactionState::ApiRequestException,
        TransactionState::NoErrorCodeProperty,
        TransactionState::UnexpectedErrorCode,
        TransactionState::NoAuthCodeProperty,
        TransactionState::UnexpectedAuthCode,
        TransactionState::NoRemoteReference,
        TransactionState::Paid,
        TransactionState::Processing,
        TransactionState::Failed,
        TransactionState::ApiError,
        TransactionState::ApiTimeout,
        TransactionState::InvalidAmount,
        TransactionState::DuplicateTransaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionState::LocalUnprocessed => "local_unprocessed",
            TransactionState::LocalException => "local_exception",
            TransactionState::StateNotAllowed => "state_not_allowed",
            TransactionState::ApiRequestException => "api_request_exception",
            TransactionState::NoErrorCodeProperty => "no_error_code_property",
            TransactionState::UnexpectedErrorCode => "unexpected_error_code",
            TransactionState::NoAuthCodeProperty => "no_transaction_auth_code_property",
            TransactionState::UnexpectedAuthCode => "unexpected_transaction_auth_code",
            TransactionState::NoRemoteReference => "no_remote_reference",
            TransactionState::Paid => "paid",
            TransactionState::Processing => "processing",
            TransactionState::Failed => "failed",
            TransactionState::ApiError => "api_error",
            TransactionState::ApiTimeout => "api_timeout",
            TransactionState::InvalidAmount => "invalid_amount",
            TransactionState::DuplicateTransaction => "duplicate_transaction",
        }
    }

    /// The state the host pipeline should see for a record in this state.
    pub fn processing_item_state(&self) -> ProcessingItemState {
        match self {
            TransactionState::LocalUnprocessed => ProcessingItemState::Pending,
            TransactionState::LocalException => ProcessingItemState::ManualReconciliationRequired,
            TransactionState::StateNotAllowed => ProcessingItemState::Exception,
            TransactionState::ApiRequestException => ProcessingItemState::Exception,
            TransactionState::NoErrorCodeProperty => ProcessingItemState::Exception,
            TransactionState::UnexpectedErrorCode => ProcessingItemState::Exception,
            TransactionState::NoAuthCodeProperty => ProcessingItemState::Exception,
            TransactionState::UnexpectedAuthCode => ProcessingItemState::Exception,
            TransactionState::NoRemoteReference => ProcessingItemState::Exception,
            TransactionState::Processing => ProcessingItemState::ProviderPending,
            TransactionState::Paid => ProcessingItemState::Processed,
            TransactionState::Failed => ProcessingItemState::ManualReconciliationRequired,
            TransactionState::ApiError => ProcessingItemState::ProviderNotAcceptingTransactions,
            TransactionState::ApiTimeout => ProcessingItemState::ProviderTimeout,
            TransactionState::InvalidAmount => ProcessingItemState::TransactionAmountInvalid,
            TransactionState::DuplicateTransaction => ProcessingItemState::DuplicateTargetTransaction,
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction state `{0}`")]
pub struct UnknownState(pub String);

impl FromStr for TransactionState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// State vocabulary of the host's processing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingItemState {
    Pending,
    Exception,
    ManualReconciliationRequired,
    ProviderPending,
    Processed,
    ProviderNotAcceptingTransactions,
    ProviderTimeout,
    TransactionAmountInvalid,
    DuplicateTargetTransaction,
    NoTransaction,
    TransactionTypeNotAllowed,
    TransactionStateNotAllowed,
    NoTransactionSender,
    NoTransactionRecipient,
    NoTransactionRecipientMobileProvider,
    NoTransactionRecipientPhoneNumber,
    NoTargetMobileProvider,
}

impl ProcessingItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingItemState::Pending => "PENDING",
            ProcessingItemState::Exception => "EXCEPTION",
            ProcessingItemState::ManualReconciliationRequired => "MANUAL_RECONCILIATION_REQUIRED",
            ProcessingItemState::ProviderPending => "PROVIDER_PENDING",
            ProcessingItemState::Processed => "PROCESSED",
            ProcessingItemState::ProviderNotAcceptingTransactions => {
                "PROVIDER_NOT_ACCEPTING_TRANSACTIONS"
            }
            ProcessingItemState::ProviderTimeout => "PROVIDER_TIMEOUT",
            ProcessingItemState::TransactionAmountInvalid => "TRANSACTION_AMOUNT_INVALID",
            ProcessingItemState::DuplicateTargetTransaction => "DUPLICATE_TARGET_TRANSACTION",
            ProcessingItemState::NoTransaction => "NO_TRANSACTION",
            ProcessingItemState::TransactionTypeNotAllowed => "TRANSACTION_TYPE_NOT_ALLOWED",
            ProcessingItemState::TransactionStateNotAllowed => "TRANSACTION_STATE_NOT_ALLOWED",
            ProcessingItemState::NoTransactionSender => "NO_TRANSACTION_SENDER",
            ProcessingItemState::NoTransactionRecipient => "NO_TRANSACTION_RECIPIENT",
            ProcessingItemState::NoTransactionRecipientMobileProvider => {
                "NO_TRANSACTION_RECIPIENT_MOBILE_PROVIDER"
            }
            ProcessingItemState::NoTransactionRecipientPhoneNumber => {
                "NO_TRANSACTION_RECIPIENT_PHONE_NUMBER"
            }
            ProcessingItemState::NoTargetMobileProvider => "NO_TARGET_MOBILE_PROVIDER",
        }
    }
}

impl fmt::Display for ProcessingItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
