//! Maps gateway codes onto local states and local states onto upstream states.
//!
//! Every function here is pure. Codes outside the curated tables are errors
//! that carry the state a record should be parked in, never a default state.

use thiserror::Error;

use super::codes::{AuthCode, PaymentStatusCode};
use super::state::{ProcessingItemState, TransactionState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("Unexpected auth code: `{0}`")]
    UnexpectedAuthCode(String),
    #[error("Unexpected payment status code: `{0}`")]
    UnexpectedErrorCode(String),
}

impl TranslationError {
    pub fn state(&self) -> TransactionState {
        match self {
            TranslationError::UnexpectedAuthCode(_) => TransactionState::UnexpectedAuthCode,
            TranslationError::UnexpectedErrorCode(_) => TransactionState::UnexpectedErrorCode,
        }
    }
}

pub fn state_from_auth(code: AuthCode) -> TransactionState {
    match code {
        AuthCode::AuthSuccess => TransactionState::Processing,
        AuthCode::AuthFailed => TransactionState::ApiError,
        AuthCode::GenericFailure => TransactionState::ApiError,
    }
}

pub fn state_from_payment_status(code: PaymentStatusCode) -> TransactionState {
    use PaymentStatusCode as P;

    match code {
        P::GenericException => TransactionState::ApiError,
        P::InactiveService => TransactionState::ApiError,
        P::CustomerMsisdnMissing => TransactionState::ApiError,
        P::InvalidCustomerMsisdn => TransactionState::ApiError,
        P::InvalidInvoiceAmount => TransactionState::InvalidAmount,
        P::InvalidCurrencyCode => TransactionState::ApiError,
        P::AccountNumberNotSpecified => TransactionState::ApiError,
        P::PostedAndPendingAcknowledgement => TransactionState::Processing,
        P::InvoiceDoesNotExist => TransactionState::ApiError,
        P::InvalidServiceId => TransactionState::ApiError,
        P::GenericFailure => TransactionState::ApiError,
        P::PaymentRejected => TransactionState::Failed,
        P::PaymentAccepted => TransactionState::Paid,
        P::PaymentManuallyRejected => TransactionState::Failed,
        P::PaymentManuallyAccepted => TransactionState::Paid,
        P::PaymentEscalated => TransactionState::Processing,
        P::AmountGreaterThanMaximumAllowed => TransactionState::InvalidAmount,
        P::AmountLessThanMinimumAllowed => TransactionState::InvalidAmount,
        P::DuplicatePaymentFound => TransactionState::DuplicateTransaction,
    }
}

/// Decodes a raw gateway authorization code into a local state.
pub fn state_from_auth_code(code: &str) -> Result<TransactionState, TranslationError> {
    AuthCode::from_code(code)
        .map(state_from_auth)
        .ok_or_else(|| TranslationError::UnexpectedAuthCode(code.to_string()))
}

/// Decodes a raw gateway payment status code, returning both the typed code
/// and the local state it maps to.
pub fn state_from_payment_status_code(
    code: &str,
) -> Result<(PaymentStatusCode, TransactionState), TranslationError> {
    PaymentStatusCode::from_code(code)
        .map(|status| (status, state_from_payment_status(status)))
        .ok_or_else(|| TranslationError::UnexpectedErrorCode(code.to_string()))
}

pub fn local_state_to_upstream_state(state: TransactionState) -> ProcessingItemState {
    state.processing_item_state()
}
