//! The three operations that drive a mirrored transaction through its lifecycle.

pub mod create_transaction;
pub mod fetch_transaction_update;
pub mod send_transaction;

use thiserror::Error;

pub use create_transaction::{CreateMobileMoneyTransaction, CreateTransactionError};
pub use fetch_transaction_update::FetchTransactionUpdate;
pub use send_transaction::SendTransaction;

use crate::domain::translator::{state_from_auth_code, state_from_payment_status_code};
use crate::domain::{PaymentStatusCode, TransactionRecord, TransactionState};
use crate::gateway::{GatewayError, GatewayResponse};
use crate::ports::RepositoryError;

/// Failure of Submit or Poll-Update.
///
/// `Rejected` carries the state the record should be parked in and the reason
/// stored alongside it. `Precondition` means the record was not in a shape the
/// operation accepts and must be left as it is. Anything else was not
/// classified by the operation and ends up as `local_exception`.
#[derive(Debug, Error)]
pub enum TransactionJobError {
    #[error("{reason}")]
    Rejected {
        state: TransactionState,
        reason: String,
    },

    #[error("{reason}")]
    Precondition {
        state: TransactionState,
        reason: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl TransactionJobError {
    pub fn rejected(state: TransactionState, reason: impl Into<String>) -> Self {
        TransactionJobError::Rejected {
            state,
            reason: reason.into(),
        }
    }

    pub fn state(&self) -> TransactionState {
        match self {
            TransactionJobError::Rejected { state, .. }
            | TransactionJobError::Precondition { state, .. } => *state,
            TransactionJobError::Repository(_) => TransactionState::LocalException,
        }
    }

    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Precondition failures leave the record untouched.
    pub fn is_precondition(&self) -> bool {
        matches!(self, TransactionJobError::Precondition { .. })
    }

    pub(crate) fn precondition(state: TransactionState, reason: impl Into<String>) -> Self {
        TransactionJobError::Precondition {
            state,
            reason: reason.into(),
        }
    }

    pub(crate) fn state_not_allowed(record: &TransactionRecord) -> Self {
        Self::precondition(
            TransactionState::StateNotAllowed,
            format!(
                "{} `{}` state `{}` not allowed",
                record.model_name(),
                record.id,
                record.state
            ),
        )
    }

    pub(crate) fn api_request(e: &GatewayError) -> Self {
        Self::rejected(
            TransactionState::ApiRequestException,
            format!("Exception during TinggClient request with message: `{}`", e),
        )
    }
}

/// A gateway answer that passed every decoding step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PaymentOutcome {
    pub error_code: PaymentStatusCode,
    pub state: TransactionState,
    pub description: Option<String>,
    pub remote_reference: Option<String>,
}

/// Decodes the auth code and the first payment result of a gateway answer.
///
/// A recognized auth code only gates decoding; the persisted state always
/// comes from the payment status code.
pub(crate) fn decode_response(
    response: &GatewayResponse,
) -> Result<PaymentOutcome, TransactionJobError> {
    let auth_code = response.auth_status_code.as_deref().ok_or_else(|| {
        TransactionJobError::rejected(
            TransactionState::NoAuthCodeProperty,
            format!("No auth status code in json `{}`", response.raw_body),
        )
    })?;

    state_from_auth_code(auth_code).map_err(|e| {
        tracing::warn!(auth_code, "Unrecognized gateway auth code");
        TransactionJobError::rejected(e.state(), e.to_string())
    })?;

    let result = response.first_result().ok_or_else(|| no_status_code(response))?;
    let status_code = result
        .status_code
        .as_deref()
        .ok_or_else(|| no_status_code(response))?;

    let (error_code, state) = state_from_payment_status_code(status_code).map_err(|e| {
        tracing::warn!(status_code, "Unrecognized gateway payment status code");
        TransactionJobError::rejected(e.state(), e.to_string())
    })?;

    Ok(PaymentOutcome {
        error_code,
        state,
        description: result.status_description.clone(),
        remote_reference: result.remote_reference.clone(),
    })
}

fn no_status_code(response: &GatewayResponse) -> TransactionJobError {
    TransactionJobError::rejected(
        TransactionState::NoErrorCodeProperty,
        format!("No payment status code in json `{}`", response.raw_body),
    )
}
