//! Transaction record domain entity.
//! Local mirror of one upstream transfer and the gateway artifacts it accumulates.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::codes::PaymentStatusCode;
use super::state::TransactionState;

/// Persisted mirror of an upstream transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub upstream_transaction_id: Uuid,
    pub processing_item_id: Uuid,
    pub state: TransactionState,
    pub state_reason: Option<String>,
    pub error_code: Option<PaymentStatusCode>,
    pub error_description: Option<String>,
    pub reference: String,
    pub remote_reference: Option<String>,
    pub country_code: String,
    pub currency_code: String,
    pub amount: BigDecimal,
    pub service_code: String,
    pub product_code: Option<String>,
    pub sender_name: String,
    pub sender_phone_number: String,
    pub recipient_phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn model_name(&self) -> &'static str {
        "TinggTransaction"
    }

    /// Remote reference, treating an empty string the same as a missing one.
    pub fn remote_reference(&self) -> Option<&str> {
        self.remote_reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Values needed to create a record. The record starts in `local_unprocessed`.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub id: Uuid,
    pub upstream_transaction_id: Uuid,
    pub processing_item_id: Uuid,
    pub reference: String,
    pub country_code: String,
    pub currency_code: String,
    pub amount: BigDecimal,
    pub service_code: String,
    pub product_code: Option<String>,
    pub sender_name: String,
    pub sender_phone_number: String,
    pub recipient_phone_number: String,
}

impl NewTransaction {
    pub fn into_record(self, now: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord {
            id: self.id,
            upstream_transaction_id: self.upstream_transaction_id,
            processing_item_id: self.processing_item_id,
            state: TransactionState::LocalUnprocessed,
            state_reason: None,
            error_code: None,
            error_description: None,
            reference: self.reference,
            remote_reference: None,
            country_code: self.country_code,
            currency_code: self.currency_code,
            amount: self.amount,
            service_code: self.service_code,
            product_code: self.product_code,
            sender_name: self.sender_name,
            sender_phone_number: self.sender_phone_number,
            recipient_phone_number: self.recipient_phone_number,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single state transition, applied in one update.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionChange {
    /// First gateway answer after submission.
    Submitted {
        state: TransactionState,
        error_code: PaymentStatusCode,
        error_description: Option<String>,
        remote_reference: Option<String>,
    },
    /// Poll result; gateway artifacts were recorded at submission.
    Polled { state: TransactionState },
    /// Failure classified by an operation or caught at the job boundary.
    Failed { state: TransactionState, reason: String },
}

impl TransactionChange {
    pub fn state(&self) -> TransactionState {
        match self {
            TransactionChange::Submitted { state, .. }
            | TransactionChange::Polled { state }
            | TransactionChange::Failed { state, .. } => *state,
        }
    }

    pub fn apply(&self, record: &mut TransactionRecord, now: DateTime<Utc>) {
        match self {
            TransactionChange::Submitted {
                state,
                error_code,
                error_description,
                remote_reference,
            } => {
                record.state = *state;
                record.error_code = Some(*error_code);
                record.error_description = error_description.clone();
                record.remote_reference = remote_reference.clone();
            }
            TransactionChange::Polled { state } => record.state = *state,
            TransactionChange::Failed { state, reason } => {
                record.state = *state;
                record.state_reason = Some(reason.clone());
            }
        }
        record.updated_at = now;
    }
}
