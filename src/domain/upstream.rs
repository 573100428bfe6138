//! Capabilities the host application exposes to this integration.
//!
//! The host owns processing items, transactions, senders, recipients and its
//! mobile-money provider catalog. The core only sees these narrow traits, and
//! concrete host types are injected through [`HostModels`] at startup.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::state::ProcessingItemState;

#[derive(Debug, Error)]
#[error("host model error: {0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamTransactionType {
    Mobile,
    Bank,
    Cash,
}

impl UpstreamTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamTransactionType::Mobile => "mobile",
            UpstreamTransactionType::Bank => "bank",
            UpstreamTransactionType::Cash => "cash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamTransactionState {
    Pending,
    Processing,
    Processed,
    Failed,
    Cancelled,
}

impl UpstreamTransactionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamTransactionState::Pending => "pending",
            UpstreamTransactionState::Processing => "processing",
            UpstreamTransactionState::Processed => "processed",
            UpstreamTransactionState::Failed => "failed",
            UpstreamTransactionState::Cancelled => "cancelled",
        }
    }
}

/// Amount in the currency paid out to the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    pub currency: String,
    pub amount: BigDecimal,
}

impl Money {
    pub fn new(currency: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            currency: currency.into(),
            amount,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.amount > BigDecimal::from(0)
    }

    /// Plain decimal rendering, e.g. `2.01`.
    pub fn to_decimal_string(&self) -> String {
        self.amount.to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal_string(), self.currency)
    }
}

#[async_trait]
pub trait ProcessingItem: Send + Sync {
    fn id(&self) -> Uuid;

    fn model_name(&self) -> &str {
        "ProcessingItem"
    }

    async fn transaction(&self) -> HostResult<Option<Arc<dyn UpstreamTransaction>>>;

    /// Records a state and reason on the item so the host pipeline can react.
    async fn update_state_code(&self, state: ProcessingItemState, reason: &str) -> HostResult<()>;
}

#[async_trait]
pub trait UpstreamTransaction: Send + Sync {
    fn id(&self) -> Uuid;

    fn model_name(&self) -> &str {
        "Transaction"
    }

    fn kind(&self) -> UpstreamTransactionType;

    fn state(&self) -> UpstreamTransactionState;

    fn output_amount(&self) -> Money;

    fn reference_for_humans(&self) -> String;

    async fn sender(&self) -> HostResult<Option<Arc<dyn UpstreamSender>>>;

    async fn recipient(&self) -> HostResult<Option<Arc<dyn UpstreamRecipient>>>;
}

pub trait UpstreamSender: Send + Sync {
    fn id(&self) -> Uuid;

    fn model_name(&self) -> &str {
        "Sender"
    }
}

pub trait UpstreamRecipient: Send + Sync {
    fn id(&self) -> Uuid;

    fn model_name(&self) -> &str {
        "Recipient"
    }

    fn mobile_provider(&self) -> Option<String>;

    fn phone_number(&self) -> Option<String>;

    fn country_code(&self) -> String;
}

/// Entry of the host's own mobile-money provider catalog.
pub trait UpstreamMobileMoneyProvider: Send + Sync {
    fn id(&self) -> Uuid;

    fn model_name(&self) -> &str {
        "MobileMoneyProvider"
    }
}

/// Lookups into the host's models, resolved once at startup.
#[async_trait]
pub trait HostModels: Send + Sync {
    async fn find_processing_item(&self, id: Uuid) -> HostResult<Option<Arc<dyn ProcessingItem>>>;

    async fn find_mobile_money_provider(
        &self,
        code: &str,
        country_code: &str,
    ) -> HostResult<Option<Arc<dyn UpstreamMobileMoneyProvider>>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_money_renders_plain_decimal() {
        let money = Money::new("NGN", BigDecimal::from_str("2.01").unwrap());
        assert_eq!(money.to_decimal_string(), "2.01");
        assert_eq!(money.to_string(), "2.01 NGN");
    }

    #[test]
    fn test_money_positivity() {
        assert!(Money::new("NGN", BigDecimal::from_str("0.01").unwrap()).is_positive());
        assert!(!Money::new("NGN", BigDecimal::from(0)).is_positive());
        assert!(!Money::new("NGN", BigDecimal::from(-5)).is_positive());
    }
}
