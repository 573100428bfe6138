//! Gateway status vocabularies the integration is certified against.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthCode {
    AuthSuccess,
    AuthFailed,
    GenericFailure,
}

impl AuthCode {
    pub const ALL: [AuthCode; 3] = [AuthCode::AuthSuccess, AuthCode::AuthFailed, AuthCode::GenericFailure];

    pub fn code(&self) -> &'static str {
        match self {
            AuthCode::AuthSuccess => "131",
            AuthCode::AuthFailed => "132",
            AuthCode::GenericFailure => "174",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        AuthCode::ALL.iter().copied().find(|c| c.code() == code)
    }
}

impl fmt::Display for AuthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatusCode {
    GenericException,
    InactiveService,
    CustomerMsisdnMissing,
    InvalidCustomerMsisdn,
    InvalidInvoiceAmount,
    InvalidCurrencyCode,
    AccountNumberNotSpecified,
    PostedAndPendingAcknowledgement,
    InvoiceDoesNotExist,
    InvalidServiceId,
    GenericFailure,
    PaymentRejected,
    PaymentAccepted,
    PaymentManuallyRejected,
    PaymentManuallyAccepted,
    PaymentEscalated,
    AmountGreaterThanMaximumAllowed,
    AmountLessThanMinimumAllowed,
    DuplicatePaymentFound,
}

impl PaymentStatusCode {
    pub const ALL: [PaymentStatusCode; 19] = [
        PaymentStatusCode::GenericException,
        PaymentStatusCode::InactiveService,
        PaymentStatusCode::CustomerMsisdnMissing,
        PaymentStatusCode::InvalidCustomerMsisdn,
        PaymentStatusCode::InvalidInvoiceAmount,
        PaymentStatusCode::InvalidCurrencyCode,
        PaymentStatusCode::AccountNumberNotSpecified,
        PaymentStatusCode::PostedAndPendingAcknowledgement,
        PaymentStatusCode::InvoiceDoesNotExist,
        PaymentStatusCode::InvalidServiceId,
        PaymentStatusCode::GenericFailure,
        PaymentStatusCode::PaymentRejected,
        PaymentStatusCode::PaymentAccepted,
        PaymentStatusCode::PaymentManuallyRejected,
        PaymentStatusCode::PaymentManuallyAccepted,
        PaymentStatusCode::PaymentEscalated,
        PaymentStatusCode::AmountGreaterThanMaximumAllowed,
        PaymentStatusCode::AmountLessThanMinimumAllowed,
        PaymentStatusCode::DuplicatePaymentFound,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PaymentStatusCode::GenericException => "101",
            PaymentStatusCode::InactiveService => "102",
            PaymentStatusCode::CustomerMsisdnMissing => "103",
            PaymentStatusCode::InvalidCustomerMsisdn => "104",
            PaymentStatusCode::InvalidInvoiceAmount => "105",
            PaymentStatusCode::InvalidCurrencyCode => "106",
            PaymentStatusCode::AccountNumberNotSpecified => "107",
            PaymentStatusCode::PostedAndPendingAcknowledgement => "139",
            PaymentStatusCode::InvoiceDoesNotExist => "140",
            PaymentStatusCode::InvalidServiceId => "141",
            PaymentStatusCode::GenericFailure => "174",
            PaymentStatusCode::PaymentRejected => "180",
            PaymentStatusCode::PaymentAccepted => "183",
            PaymentStatusCode::PaymentManuallyRejected => "187",
            PaymentStatusCode::PaymentManuallyAccepted => "188",
            PaymentStatusCode::PaymentEscalated => "189",
            PaymentStatusCode::AmountGreaterThanMaximumAllowed => "190",
            PaymentStatusCode::AmountLessThanMinimumAllowed => "191",
            PaymentStatusCode::DuplicatePaymentFound => "192",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        PaymentStatusCode::ALL.iter().copied().find(|c| c.code() == code)
    }
}

impl fmt::Display for PaymentStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
