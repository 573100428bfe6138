//! Wire shapes of the Beep JSON API and the decoded response the core consumes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::TransactionRecord;

pub const POST_PAYMENT_FUNCTION: &str = "BEEP.postPayment";
pub const QUERY_PAYMENT_STATUS_FUNCTION: &str = "BEEP.queryPaymentStatus";

#[derive(Debug, Serialize)]
pub struct BeepRequest<P> {
    pub function: &'static str,
    pub payload: BeepPayload<P>,
}

#[derive(Debug, Serialize)]
pub struct BeepPayload<P> {
    pub credentials: Credentials,
    pub packet: Vec<P>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPacket {
    pub service_code: String,
    #[serde(rename = "MSISDN")]
    pub msisdn: String,
    pub invoice_number: String,
    pub account_number: String,
    #[serde(rename = "payerTransactionID")]
    pub payer_transaction_id: String,
    pub amount: String,
    pub currency_code: String,
    pub country_code: String,
    pub customer_names: String,
    pub narration: String,
    pub date_payment_received: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    pub extra_data: ExtraData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraData {
    pub callback_url: String,
    pub sender_phone_number: String,
}

impl PaymentPacket {
    pub fn from_record(record: &TransactionRecord, callback_url: &str) -> Self {
        Self {
            service_code: record.service_code.clone(),
            msisdn: record.recipient_phone_number.clone(),
            invoice_number: record.reference.clone(),
            account_number: record.recipient_phone_number.clone(),
            payer_transaction_id: record.reference.clone(),
            amount: record.amount.to_string(),
            currency_code: record.currency_code.clone(),
            country_code: record.country_code.clone(),
            customer_names: record.sender_name.clone(),
            narration: format!("Transfer {} from {}", record.reference, record.sender_name),
            date_payment_received: record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            product_code: record.product_code.clone(),
            extra_data: ExtraData {
                callback_url: callback_url.to_string(),
                sender_phone_number: record.sender_phone_number.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryPacket {
    #[serde(rename = "serviceID")]
    pub service_id: String,
    #[serde(rename = "payerTransactionID")]
    pub payer_transaction_id: String,
    #[serde(rename = "beepTransactionID")]
    pub beep_transaction_id: String,
}

impl QueryPacket {
    pub fn from_record(record: &TransactionRecord) -> Self {
        Self {
            service_id: record.service_code.clone(),
            payer_transaction_id: record.reference.clone(),
            beep_transaction_id: record.remote_reference().unwrap_or_default().to_string(),
        }
    }
}

/// Codes arrive as JSON strings or numbers depending on the endpoint.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeepResponse {
    #[serde(default)]
    pub auth_status: Option<AuthStatus>,
    #[serde(default)]
    pub results: Vec<BeepResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    #[serde(default, deserialize_with = "lenient_string")]
    pub auth_status_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub auth_status_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BeepResult {
    #[serde(rename = "statusCode", default, deserialize_with = "lenient_string")]
    pub status_code: Option<String>,
    #[serde(rename = "statusDescription", default, deserialize_with = "lenient_string")]
    pub status_description: Option<String>,
    #[serde(rename = "payerTransactionID", default, deserialize_with = "lenient_string")]
    pub payer_transaction_id: Option<String>,
    #[serde(rename = "beepTransactionID", default, deserialize_with = "lenient_string")]
    pub beep_transaction_id: Option<String>,
    #[serde(rename = "receiptNumber", default, deserialize_with = "lenient_string")]
    pub receipt_number: Option<String>,
}

/// Decoded gateway answer: an authorization code plus ordered payment results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GatewayResponse {
    pub auth_status_code: Option<String>,
    pub auth_status_description: Option<String>,
    pub results: Vec<PaymentResult>,
    pub raw_body: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentResult {
    pub status_code: Option<String>,
    pub status_description: Option<String>,
    pub remote_reference: Option<String>,
}

impl GatewayResponse {
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        let decoded: BeepResponse = serde_json::from_str(body)?;
        let (auth_status_code, auth_status_description) = match decoded.auth_status {
            Some(auth) => (auth.auth_status_code, auth.auth_status_description),
            None => (None, None),
        };

        Ok(Self {
            auth_status_code,
            auth_status_description,
            results: decoded
                .results
                .into_iter()
                .map(|r| PaymentResult {
                    status_code: r.status_code,
                    status_description: r.status_description,
                    remote_reference: r.beep_transaction_id.filter(|id| !id.trim().is_empty()),
                })
                .collect(),
            raw_body: body.to_string(),
        })
    }

    pub fn first_result(&self) -> Option<&PaymentResult> {
        self.results.first()
    }
}
