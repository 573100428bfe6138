use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::models::{
    BeepPayload, BeepRequest, Credentials, GatewayResponse, PaymentPacket, QueryPacket,
    POST_PAYMENT_FUNCTION, QUERY_PAYMENT_STATUS_FUNCTION,
};
use super::GatewayError;
use crate::config::TinggApiConfig;
use crate::domain::TransactionRecord;
use crate::ports::GatewayClient;
use crate::utils::sanitize::sanitize_json;

type Breaker = StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>;

/// HTTP client for the Tingg (Cellulant Beep) JSON API
#[derive(Clone)]
pub struct TinggClient {
    client: Client,
    config: TinggApiConfig,
    circuit_breaker: Breaker,
}

impl TinggClient {
    /// Creates a client that opens its circuit after 3 consecutive failures.
    pub fn new(config: TinggApiConfig) -> Result<Self, GatewayError> {
        Self::with_circuit_breaker(config, 3, 60)
    }

    pub fn with_circuit_breaker(
        config: TinggApiConfig,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        Ok(TinggClient {
            client,
            config,
            circuit_breaker,
        })
    }

    /// Returns the current state of the circuit breaker
    pub fn circuit_state(&self) -> &'static str {
        if self.circuit_breaker.is_call_permitted() {
            "closed"
        } else {
            "open"
        }
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            username: self.config.username.clone(),
            password: self.config.password.clone(),
        }
    }

    async fn call<P: Serialize>(
        &self,
        function: &'static str,
        packet: P,
    ) -> Result<GatewayResponse, GatewayError> {
        let request = BeepRequest {
            function,
            payload: BeepPayload {
                credentials: self.credentials(),
                packet: vec![packet],
            },
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| GatewayError::InvalidResponse(format!("unserializable request: {e}")))?;

        tracing::debug!(
            function,
            body = %sanitize_json(&body),
            "Sending gateway request"
        );

        let client = self.client.clone();
        let url = self.config.url.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.post(&url).json(&body).send().await?;
                let status = response.status();
                let text = response.text().await?;

                if !status.is_success() {
                    return Err(GatewayError::Status {
                        status: status.as_u16(),
                        body: text,
                    });
                }

                GatewayResponse::from_body(&text)
                    .map_err(|e| GatewayError::InvalidResponse(format!("{e}: `{text}`")))
            })
            .await;

        match result {
            Ok(response) => Ok(response),
            Err(FailsafeError::Rejected) => Err(GatewayError::CircuitBreakerOpen(
                "Tingg API circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[async_trait]
impl GatewayClient for TinggClient {
    async fn submit_payment(&self, record: &TransactionRecord) -> Result<GatewayResponse, GatewayError> {
        let packet = PaymentPacket::from_record(record, &self.config.callback_url);
        self.call(POST_PAYMENT_FUNCTION, packet).await
    }

    async fn query_status(&self, record: &TransactionRecord) -> Result<GatewayResponse, GatewayError> {
        self.call(QUERY_PAYMENT_STATUS_FUNCTION, QueryPacket::from_record(record))
            .await
    }
}
