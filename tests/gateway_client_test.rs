mod common;

use chrono::Utc;
use mockito::Matcher;
use serde_json::json;
use uuid::Uuid;

use tingg_core::config::TinggApiConfig;
use tingg_core::domain::TransactionRecord;
use tingg_core::gateway::{GatewayError, TinggClient};
use tingg_core::ports::GatewayClient;

fn config(url: String) -> TinggApiConfig {
    TinggApiConfig {
        url,
        callback_url: "https://remit.example.com/tingg/callback".to_string(),
        username: "remit".to_string(),
        password: "secret".to_string(),
        timeout_secs: 5,
    }
}

fn record() -> TransactionRecord {
    let mut record = common::new_transaction(Uuid::new_v4()).into_record(Utc::now());
    record.remote_reference = Some("beep-42".to_string());
    record
}

#[tokio::test]
async fn test_submit_payment_posts_beep_packet() {
    let mut server = mockito::Server::new_async().await;
    let record = record();

    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "function": "BEEP.postPayment",
            "payload": {
                "credentials": {"username": "remit", "password": "secret"},
                "packet": [{
                    "serviceCode": "MTNNG",
                    "MSISDN": "+2348011111111",
                    "payerTransactionID": record.reference,
                    "amount": "2.01",
                    "currencyCode": "NGN",
                    "countryCode": "NGA"
                }]
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "authStatus": {"authStatusCode": 131, "authStatusDescription": "Authentication was successful"},
                "results": [{"statusCode": "139", "statusDescription": "Pending", "beepTransactionID": "beep-42"}]
            }"#,
        )
        .create_async()
        .await;

    let client = TinggClient::new(config(server.url())).unwrap();
    let response = client.submit_payment(&record).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.auth_status_code.as_deref(), Some("131"));
    let result = response.first_result().unwrap();
    assert_eq!(result.status_code.as_deref(), Some("139"));
    assert_eq!(result.remote_reference.as_deref(), Some("beep-42"));
}

#[tokio::test]
async fn test_query_status_sends_references() {
    let mut server = mockito::Server::new_async().await;
    let record = record();

    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "function": "BEEP.queryPaymentStatus",
            "payload": {"packet": [{
                "serviceID": "MTNNG",
                "payerTransactionID": record.reference,
                "beepTransactionID": "beep-42"
            }]}
        })))
        .with_status(200)
        .with_body(r#"{"authStatus": {"authStatusCode": "131"}, "results": [{"statusCode": 183}]}"#)
        .create_async()
        .await;

    let client = TinggClient::new(config(server.url())).unwrap();
    let response = client.query_status(&record).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.first_result().unwrap().status_code.as_deref(), Some("183"));
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let client = TinggClient::new(config(server.url())).unwrap();
    let result = client.submit_payment(&record()).await;

    assert!(matches!(result, Err(GatewayError::Status { status: 502, .. })));
}

#[tokio::test]
async fn test_undecodable_body_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = TinggClient::new(config(server.url())).unwrap();
    let result = client.query_status(&record()).await;

    assert!(matches!(result, Err(GatewayError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_circuit_breaker_opens_after_failures() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(500)
        .expect_at_least(3)
        .create_async()
        .await;

    let client = TinggClient::with_circuit_breaker(config(server.url()), 3, 30).unwrap();
    for _ in 0..3 {
        let _ = client.submit_payment(&record()).await;
    }

    let result = client.submit_payment(&record()).await;
    assert!(matches!(result, Err(GatewayError::CircuitBreakerOpen(_))));
    assert_eq!(client.circuit_state(), "open");
}
