mod common;

use common::{gateway_response, Harness, Scripted};
use tingg_core::ports::TransactionRepository;
use tingg_core::domain::{PaymentStatusCode, TransactionState};
use tingg_core::use_cases::SendTransaction;

fn operation(harness: &Harness) -> SendTransaction {
    SendTransaction::new(harness.transactions.clone(), harness.gateway.clone())
}

#[tokio::test]
async fn test_pending_acknowledgement_moves_to_processing() {
    let harness = Harness::new();
    let (record, _) = harness.seed_record(TransactionState::LocalUnprocessed, None).await;
    harness
        .gateway
        .respond(gateway_response(Some("131"), Some("139"), Some("ref-123")));

    let updated = operation(&harness).execute(&record).await.unwrap();

    assert_eq!(updated.state, TransactionState::Processing);
    assert_eq!(updated.error_code, Some(PaymentStatusCode::PostedAndPendingAcknowledgement));
    assert_eq!(updated.remote_reference(), Some("ref-123"));
    assert_eq!(updated.error_description.as_deref(), Some("status 139"));

    let stored = harness.transactions.get_by_id(record.id).await.unwrap();
    assert_eq!(stored.state, TransactionState::Processing);
}

#[tokio::test]
async fn test_terminal_codes_map_straight_through() {
    for (code, expected) in [
        ("183", TransactionState::Paid),
        ("180", TransactionState::Failed),
        ("190", TransactionState::InvalidAmount),
        ("192", TransactionState::DuplicateTransaction),
        ("141", TransactionState::ApiError),
    ] {
        let harness = Harness::new();
        let (record, _) = harness.seed_record(TransactionState::LocalUnprocessed, None).await;
        harness
            .gateway
            .respond(gateway_response(Some("131"), Some(code), Some("ref-1")));

        let updated = operation(&harness).execute(&record).await.unwrap();
        assert_eq!(updated.state, expected, "code {code}");
    }
}

#[tokio::test]
async fn test_every_other_state_is_not_allowed() {
    for state in TransactionState::ALL {
        if state == TransactionState::LocalUnprocessed {
            continue;
        }
        let harness = Harness::new();
        let (record, _) = harness.seed_record(state, Some("ref-1")).await;

        let err = operation(&harness).execute(&record).await.unwrap_err();

        assert_eq!(err.state(), TransactionState::StateNotAllowed, "from {state}");
        assert!(err.is_precondition());
        assert_eq!(harness.gateway.calls(), 0);
        let stored = harness.transactions.get_by_id(record.id).await.unwrap();
        assert_eq!(stored.state, state);
        assert_eq!(stored.updated_at, record.updated_at);
    }
}

#[tokio::test]
async fn test_transport_failure_is_api_request_exception() {
    let harness = Harness::new();
    let (record, _) = harness.seed_record(TransactionState::LocalUnprocessed, None).await;
    harness.gateway.push(Scripted::Fail("gateway down".to_string()));

    let err = operation(&harness).execute(&record).await.unwrap_err();

    assert_eq!(err.state(), TransactionState::ApiRequestException);
    assert!(err.reason().contains("gateway down"));
    assert_eq!(*harness.gateway.submit_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_unexpected_auth_code_writes_no_reference() {
    let harness = Harness::new();
    let (record, _) = harness.seed_record(TransactionState::LocalUnprocessed, None).await;
    harness
        .gateway
        .respond(gateway_response(Some("999"), Some("139"), Some("ref-123")));

    let err = operation(&harness).execute(&record).await.unwrap_err();

    assert_eq!(err.state(), TransactionState::UnexpectedAuthCode);
    let stored = harness.transactions.get_by_id(record.id).await.unwrap();
    assert!(stored.remote_reference.is_none());
}

#[tokio::test]
async fn test_missing_payment_result() {
    let harness = Harness::new();
    let (record, _) = harness.seed_record(TransactionState::LocalUnprocessed, None).await;
    harness.gateway.respond(gateway_response(Some("131"), None, None));

    let err = operation(&harness).execute(&record).await.unwrap_err();

    assert_eq!(err.state(), TransactionState::NoErrorCodeProperty);
}

#[tokio::test]
async fn test_unknown_payment_status_code() {
    let harness = Harness::new();
    let (record, _) = harness.seed_record(TransactionState::LocalUnprocessed, None).await;
    harness
        .gateway
        .respond(gateway_response(Some("131"), Some("not a code you can expect"), None));

    let err = operation(&harness).execute(&record).await.unwrap_err();

    assert_eq!(err.state(), TransactionState::UnexpectedErrorCode);
    assert!(err.reason().contains("not a code you can expect"));
}

#[tokio::test]
async fn test_pending_answer_without_reference_is_parked() {
    for reference in [None, Some("")] {
        let harness = Harness::new();
        let (record, _) = harness.seed_record(TransactionState::LocalUnprocessed, None).await;
        harness
            .gateway
            .respond(gateway_response(Some("131"), Some("139"), reference));

        let err = operation(&harness).execute(&record).await.unwrap_err();

        assert_eq!(err.state(), TransactionState::NoRemoteReference);
        assert!(!err.is_precondition());
        assert!(err.reason().contains("no beepTransactionID"));
    }
}

#[tokio::test]
async fn test_final_answer_without_reference_is_stored() {
    let harness = Harness::new();
    let (record, _) = harness.seed_record(TransactionState::LocalUnprocessed, None).await;
    harness
        .gateway
        .respond(gateway_response(Some("131"), Some("180"), None));

    let updated = operation(&harness).execute(&record).await.unwrap();

    assert_eq!(updated.state, TransactionState::Failed);
    assert!(updated.remote_reference.is_none());
}
