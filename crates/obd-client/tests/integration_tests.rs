//! Integration tests for obd-client
//!
//! These tests spin up the in-process mock backend and drive it through the
//! client, both directly and through the request controllers from obd-core.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use obd_client::testing::{wait_for, MockBackend, TestServer};
use obd_client::{ObdClient, ObdClientError};
use obd_core::{
    ApiError, CodeListOp, CodeLookupOp, Diagnosis, DiagnosisRequestDraft, DiagnosisResult,
    DiagnosisSubmissionOp, NoticeLevel, RequestController, RequestState, SubmitError,
};
use pretty_assertions::assert_eq;
use tokio::sync::broadcast::error::TryRecvError;

// =============================================================================
// Test Helpers
// =============================================================================

async fn start(backend: &MockBackend) -> TestServer {
    TestServer::start(backend.router())
        .await
        .expect("Failed to start test server")
}

fn filled_draft() -> DiagnosisRequestDraft {
    DiagnosisRequestDraft::new("Engine light on", "P0420", "Rough idle", "Exhaust")
}

// =============================================================================
// Code Lookup Tests
// =============================================================================

#[tokio::test]
async fn test_search_code() {
    let backend = MockBackend::new();
    let server = start(&backend).await;

    let lookup = server.client.search_code("P0420").await.unwrap();
    assert_eq!(lookup.result, "Catalyst efficiency below threshold");
    assert_eq!(backend.last_code().as_deref(), Some("P0420"));
}

#[tokio::test]
async fn test_search_code_not_found() {
    let backend = MockBackend::new();
    let server = start(&backend).await;

    let err = server.client.search_code("P9999").await.unwrap_err();
    assert!(matches!(err, ObdClientError::NotFound(ref msg) if msg.contains("P9999")));
    assert!(matches!(ApiError::from(err), ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_search_empty_code_is_sent_as_is() {
    let backend = MockBackend::new();
    let server = start(&backend).await;

    let result = server.client.search_code("").await;
    assert!(result.is_err());
    assert_eq!(backend.search_hits(), 1);
    assert_eq!(backend.last_code().as_deref(), Some(""));
}

#[tokio::test]
async fn test_search_code_is_query_encoded() {
    let backend = MockBackend::new();
    let server = start(&backend).await;

    let _ = server.client.search_code("P0420&code=P0300").await;
    assert_eq!(backend.last_code().as_deref(), Some("P0420&code=P0300"));
}

// =============================================================================
// Diagnosis Tests
// =============================================================================

#[tokio::test]
async fn test_diagnose_posts_wire_body() {
    let backend = MockBackend::new().with_diagnosis(DiagnosisResult {
        diagnosis: Diagnosis {
            method: Some("Visual".to_string()),
            extra: Default::default(),
        },
        suggestion: "Check sensor".to_string(),
    });
    let server = start(&backend).await;

    let request = filled_draft().to_request().unwrap();
    let result = server.client.diagnose(&request).await.unwrap();

    assert_eq!(result.method_label(), "Visual");
    assert_eq!(result.suggestion, "Check sensor");
    assert_eq!(
        backend.last_diagnosis_body(),
        Some(serde_json::json!({
            "customer_complaint": "Engine light on",
            "method_choice": 1,
            "dtc_code": "P0420",
            "related_symptoms": "Rough idle",
            "problem_area": "Exhaust"
        }))
    );
}

#[tokio::test]
async fn test_diagnose_server_error() {
    let backend = MockBackend::new().failing_with(StatusCode::INTERNAL_SERVER_ERROR);
    let server = start(&backend).await;

    let request = filled_draft().to_request().unwrap();
    let err = server.client.diagnose(&request).await.unwrap_err();
    match err {
        ObdClientError::ServerError { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Mock backend failure");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Code List Tests
// =============================================================================

#[tokio::test]
async fn test_list_codes_keeps_backend_order() {
    let backend = MockBackend::new();
    let server = start(&backend).await;

    let codes = server.client.list_codes().await.unwrap();
    let order: Vec<&str> = codes.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(order, vec!["P0171", "P0300", "P0420"]);
}

#[tokio::test]
async fn test_list_codes_empty() {
    let backend = MockBackend::new().with_codes(vec![]);
    let server = start(&backend).await;

    let codes = server.client.list_codes().await.unwrap();
    assert!(codes.is_empty());
}

#[tokio::test]
async fn test_unreachable_backend() {
    let client = ObdClient::with_config(
        "http://127.0.0.1:1",
        Duration::from_secs(2),
        Duration::from_secs(1),
    )
    .unwrap();

    let err = client.list_codes().await.unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Unreachable(_)));
}

// =============================================================================
// Controller Tests (client + lifecycle)
// =============================================================================

#[tokio::test]
async fn test_controller_lookup_end_to_end() {
    let backend = MockBackend::new();
    let server = start(&backend).await;
    let controller = RequestController::new(CodeLookupOp::new(Arc::new(server.client.clone())));
    let mut notifications = controller.notifications();

    controller.lookup("P0420").unwrap();
    let state = controller.settled().await;

    assert_eq!(
        state,
        RequestState::Succeeded("Catalyst efficiency below threshold".to_string())
    );
    assert_eq!(notifications.try_recv().unwrap().level(), NoticeLevel::Success);
}

#[tokio::test]
async fn test_controller_lookup_failure_notifies_once() {
    let backend = MockBackend::new().failing_with(StatusCode::SERVICE_UNAVAILABLE);
    let server = start(&backend).await;
    let controller = RequestController::new(CodeLookupOp::new(Arc::new(server.client.clone())));
    let mut notifications = controller.notifications();

    controller.lookup("P0420").unwrap();
    let state = controller.settled().await;

    assert_eq!(
        state.error().and_then(ApiError::status),
        Some(503)
    );
    assert_eq!(notifications.try_recv().unwrap().level(), NoticeLevel::Error);
    assert!(matches!(notifications.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(backend.search_hits(), 1);
}

#[tokio::test]
async fn test_controller_cancel_discards_late_response() {
    let backend = MockBackend::new().with_delay(Duration::from_millis(300));
    let server = start(&backend).await;
    let controller = RequestController::new(CodeLookupOp::new(Arc::new(server.client.clone())));
    let mut notifications = controller.notifications();

    controller.lookup("P0420").unwrap();
    assert!(wait_for(|| backend.search_hits() == 1, Duration::from_secs(2)).await);

    assert!(controller.cancel());
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(controller.state(), RequestState::Cancelled);
    assert!(matches!(notifications.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_controller_timeout() {
    let backend = MockBackend::new().with_delay(Duration::from_millis(500));
    let server = start(&backend).await;
    let controller = RequestController::new(CodeListOp::new(Arc::new(server.client.clone())))
        .with_timeout(Some(Duration::from_millis(50)));

    controller.load().unwrap();
    assert_eq!(
        controller.settled().await,
        RequestState::Failed(ApiError::Timeout)
    );
}

#[tokio::test]
async fn test_client_deadline_caps_longer_controller_timeout() {
    let backend = MockBackend::new().with_delay(Duration::from_millis(500));
    let server = TestServer::start_with_timeout(
        backend.router(),
        Duration::from_millis(100),
        Duration::from_secs(1),
    )
    .await
    .unwrap();
    let controller = RequestController::new(CodeLookupOp::new(Arc::new(server.client.clone())))
        .with_timeout(Some(Duration::from_secs(5)));

    let started = Instant::now();
    controller.lookup("P0420").unwrap();
    assert_eq!(
        controller.settled().await,
        RequestState::Failed(ApiError::Timeout)
    );
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_matching_deadlines_let_slow_backend_answer() {
    let backend = MockBackend::new().with_delay(Duration::from_millis(200));
    let timeout = Duration::from_secs(2);
    let server = TestServer::start_with_timeout(backend.router(), timeout, Duration::from_secs(1))
        .await
        .unwrap();
    let controller = RequestController::new(CodeLookupOp::new(Arc::new(server.client.clone())))
        .with_timeout(Some(timeout));

    controller.lookup("P0420").unwrap();
    assert_eq!(
        controller.settled().await,
        RequestState::Succeeded("Catalyst efficiency below threshold".to_string())
    );
}

#[tokio::test]
async fn test_requests_fail_after_server_shutdown() {
    let backend = MockBackend::new();
    let server = start(&backend).await;
    let client = server.client.clone();

    assert!(client.list_codes().await.is_ok());
    server.shutdown().await;

    let err = client.list_codes().await.unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Unreachable(_)));
}

#[tokio::test]
async fn test_controller_submission_validates_first() {
    let backend = MockBackend::new();
    let server = start(&backend).await;
    let controller =
        RequestController::new(DiagnosisSubmissionOp::new(Arc::new(server.client.clone())));

    let err = controller
        .submit(&filled_draft().with_dtc_code("  "))
        .unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(_)));

    controller.submit(&filled_draft()).unwrap();
    let state = controller.settled().await;
    assert_eq!(
        state.result().map(|r| r.suggestion.as_str()),
        Some("Inspect components related to P0420")
    );
    assert_eq!(backend.diagnose_hits(), 1);
}
