//! Test utilities for obd-client
//!
//! Provides an in-process mock of the diagnostics backend and a server
//! wrapper that binds it to a free local port.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use obd_core::{CodeListEntry, Diagnosis, DiagnosisResult, EntryId};
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::{ObdClient, Result};

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: ObdClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Create a new test server from an axum Router
    ///
    /// # Example
    ///
    /// ```ignore
    /// use obd_client::testing::{MockBackend, TestServer};
    ///
    /// let backend = MockBackend::new();
    /// let server = TestServer::start(backend.router()).await?;
    ///
    /// let lookup = server.client.search_code("P0420").await?;
    /// ```
    pub async fn start(router: Router) -> Result<Self> {
        Self::start_with_timeout(router, Duration::from_secs(5), Duration::from_secs(2)).await
    }

    /// Create a new test server with custom timeouts
    pub async fn start_with_timeout(
        router: Router,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        // Spawn the server
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let base_url = format!("http://{}", addr);
        let client = ObdClient::with_config(&base_url, timeout, connect_timeout)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal if not already done
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Abort the task if still running
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// =============================================================================
// Mock Backend
// =============================================================================

#[derive(Default)]
struct MockState {
    codes: Mutex<Vec<CodeListEntry>>,
    diagnosis: Mutex<Option<DiagnosisResult>>,
    delay: Mutex<Duration>,
    fail_with: Mutex<Option<StatusCode>>,
    last_code: Mutex<Option<String>>,
    last_diagnosis: Mutex<Option<serde_json::Value>>,
    search_hits: AtomicUsize,
    diagnose_hits: AtomicUsize,
    codes_hits: AtomicUsize,
}

/// In-memory stand-in for the diagnostics backend
///
/// Serves `GET /search_code`, `POST /diagnose` and `GET /codes`. Clones share
/// state, so a test can keep a handle to inspect hits after handing the
/// router to a [`TestServer`].
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<MockState>,
}

impl MockBackend {
    /// Backend preloaded with a few well-known codes
    pub fn new() -> Self {
        Self::default().with_codes(sample_codes())
    }

    pub fn with_codes(self, codes: Vec<CodeListEntry>) -> Self {
        *self.state.codes.lock() = codes;
        self
    }

    /// Fix the answer to `POST /diagnose`
    pub fn with_diagnosis(self, result: DiagnosisResult) -> Self {
        *self.state.diagnosis.lock() = Some(result);
        self
    }

    /// Hold every response for `delay`
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.state.delay.lock() = delay;
        self
    }

    /// Answer every request with `status`
    pub fn failing_with(self, status: StatusCode) -> Self {
        *self.state.fail_with.lock() = Some(status);
        self
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/search_code", get(search_code))
            .route("/diagnose", post(diagnose))
            .route("/codes", get(list_codes))
            .with_state(self.clone())
    }

    pub fn search_hits(&self) -> usize {
        self.state.search_hits.load(Ordering::SeqCst)
    }

    pub fn diagnose_hits(&self) -> usize {
        self.state.diagnose_hits.load(Ordering::SeqCst)
    }

    pub fn codes_hits(&self) -> usize {
        self.state.codes_hits.load(Ordering::SeqCst)
    }

    /// `code` query parameter of the last lookup
    pub fn last_code(&self) -> Option<String> {
        self.state.last_code.lock().clone()
    }

    /// Body of the last `POST /diagnose`
    pub fn last_diagnosis_body(&self) -> Option<serde_json::Value> {
        self.state.last_diagnosis.lock().clone()
    }

    /// Sleep for the configured delay, then report the configured failure
    async fn gate(&self) -> Option<Response> {
        let delay = *self.state.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failure = *self.state.fail_with.lock();
        failure.map(|status| error_response(status, "Mock backend failure"))
    }
}

/// A handful of codes for tests and demos
pub fn sample_codes() -> Vec<CodeListEntry> {
    [
        ("P0171", "System too lean (Bank 1)"),
        ("P0300", "Random/multiple cylinder misfire detected"),
        ("P0420", "Catalyst efficiency below threshold"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (code, description))| CodeListEntry {
        id: EntryId::Number(i as i64 + 1),
        code: code.to_string(),
        description: description.to_string(),
    })
    .collect()
}

fn default_diagnosis(dtc_code: &str) -> DiagnosisResult {
    DiagnosisResult {
        diagnosis: Diagnosis {
            method: Some("Visual".to_string()),
            extra: Default::default(),
        },
        suggestion: format!("Inspect components related to {}", dtc_code),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    code: String,
}

async fn search_code(
    State(backend): State<MockBackend>,
    Query(params): Query<SearchParams>,
) -> Response {
    backend.state.search_hits.fetch_add(1, Ordering::SeqCst);
    *backend.state.last_code.lock() = Some(params.code.clone());

    if let Some(failure) = backend.gate().await {
        return failure;
    }

    let found = backend
        .state
        .codes
        .lock()
        .iter()
        .find(|entry| entry.code.eq_ignore_ascii_case(&params.code))
        .map(|entry| entry.description.clone());

    match found {
        Some(result) => Json(serde_json::json!({ "result": result })).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("Code not found: {}", params.code),
        ),
    }
}

async fn diagnose(
    State(backend): State<MockBackend>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    backend.state.diagnose_hits.fetch_add(1, Ordering::SeqCst);
    *backend.state.last_diagnosis.lock() = Some(body.clone());

    if let Some(failure) = backend.gate().await {
        return failure;
    }

    let configured = backend.state.diagnosis.lock().clone();
    let result = configured.unwrap_or_else(|| {
        default_diagnosis(body["dtc_code"].as_str().unwrap_or_default())
    });
    Json(result).into_response()
}

async fn list_codes(State(backend): State<MockBackend>) -> Response {
    backend.state.codes_hits.fetch_add(1, Ordering::SeqCst);

    if let Some(failure) = backend.gate().await {
        return failure;
    }

    let codes = backend.state.codes.lock().clone();
    Json(codes).into_response()
}

/// Wait for a condition with timeout
pub async fn wait_for<F>(condition: F, timeout: Duration) -> bool
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;

    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    false
}
