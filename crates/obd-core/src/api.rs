//! DiagnosticsApi trait - the seam between request orchestration and transport

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{CodeListEntry, CodeLookup, DiagnosisRequest, DiagnosisResult};

/// The diagnostics backend as seen by the front end
///
/// All business logic (code lookup, diagnosis computation) lives behind this
/// trait. `obd-client` implements it over HTTP; tests implement it in memory.
///
/// Implementations must be cancel-safe: the controller aborts a call by
/// dropping its future.
#[async_trait]
pub trait DiagnosticsApi: Send + Sync {
    /// `GET /search_code?code={code}`
    async fn search_code(&self, code: &str) -> ApiResult<CodeLookup>;

    /// `POST /diagnose`
    async fn diagnose(&self, request: &DiagnosisRequest) -> ApiResult<DiagnosisResult>;

    /// `GET /codes`
    async fn list_codes(&self) -> ApiResult<Vec<CodeListEntry>>;
}
