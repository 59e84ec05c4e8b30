//! Diagnostics backend HTTP client implementation

use std::time::Duration;

use async_trait::async_trait;
use obd_core::{
    ApiError, ApiResult, CodeListEntry, CodeLookup, DiagnosisRequest, DiagnosisResult,
    DiagnosticsApi,
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ObdClientError, Result};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body some backend routes return
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Diagnostics backend REST client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ObdClient {
    client: Client,
    base_url: Url,
}

impl ObdClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the backend (e.g., "http://localhost:5000")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new client with custom timeouts
    ///
    /// `timeout` bounds every call end to end, so it should match the
    /// deadline of the controller driving this client.
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // =========================================================================
    // Code Lookup
    // =========================================================================

    /// Look up the description of an OBD2 code
    ///
    /// The code is sent as entered, including an empty string.
    #[instrument(skip(self))]
    pub async fn search_code(&self, code: &str) -> Result<CodeLookup> {
        let mut url = self.base_url.join("/search_code")?;
        url.query_pairs_mut().append_pair("code", code);
        debug!("Looking up code at {}", url);

        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    /// List all known codes, in backend order
    #[instrument(skip(self))]
    pub async fn list_codes(&self) -> Result<Vec<CodeListEntry>> {
        let url = self.base_url.join("/codes")?;
        debug!("Listing codes from {}", url);

        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    // =========================================================================
    // Diagnosis
    // =========================================================================

    /// Submit a validated diagnosis request
    #[instrument(skip(self, request), fields(dtc_code = request.dtc_code()))]
    pub async fn diagnose(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult> {
        let url = self.base_url.join("/diagnose")?;

        let response = self.client.post(url).json(request).send().await?;
        self.handle_response(response).await
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    /// Handle response and deserialize JSON
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ObdClientError::ParseError(e.to_string()))
        } else {
            Err(self.extract_error(response, status).await)
        }
    }

    /// Extract error from failed response
    async fn extract_error(
        &self,
        response: reqwest::Response,
        status: StatusCode,
    ) -> ObdClientError {
        // Try to parse error response body
        let message = match response.json::<ErrorResponse>().await {
            Ok(err) => err.error,
            Err(_) => format!("HTTP {}", status),
        };

        match status {
            StatusCode::NOT_FOUND => ObdClientError::NotFound(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ObdClientError::Timeout,
            _ => ObdClientError::server_error(status.as_u16(), message),
        }
    }
}

#[async_trait]
impl DiagnosticsApi for ObdClient {
    async fn search_code(&self, code: &str) -> ApiResult<CodeLookup> {
        ObdClient::search_code(self, code).await.map_err(ApiError::from)
    }

    async fn diagnose(&self, request: &DiagnosisRequest) -> ApiResult<DiagnosisResult> {
        ObdClient::diagnose(self, request).await.map_err(ApiError::from)
    }

    async fn list_codes(&self) -> ApiResult<Vec<CodeListEntry>> {
        ObdClient::list_codes(self).await.map_err(ApiError::from)
    }
}
