//! Error types for diagnostics client operations

use obd_core::ApiError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ObdClientError>;

/// Errors that can occur during client operations
#[derive(Error, Debug)]
pub enum ObdClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Server returned an error response
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Code or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Timeout
    #[error("Request timed out")]
    Timeout,
}

impl ObdClientError {
    /// Create a server error from status code and message
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }
}

impl From<ObdClientError> for ApiError {
    fn from(err: ObdClientError) -> Self {
        match err {
            ObdClientError::HttpError(e) if e.is_timeout() => ApiError::Timeout,
            ObdClientError::HttpError(e) if e.is_decode() => {
                ApiError::InvalidResponse(e.to_string())
            }
            ObdClientError::HttpError(e) => match e.status() {
                Some(status) => ApiError::server(status.as_u16(), e.to_string()),
                None => ApiError::Unreachable(e.to_string()),
            },
            ObdClientError::InvalidUrl(e) => ApiError::Unreachable(e.to_string()),
            ObdClientError::IoError(e) => ApiError::Unreachable(e.to_string()),
            ObdClientError::ServerError { status, message } => ApiError::server(status, message),
            ObdClientError::NotFound(message) => ApiError::NotFound(message),
            ObdClientError::ParseError(message) => ApiError::InvalidResponse(message),
            ObdClientError::Timeout => ApiError::Timeout,
        }
    }
}
