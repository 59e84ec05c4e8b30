//! Error types shared by the backend seam and the request controller

use thiserror::Error;

use crate::state::RequestId;
use crate::validation::ValidationResult;

/// Result type for backend calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors a diagnostics backend call can end with
///
/// These are stored as-is in [`RequestState::Failed`](crate::RequestState::Failed);
/// the controller never inspects them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Backend answered 404 (unknown code, missing route)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with any other non-2xx status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Connection refused, DNS failure, reset, etc.
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// The request did not finish in time
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Create a server error from status code and message
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned synchronously by [`RequestController`](crate::RequestController)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// A request of this kind is already outstanding
    #[error("A {operation} request is already in flight ({request_id})")]
    AlreadyInFlight {
        operation: &'static str,
        request_id: RequestId,
    },

    /// `start()` was called outside a tokio runtime
    #[error("No async runtime available to issue the {0} request")]
    NoRuntime(&'static str),
}

/// Errors returned when submitting a diagnosis draft
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// One or more fields failed validation; nothing was sent
    #[error("Invalid diagnosis request: {0}")]
    Invalid(ValidationResult),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}
