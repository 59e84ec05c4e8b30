//! Request state machine values

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Identity of one `start()` call
///
/// A fresh id is minted per attempt so a completion can be matched against
/// the attempt that is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one logical operation
///
/// `Idle → InFlight → {Succeeded | Failed | Cancelled} → Idle`
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState<T> {
    /// Nothing started, or reset after a terminal state
    #[default]
    Idle,
    /// A call is outstanding
    InFlight(RequestId),
    /// The call returned a payload
    Succeeded(T),
    /// The call failed (transport, server, timeout)
    Failed(ApiError),
    /// The user cancelled before the call resolved
    Cancelled,
}

impl<T> RequestState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight(_))
    }

    /// Succeeded, Failed or Cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_) | Self::Cancelled)
    }

    /// Id of the outstanding call, if any
    pub fn in_flight_id(&self) -> Option<RequestId> {
        match self {
            Self::InFlight(id) => Some(*id),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Short name for logs and status lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InFlight(_) => "in_flight",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}
