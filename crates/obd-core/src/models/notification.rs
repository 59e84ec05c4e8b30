//! User-facing notifications emitted on terminal transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::RequestId;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Title and body of a notification, as produced by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// A notice bound to the request that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Operation name (`code_lookup`, `diagnosis`, `code_list`)
    pub operation: String,
    pub request_id: RequestId,
    #[serde(flatten)]
    pub notice: Notice,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(operation: &str, request_id: RequestId, notice: Notice) -> Self {
        Self {
            operation: operation.to_string(),
            request_id,
            notice,
            timestamp: Utc::now(),
        }
    }

    pub fn level(&self) -> NoticeLevel {
        self.notice.level
    }
}
