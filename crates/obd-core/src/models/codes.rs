//! OBD2 code lookup and code list models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Query for `GET /search_code`
///
/// The code is sent as entered; an empty code is a valid query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLookupQuery {
    pub code: String,
}

impl CodeLookupQuery {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Response of `GET /search_code`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLookup {
    /// Human-readable description of the code
    pub result: String,
}

/// Identifier of a code list entry (the backend emits numbers or strings)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One entry of `GET /codes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeListEntry {
    pub id: EntryId,
    /// DTC such as "P0420"
    pub code: String,
    pub description: String,
}
