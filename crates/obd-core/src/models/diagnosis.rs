//! Diagnosis response model

use serde::{Deserialize, Serialize};

/// Key under which the backend reports the diagnosis method
pub const DIAGNOSIS_METHOD_KEY: &str = "Método de Diagnóstico";

/// Diagnosis block of a `POST /diagnose` response
///
/// Only the method label is read; any other keys are kept untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    #[serde(rename = "Método de Diagnóstico", default)]
    pub method: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of `POST /diagnose`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub diagnosis: Diagnosis,
    pub suggestion: String,
}

impl DiagnosisResult {
    /// Diagnosis method label, `"-"` when the backend left it out
    pub fn method_label(&self) -> &str {
        self.diagnosis.method.as_deref().unwrap_or("-")
    }
}
