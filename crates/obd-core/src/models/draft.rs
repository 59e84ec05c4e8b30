//! Diagnosis form draft and the wire body built from it

use serde::{Deserialize, Serialize};

use crate::validation::{validate, ValidationResult};

/// `method_choice` sent with every diagnosis request
pub const DEFAULT_METHOD_CHOICE: u32 = 1;

/// The diagnosis form as the user is filling it in
///
/// A draft is a plain value: every edit produces a new draft, and the
/// presentation layer replaces the one it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRequestDraft {
    /// Customer complaint, in their own words
    pub complaint: String,
    /// OBD2 trouble code (e.g., "P0420")
    pub dtc_code: String,
    /// Related symptoms
    pub symptoms: String,
    /// Problem area (engine, transmission, ...)
    pub problem_area: String,
}

impl DiagnosisRequestDraft {
    pub fn new(
        complaint: impl Into<String>,
        dtc_code: impl Into<String>,
        symptoms: impl Into<String>,
        problem_area: impl Into<String>,
    ) -> Self {
        Self {
            complaint: complaint.into(),
            dtc_code: dtc_code.into(),
            symptoms: symptoms.into(),
            problem_area: problem_area.into(),
        }
    }

    /// The empty form
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn with_complaint(self, complaint: impl Into<String>) -> Self {
        Self {
            complaint: complaint.into(),
            ..self
        }
    }

    pub fn with_dtc_code(self, dtc_code: impl Into<String>) -> Self {
        Self {
            dtc_code: dtc_code.into(),
            ..self
        }
    }

    pub fn with_symptoms(self, symptoms: impl Into<String>) -> Self {
        Self {
            symptoms: symptoms.into(),
            ..self
        }
    }

    pub fn with_problem_area(self, problem_area: impl Into<String>) -> Self {
        Self {
            problem_area: problem_area.into(),
            ..self
        }
    }

    /// Run field validation on this draft
    pub fn validate(&self) -> ValidationResult {
        validate(self)
    }

    /// Build the wire body, or return the validation errors that block it
    pub fn to_request(&self) -> Result<DiagnosisRequest, ValidationResult> {
        let errors = self.validate();
        if !errors.is_valid() {
            return Err(errors);
        }

        Ok(DiagnosisRequest {
            customer_complaint: self.complaint.clone(),
            method_choice: DEFAULT_METHOD_CHOICE,
            dtc_code: self.dtc_code.clone(),
            related_symptoms: self.symptoms.clone(),
            problem_area: self.problem_area.clone(),
        })
    }
}

/// Body of `POST /diagnose`
///
/// Only obtainable through [`DiagnosisRequestDraft::to_request`], so every
/// instance has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosisRequest {
    customer_complaint: String,
    method_choice: u32,
    dtc_code: String,
    related_symptoms: String,
    problem_area: String,
}

impl DiagnosisRequest {
    pub fn customer_complaint(&self) -> &str {
        &self.customer_complaint
    }

    pub fn method_choice(&self) -> u32 {
        self.method_choice
    }

    pub fn dtc_code(&self) -> &str {
        &self.dtc_code
    }

    pub fn related_symptoms(&self) -> &str {
        &self.related_symptoms
    }

    pub fn problem_area(&self) -> &str {
        &self.problem_area
    }
}
