//! Field validation for diagnosis submissions
//!
//! Validation is pure: it looks at a [`DiagnosisRequestDraft`] and reports
//! every required field that is empty or whitespace-only. Submission only
//! proceeds when the result is empty.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::DiagnosisRequestDraft;

/// A field of the diagnosis form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "complaint")]
    Complaint,
    #[serde(rename = "dtcCode")]
    DtcCode,
    #[serde(rename = "symptoms")]
    Symptoms,
    #[serde(rename = "problemArea")]
    ProblemArea,
}

impl Field {
    /// All form fields, in display order
    pub const ALL: [Field; 4] = [
        Field::Complaint,
        Field::DtcCode,
        Field::Symptoms,
        Field::ProblemArea,
    ];

    /// Key used in validation maps
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complaint => "complaint",
            Self::DtcCode => "dtcCode",
            Self::Symptoms => "symptoms",
            Self::ProblemArea => "problemArea",
        }
    }

    /// Form label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            Self::Complaint => "Reclamação do Cliente",
            Self::DtcCode => "Código de Falha OBD2",
            Self::Symptoms => "Sintomas Relacionados",
            Self::ProblemArea => "Área do Problema",
        }
    }

    /// Message reported when the field is missing
    pub fn required_message(&self) -> &'static str {
        match self {
            Self::Complaint => "Reclamação é obrigatória",
            Self::DtcCode => "Código de Falha é obrigatório",
            Self::Symptoms => "Sintomas Relacionados são obrigatórios",
            Self::ProblemArea => "Área do Problema é obrigatória",
        }
    }

    /// The draft value this field refers to
    pub fn value<'a>(&self, draft: &'a DiagnosisRequestDraft) -> &'a str {
        match self {
            Self::Complaint => &draft.complaint,
            Self::DtcCode => &draft.dtc_code,
            Self::Symptoms => &draft.symptoms,
            Self::ProblemArea => &draft.problem_area,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to error message; empty means valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<Field, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error message for a field, if it failed
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Check every required field of a draft
pub fn validate(draft: &DiagnosisRequestDraft) -> ValidationResult {
    let errors = Field::ALL
        .iter()
        .filter(|field| field.value(draft).trim().is_empty())
        .map(|field| (*field, field.required_message().to_string()))
        .collect();

    ValidationResult { errors }
}
