//! Fixed-layout text export of a finished diagnosis

use std::fmt;

use chrono::{DateTime, Utc};

use crate::models::{DiagnosisRequestDraft, DiagnosisResult};
use crate::validation::Field;

const RULE_WIDTH: usize = 48;

/// The submitted fields plus the diagnosis the backend returned
#[derive(Debug, Clone)]
pub struct DiagnosisReport<'a> {
    draft: &'a DiagnosisRequestDraft,
    result: &'a DiagnosisResult,
    generated_at: DateTime<Utc>,
}

impl<'a> DiagnosisReport<'a> {
    pub fn new(draft: &'a DiagnosisRequestDraft, result: &'a DiagnosisResult) -> Self {
        Self {
            draft,
            result,
            generated_at: Utc::now(),
        }
    }

    /// Pin the generation time (for reproducible output)
    pub fn generated_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.generated_at = timestamp;
        self
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DiagnosisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(f, "Relatório de Diagnóstico")?;
        writeln!(
            f,
            "Gerado em: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "{}", rule)?;
        for field in Field::ALL {
            writeln!(f, "{}: {}", field.label(), field.value(self.draft))?;
        }
        writeln!(f, "{}", rule)?;
        writeln!(f, "Resultado do Diagnóstico")?;
        writeln!(f, "Método de Diagnóstico: {}", self.result.method_label())?;
        writeln!(f, "Sugestão: {}", self.result.suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Diagnosis;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_layout() {
        let draft = DiagnosisRequestDraft::new("Engine light on", "P0420", "Rough idle", "Exhaust");
        let result = DiagnosisResult {
            diagnosis: Diagnosis {
                method: Some("Visual".into()),
                extra: Default::default(),
            },
            suggestion: "Check sensor".into(),
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

        let text = DiagnosisReport::new(&draft, &result)
            .generated_at(at)
            .render();

        let rule = "-".repeat(RULE_WIDTH);
        let expected = format!(
            "Relatório de Diagnóstico\n\
             Gerado em: 2024-05-01 12:30:00 UTC\n\
             {rule}\n\
             Reclamação do Cliente: Engine light on\n\
             Código de Falha OBD2: P0420\n\
             Sintomas Relacionados: Rough idle\n\
             Área do Problema: Exhaust\n\
             {rule}\n\
             Resultado do Diagnóstico\n\
             Método de Diagnóstico: Visual\n\
             Sugestão: Check sensor\n"
        );
        assert_eq!(text, expected);
    }
}
