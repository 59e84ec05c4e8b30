//! Diagnose command - submit a diagnosis request

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use obd_core::{
    DiagnosisReport, DiagnosisRequestDraft, DiagnosisSubmissionOp, DiagnosticsApi,
    RequestController,
};

use super::{drive, outcome, Reported};
use crate::output::{DiagnosisRow, OutputContext, ValidationRow};

/// Validate the draft, submit it and optionally export a report
pub async fn diagnose(
    api: Arc<dyn DiagnosticsApi>,
    draft: &DiagnosisRequestDraft,
    export: Option<&Path>,
    timeout: Duration,
    ctx: &OutputContext,
) -> Result<()> {
    let validation = draft.validate();
    if !validation.is_valid() {
        ctx.error("Corrija os campos obrigatórios:");
        let rows: Vec<ValidationRow> = validation
            .iter()
            .map(|(field, message)| ValidationRow {
                field: field.label().to_string(),
                message: message.to_string(),
            })
            .collect();
        ctx.print(&rows);
        return Err(Reported::Invalid(validation.len()).into());
    }

    let controller =
        RequestController::new(DiagnosisSubmissionOp::new(api)).with_timeout(Some(timeout));
    let notifications = controller.notifications();

    controller.submit(draft)?;
    let state = drive(&controller, notifications, "Enviando diagnóstico...", ctx).await?;

    let Some(result) = outcome(state)? else {
        return Ok(());
    };

    ctx.print_one(&DiagnosisRow {
        method: result.method_label().to_string(),
        suggestion: result.suggestion.clone(),
    });

    if let Some(path) = export {
        let report = DiagnosisReport::new(draft, &result).render();
        std::fs::write(path, report)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        ctx.success(&format!("Relatório salvo em {}", path.display()));
    }

    Ok(())
}
