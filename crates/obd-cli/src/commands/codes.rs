//! Codes command - list every known OBD2 code

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use obd_core::{CodeListOp, DiagnosticsApi, RequestController};

use super::{drive, outcome};
use crate::output::{CodeRow, OutputContext};

/// List all codes in backend order
pub async fn codes(
    api: Arc<dyn DiagnosticsApi>,
    timeout: Duration,
    ctx: &OutputContext,
) -> Result<()> {
    let controller = RequestController::new(CodeListOp::new(api)).with_timeout(Some(timeout));
    let notifications = controller.notifications();

    controller.load()?;
    let state = drive(&controller, notifications, "Carregando códigos...", ctx).await?;

    let Some(entries) = outcome(state)? else {
        return Ok(());
    };

    if entries.is_empty() {
        ctx.info("Nenhum código encontrado");
        return Ok(());
    }

    let rows: Vec<CodeRow> = entries
        .into_iter()
        .map(|entry| CodeRow {
            id: entry.id.to_string(),
            code: entry.code,
            description: entry.description,
        })
        .collect();

    ctx.print(&rows);
    Ok(())
}
