//! Lookup command - describe one OBD2 code

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use obd_core::{CodeLookupOp, DiagnosticsApi, RequestController};

use super::{drive, outcome};
use crate::output::{LookupRow, OutputContext};

/// Look up the description of a code
pub async fn lookup(
    api: Arc<dyn DiagnosticsApi>,
    code: &str,
    timeout: Duration,
    ctx: &OutputContext,
) -> Result<()> {
    let controller = RequestController::new(CodeLookupOp::new(api)).with_timeout(Some(timeout));
    let notifications = controller.notifications();

    controller.lookup(code)?;
    let state = drive(&controller, notifications, "Buscando código...", ctx).await?;

    if let Some(description) = outcome(state)? {
        ctx.print_one(&LookupRow {
            code: code.to_string(),
            description,
        });
    }
    Ok(())
}
