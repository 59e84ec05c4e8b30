//! Command implementations for obd-cli

pub mod codes;
pub mod diagnose;
pub mod lookup;

pub use codes::codes;
pub use diagnose::diagnose;
pub use lookup::lookup;

use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use obd_core::{ApiError, Notification, Operation, RequestController, RequestState};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::output::OutputContext;

/// Message printed when the user interrupts a request
pub const CANCELLED_MESSAGE: &str = "Requisição cancelada";

/// A failure the user has already been shown
///
/// `main` exits non-zero on these without printing them again.
#[derive(Debug, Error)]
pub enum Reported {
    /// Rendered as an error notification
    #[error("{0}")]
    Request(ApiError),

    /// Rendered as a table of field errors
    #[error("{0} campo(s) inválido(s)")]
    Invalid(usize),
}

/// Wait for the request in flight on `controller` to settle
///
/// Shows a spinner while waiting. Ctrl+C cancels the request instead of
/// killing the process, so a late response is discarded. Notifications
/// received on `notifications` are rendered once the request settles.
pub async fn drive<O: Operation>(
    controller: &RequestController<O>,
    mut notifications: broadcast::Receiver<Notification>,
    message: &str,
    ctx: &OutputContext,
) -> Result<RequestState<O::Output>> {
    let spinner = if ctx.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let state = tokio::select! {
        state = controller.settled() => state,
        _ = tokio::signal::ctrl_c() => {
            controller.cancel();
            controller.state()
        }
    };
    spinner.finish_and_clear();

    while let Ok(notification) = notifications.try_recv() {
        ctx.notify(&notification);
    }
    if matches!(state, RequestState::Cancelled) {
        ctx.warn(CANCELLED_MESSAGE);
    }

    Ok(state)
}

/// Payload of a settled request
///
/// `None` when the request was cancelled. A failure becomes [`Reported`] so
/// the process exits non-zero after its notification.
pub fn outcome<T>(state: RequestState<T>) -> Result<Option<T>> {
    match state {
        RequestState::Succeeded(output) => Ok(Some(output)),
        RequestState::Failed(error) => Err(Reported::Request(error).into()),
        _ => Ok(None),
    }
}
