//! Request lifecycle controller
//!
//! One [`RequestController`] backs one logical operation (code lookup,
//! diagnosis submission, code list). It enforces at most one call in flight,
//! lets the user cancel that call, and guarantees that a call which resolves
//! after being cancelled, reset or superseded never touches state.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start──▶ InFlight(id) ──▶ Succeeded | Failed | Cancelled ──reset──▶ Idle
//! ```
//!
//! `start()` from a terminal state moves straight to `InFlight`.
//! `start()` while `InFlight` is rejected with
//! [`ControllerError::AlreadyInFlight`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult, ControllerError, SubmitError};
use crate::models::{CodeLookupQuery, DiagnosisRequestDraft, NoticeLevel, Notification};
use crate::operation::{CodeListOp, CodeLookupOp, DiagnosisSubmissionOp, Operation};
use crate::state::{RequestId, RequestState};

/// Default time a request may stay in flight before it fails with
/// [`ApiError::Timeout`]
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const NOTIFICATION_CAPACITY: usize = 16;

/// Cancellation handle of the call currently in flight
struct ActiveRequest {
    id: RequestId,
    token: CancellationToken,
}

/// State shared between the controller and its spawned call
struct Shared<T> {
    state: watch::Sender<RequestState<T>>,
    active: Mutex<Option<ActiveRequest>>,
    notifications: broadcast::Sender<Notification>,
}

impl<T> Shared<T> {
    /// Drop the handle for `id`, returning it if it was the active one
    fn take_active(&self, id: RequestId) -> Option<ActiveRequest> {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|request| request.id == id) {
            active.take()
        } else {
            None
        }
    }

    fn abort(&self, id: RequestId) {
        if let Some(request) = self.take_active(id) {
            request.token.cancel();
        }
    }
}

/// Owns the lifecycle of one kind of request
pub struct RequestController<O: Operation> {
    operation: Arc<O>,
    shared: Arc<Shared<O::Output>>,
    timeout: Option<Duration>,
}

impl<O: Operation> RequestController<O> {
    /// Create an idle controller with the default timeout
    pub fn new(operation: O) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        Self {
            operation: Arc::new(operation),
            shared: Arc::new(Shared {
                state,
                active: Mutex::new(None),
                notifications,
            }),
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Set the in-flight timeout (`None` waits forever)
    ///
    /// The transport behind the [`DiagnosticsApi`](crate::DiagnosticsApi) may
    /// enforce a deadline of its own; whichever expires first fails the call
    /// with [`ApiError::Timeout`].
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn operation(&self) -> &O {
        &self.operation
    }

    /// Snapshot of the current state
    pub fn state(&self) -> RequestState<O::Output> {
        self.shared.state.borrow().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.shared.state.borrow().is_in_flight()
    }

    /// Receiver that observes every state transition
    pub fn watch(&self) -> watch::Receiver<RequestState<O::Output>> {
        self.shared.state.subscribe()
    }

    /// Receiver for success/error notifications
    ///
    /// Exactly one notification is sent per success or failure; none for
    /// cancellation.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.shared.notifications.subscribe()
    }

    /// Issue a new call
    ///
    /// Must be called from within a tokio runtime; the call runs on a
    /// spawned task.
    pub fn start(&self, input: O::Input) -> Result<RequestId, ControllerError> {
        let name = self.operation.name();
        let runtime = Handle::try_current().map_err(|_| ControllerError::NoRuntime(name))?;

        let id = RequestId::new();
        let token = CancellationToken::new();
        let mut busy = None;

        self.shared.state.send_if_modified(|state| {
            if let RequestState::InFlight(current) = state {
                busy = Some(*current);
                return false;
            }
            *self.shared.active.lock() = Some(ActiveRequest {
                id,
                token: token.clone(),
            });
            *state = RequestState::InFlight(id);
            true
        });

        if let Some(request_id) = busy {
            warn!(operation = name, %request_id, "Rejected start: request already in flight");
            return Err(ControllerError::AlreadyInFlight {
                operation: name,
                request_id,
            });
        }

        debug!(operation = name, request_id = %id, "Request started");

        let operation = Arc::clone(&self.operation);
        let shared = Arc::clone(&self.shared);
        let timeout = self.timeout;

        runtime.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(operation = operation.name(), request_id = %id, "Request aborted");
                    return;
                }
                result = with_timeout(operation.execute(input), timeout) => result,
            };

            if matches!(result, Err(ApiError::Timeout)) {
                token.cancel();
            }

            settle(operation.as_ref(), &shared, id, result);
        });

        Ok(id)
    }

    /// Cancel the call in flight
    ///
    /// Returns `false` (and does nothing) when no call is in flight.
    pub fn cancel(&self) -> bool {
        let mut cancelled = None;

        self.shared.state.send_if_modified(|state| {
            if let RequestState::InFlight(id) = state {
                cancelled = Some(*id);
                *state = RequestState::Cancelled;
                true
            } else {
                false
            }
        });

        match cancelled {
            Some(id) => {
                self.shared.abort(id);
                debug!(operation = self.operation.name(), request_id = %id, "Request cancelled");
                true
            }
            None => false,
        }
    }

    /// Return to `Idle`, clearing any result or error
    ///
    /// No-op when already idle. A call still in flight is cancelled silently.
    pub fn reset(&self) {
        let mut aborted = None;

        self.shared.state.send_if_modified(|state| match state {
            RequestState::Idle => false,
            RequestState::InFlight(id) => {
                aborted = Some(*id);
                *state = RequestState::Idle;
                true
            }
            _ => {
                *state = RequestState::Idle;
                true
            }
        });

        if let Some(id) = aborted {
            self.shared.abort(id);
            debug!(operation = self.operation.name(), request_id = %id, "Request discarded by reset");
        }
    }

    /// Wait until no call is in flight and return the resulting state
    pub async fn settled(&self) -> RequestState<O::Output> {
        let mut rx = self.shared.state.subscribe();
        let settled = rx.wait_for(|state| !state.is_in_flight()).await;
        match settled {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }
}

impl RequestController<CodeLookupOp> {
    /// Look up a code
    pub fn lookup(&self, code: impl Into<String>) -> Result<RequestId, ControllerError> {
        self.start(CodeLookupQuery::new(code))
    }
}

impl RequestController<DiagnosisSubmissionOp> {
    /// Validate a draft and submit it
    ///
    /// An invalid draft never reaches the network.
    pub fn submit(&self, draft: &DiagnosisRequestDraft) -> Result<RequestId, SubmitError> {
        let request = draft.to_request().map_err(SubmitError::Invalid)?;
        Ok(self.start(request)?)
    }
}

impl RequestController<CodeListOp> {
    /// Load the code list
    pub fn load(&self) -> Result<RequestId, ControllerError> {
        self.start(())
    }
}

impl<O: Operation> Drop for RequestController<O> {
    fn drop(&mut self) {
        if let Some(request) = self.shared.active.lock().take() {
            request.token.cancel();
        }
    }
}

async fn with_timeout<F, T>(call: F, timeout: Option<Duration>) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(ApiError::Timeout)),
        None => call.await,
    }
}

/// Apply a completion if `id` is still the call in flight
///
/// Returns whether the completion was applied. Completions for a cancelled,
/// reset or superseded call are dropped without a notification.
fn settle<O: Operation>(
    operation: &O,
    shared: &Shared<O::Output>,
    id: RequestId,
    result: ApiResult<O::Output>,
) -> bool {
    let notice = match &result {
        Ok(output) => operation.success_notice(output),
        Err(error) => operation.failure_notice(error),
    };
    let level = notice.level;
    let failure = result.as_ref().err().map(ToString::to_string);
    let mut result = Some(result);
    let mut notification = Some(Notification::new(operation.name(), id, notice));

    // The notification goes out under the state lock so anyone who observes
    // the terminal state can already receive it.
    let applied = shared.state.send_if_modified(|state| {
        if state.in_flight_id() != Some(id) {
            return false;
        }
        match result.take() {
            Some(Ok(output)) => *state = RequestState::Succeeded(output),
            Some(Err(error)) => *state = RequestState::Failed(error),
            None => return false,
        }
        if let Some(notification) = notification.take() {
            let _ = shared.notifications.send(notification);
        }
        true
    });

    if !applied {
        debug!(operation = operation.name(), request_id = %id, "Discarding stale completion");
        return false;
    }

    shared.take_active(id);

    match level {
        NoticeLevel::Success => {
            info!(operation = operation.name(), request_id = %id, "Request succeeded")
        }
        NoticeLevel::Error => warn!(
            operation = operation.name(),
            request_id = %id,
            error = failure.as_deref().unwrap_or_default(),
            "Request failed"
        ),
    }
    true
}
