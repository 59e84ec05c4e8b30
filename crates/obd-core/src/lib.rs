//! obd-core - Core types and request lifecycle for the OBD2 diagnostics front end
//!
//! This crate holds everything that does not speak HTTP:
//!
//! - [`models`]: drafts, wire bodies and backend payloads
//! - [`validation`]: field-level checks run before a diagnosis is submitted
//! - [`DiagnosticsApi`]: the seam an HTTP client (or a test double) implements
//! - [`operation`]: the three backend calls the front end can make
//! - [`RequestController`]: one-in-flight request state machine with
//!   cancellation and a stale-completion guard
//! - [`report`]: fixed-layout text export of a finished diagnosis
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use obd_core::{CodeLookupOp, RequestController, RequestState};
//!
//! let lookup = RequestController::new(CodeLookupOp::new(api.clone()));
//! lookup.lookup("P0420")?;
//!
//! if let RequestState::Succeeded(description) = lookup.settled().await {
//!     println!("{description}");
//! }
//! ```

pub mod api;
pub mod controller;
pub mod error;
pub mod models;
pub mod operation;
pub mod report;
pub mod state;
pub mod validation;

pub use api::DiagnosticsApi;
pub use controller::{RequestController, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ApiError, ApiResult, ControllerError, SubmitError};
pub use models::*;
pub use operation::{CodeListOp, CodeLookupOp, DiagnosisSubmissionOp, Operation};
pub use report::DiagnosisReport;
pub use state::{RequestId, RequestState};
pub use validation::{validate, Field, ValidationResult};
