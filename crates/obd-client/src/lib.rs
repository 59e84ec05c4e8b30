//! OBD2 Diagnostics Client Library
//!
//! Provides a typed HTTP client for the diagnostics backend and implements
//! [`obd_core::DiagnosticsApi`] on top of it, so it can drive the request
//! controllers from `obd-core`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use obd_client::ObdClient;
//! use obd_core::{CodeLookupOp, RequestController, RequestState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ObdClient::new("http://localhost:5000")?;
//!
//!     // Direct call
//!     let lookup = client.search_code("P0420").await?;
//!     println!("{}", lookup.result);
//!
//!     // Through a controller (cancellable, one request at a time)
//!     let controller = RequestController::new(CodeLookupOp::new(Arc::new(client)));
//!     controller.lookup("P0300")?;
//!     if let RequestState::Succeeded(description) = controller.settled().await {
//!         println!("{}", description);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module serves an in-process mock backend:
//!
//! ```rust,ignore
//! use obd_client::testing::{MockBackend, TestServer};
//!
//! let backend = MockBackend::new();
//! let server = TestServer::start(backend.router()).await?;
//! let codes = server.client.list_codes().await?;
//! ```

mod client;
mod error;
pub mod testing;

pub use client::{ObdClient, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
pub use error::{ObdClientError, Result};

// Re-export core types for convenience
pub use obd_core::{CodeListEntry, CodeLookup, DiagnosisRequest, DiagnosisResult};
