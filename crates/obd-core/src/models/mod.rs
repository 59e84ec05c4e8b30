//! Shared data models for the diagnostics front end

mod codes;
mod diagnosis;
mod draft;
mod notification;

pub use codes::*;
pub use diagnosis::*;
pub use draft::*;
pub use notification::*;
