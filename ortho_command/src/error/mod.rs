//! Error types produced while assembling and running a command tree.
//!
//! Construction failures surface as [`UsageError`], dispatch failures as
//! [`InvocationError`], and the application entry points wrap both (plus
//! parse and I/O failures) in [`RunError`].

mod helpers;
mod types;

pub use helpers::{cause_chain, is_display_request};
pub use types::{HandlerError, InvocationError, RunError, UsageError};

/// Convenience alias for construction-time results.
pub type UsageResult<T> = Result<T, UsageError>;
