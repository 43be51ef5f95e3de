//! Errors raised by the hello world demo.
//!
//! Handlers return these so the default exception handler can print them
//! with their causes.

use thiserror::Error;

/// Failures while composing or printing a message.
#[derive(Debug, Error)]
pub enum GreetingError {
    /// The addressee collapsed to nothing after trimming.
    #[error("names must contain visible characters")]
    BlankName,
    /// Greeting punctuation collapsed to nothing after trimming.
    #[error("greeting punctuation must contain visible characters")]
    BlankPunctuation,
    /// The farewell phrase collapsed to nothing after trimming.
    #[error("farewell messages must contain visible characters")]
    BlankFarewell,
    /// A greeting must be printed at least once.
    #[error("repeat count must be greater than zero")]
    ZeroRepeat,
    /// Writing to standard output failed.
    #[error("failed to write the message")]
    Output(#[from] std::io::Error),
}

/// Result alias for the demo.
pub type Result<T> = std::result::Result<T, GreetingError>;
