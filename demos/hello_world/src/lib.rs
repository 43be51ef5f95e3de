//! Hello world demo for `ortho_command`.
//!
//! Declares a root greeting, a `greet` command with options and an
//! asynchronous `take leave` command, all sharing two global options.

pub mod commands;
pub mod error;
pub mod message;

pub use commands::program;
