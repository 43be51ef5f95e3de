//! Error enums for construction, dispatch and the entry points.

use std::error::Error as StdError;

use thiserror::Error;

use crate::marker::MarkerKind;

/// Boxed failure raised by a command handler.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

/// Fatal errors raised while assembling the command tree.
///
/// Every variant indicates a mistake in how the program declared its
/// commands. They are reported once, from [`crate::Program::build`], and the
/// program must not serve commands afterwards.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum UsageError {
    /// More than one root marker was declared.
    #[error("found {count} root command markers; at most one is allowed")]
    MultipleRoots {
        /// Number of root markers counted across program and handler level.
        count: usize,
    },

    /// No handler carries a command or root marker.
    #[error("no command handlers were declared")]
    NoCommands,

    /// A single member carries more than one marker.
    #[error("'{member}' carries {count} markers; a member may carry at most one")]
    MultipleMarkers {
        /// Identifier of the offending member.
        member: String,
        /// Number of markers found.
        count: usize,
    },

    /// A marker was attached to a member that cannot play its role.
    #[error("'{member}' cannot carry a marker of kind {kind}")]
    MisplacedMarker {
        /// Identifier of the offending member.
        member: String,
        /// Kind of the misplaced marker.
        kind: MarkerKind,
    },

    /// Two handlers were declared for the same command path.
    #[error("multiple definitions of command '{path}'")]
    DuplicateCommand {
        /// Space separated command path.
        path: String,
    },

    /// An alias clashes with a sibling command name or alias.
    #[error("alias '{alias}' of command '{path}' is already used by a sibling")]
    AliasCollision {
        /// Space separated command path.
        path: String,
        /// Clashing alias.
        alias: String,
    },

    /// A visible command ended up with no subcommands nor handler.
    #[error("command '{path}' has no subcommands nor handler")]
    EmptyCommand {
        /// Space separated command path.
        path: String,
    },

    /// Global option storage cannot be written.
    #[error("global option '{member}' is bound to read-only storage")]
    ReadOnlyGlobal {
        /// Identifier of the global member.
        member: String,
    },

    /// Global options are shared by every command and cannot be required.
    #[error("global option '{member}' cannot be marked required")]
    RequiredGlobal {
        /// Identifier of the global member.
        member: String,
    },

    /// Neither an explicit name nor an identifier is available.
    #[error("cannot derive a name for {context}")]
    UnnamedMember {
        /// Human readable location of the unnamed member.
        context: String,
    },

    /// An explicit option name cannot be expressed as a switch.
    #[error("invalid option name '{name}'")]
    InvalidOptionName {
        /// Offending name.
        name: String,
    },

    /// A declared arity has a lower bound above its upper bound.
    #[error("arity of '{member}' is invalid: minimum {min} exceeds maximum {max}")]
    InvalidArity {
        /// Identifier of the member.
        member: String,
        /// Lower bound.
        min: usize,
        /// Upper bound.
        max: usize,
    },

    /// A declared arity admits no values on a member that takes a value.
    #[error("arity of '{member}' admits no values")]
    ZeroArity {
        /// Identifier of the member.
        member: String,
    },

    /// An argument may be omitted yet has neither a default nor an absent
    /// value to stand in for it.
    #[error("argument '{member}' may be omitted but has no default; declare one or use an Option")]
    MissingFallback {
        /// Identifier of the member.
        member: String,
    },

    /// Two options or arguments on one command share a name.
    #[error("command '{command}' declares '{name}' more than once")]
    DuplicateOption {
        /// Space separated command path.
        command: String,
        /// Clashing switch or argument name.
        name: String,
    },

    /// A positional argument cannot appear where it was declared.
    #[error(
        "argument '{argument}' of command '{command}' must come last: only the \
         final argument may be optional or take several values"
    )]
    PositionalOrder {
        /// Space separated command path.
        command: String,
        /// Offending argument.
        argument: String,
    },

    /// The declared parameter list does not match the handler arity.
    #[error("handler '{member}' takes {expected} parameters but {declared} were declared")]
    ParameterCount {
        /// Handler identifier.
        member: String,
        /// Number of declared parameters.
        declared: usize,
        /// Number of parameters the handler accepts.
        expected: usize,
    },

    /// A declared parameter type differs from the handler signature.
    #[error(
        "parameter {position} of handler '{member}' is declared as `{declared}` \
         but the handler expects `{expected}`"
    )]
    ParameterType {
        /// Handler identifier.
        member: String,
        /// Zero based parameter position.
        position: usize,
        /// Declared type name.
        declared: &'static str,
        /// Handler parameter type name.
        expected: &'static str,
    },
}

/// Errors raised while dispatching a parsed command line to its handler.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvocationError {
    /// The matched command has no handler bound.
    #[error("command '{path}' has no handler")]
    NoHandler {
        /// Space separated command path.
        path: String,
    },

    /// A value was neither parsed, defaulted nor inherently absent.
    #[error("no value supplied for '{name}'")]
    MissingValue {
        /// Option or argument name.
        name: String,
    },

    /// A resolved value could not be handed to the handler as its type.
    #[error("value for parameter {position} is not a `{expected}`")]
    ValueType {
        /// Zero based parameter position.
        position: usize,
        /// Type the handler expected.
        expected: &'static str,
    },

    /// The parse result could not yield a value.
    #[error("failed to read '{name}' from the parse result: {source}")]
    Matches {
        /// Option or argument name.
        name: String,
        /// Underlying clap failure.
        #[source]
        source: clap::parser::MatchesError,
    },

    /// Global option storage rejected the parsed value.
    #[error("failed to store global option '{name}'")]
    GlobalWrite {
        /// Global option name.
        name: String,
    },

    /// The handler itself failed.
    #[error("command handler failed")]
    Handler(#[source] HandlerError),
}

impl InvocationError {
    /// Returns `true` when a [`crate::Cancelled`] error sits anywhere in the
    /// source chain.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        super::cause_chain(self).any(|cause| cause.is::<crate::Cancelled>())
    }
}

/// Errors surfaced by [`crate::App::run`] and [`crate::App::run_async`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// Command-line parsing failed and error reporting is disabled.
    #[error("failed to parse command-line arguments: {0}")]
    Parse(#[from] Box<clap::Error>),

    /// Dispatch failed and no exception handler is installed.
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// Writing to an output sink failed.
    #[error("failed to write to output: {0}")]
    Io(#[from] std::io::Error),
}
