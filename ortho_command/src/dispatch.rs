//! Dispatcher and invocation adapter.
//!
//! One invocation moves through
//! `Idle -> BeforeHook -> Invoking -> AfterHook -> Done`, or ends in
//! `Faulted` when resolving values or running the handler fails. The
//! [`InvocationContext`] carries the matched command, the parse result and
//! the published exit code through those stages; it is created per run and
//! never shared between runs.

use clap::ArgMatches;
use tracing::{debug, trace};

use crate::engine::EngineSettings;
use crate::error::InvocationError;
use crate::globals::GlobalInitializer;
use crate::program::InvocationHook;
use crate::tree::{CommandNode, CommandTree, NodeId};

/// Lifecycle stage of an invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// The command has been matched but nothing has run.
    Idle,
    /// Global initializers and before-invocation hooks are running.
    BeforeHook,
    /// Values are being resolved and the handler is running.
    Invoking,
    /// After-invocation hooks are running.
    AfterHook,
    /// The invocation completed.
    Done,
    /// Resolving values or the handler failed.
    Faulted,
}

/// Per-invocation state handed to hooks.
pub struct InvocationContext<'a> {
    tree: &'a CommandTree,
    command: NodeId,
    matches: &'a ArgMatches,
    settings: EngineSettings,
    stage: Stage,
    exit_code: i32,
}

impl<'a> InvocationContext<'a> {
    pub(crate) const fn new(
        tree: &'a CommandTree,
        command: NodeId,
        matches: &'a ArgMatches,
        settings: EngineSettings,
    ) -> Self {
        Self {
            tree,
            command,
            matches,
            settings,
            stage: Stage::Idle,
            exit_code: 0,
        }
    }

    /// The matched command node.
    #[must_use]
    pub fn command(&self) -> &'a CommandNode {
        self.tree.node(self.command)
    }

    /// Identifier of the matched command node.
    #[must_use]
    pub const fn command_id(&self) -> NodeId {
        self.command
    }

    /// Space separated path of the matched command; empty for the root.
    #[must_use]
    pub fn command_path(&self) -> String {
        self.tree.path(self.command)
    }

    /// Parse result for the matched command.
    #[must_use]
    pub const fn matches(&self) -> &'a ArgMatches {
        self.matches
    }

    /// Engine settings in effect.
    #[must_use]
    pub const fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Current lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Published exit code; zero until the handler returns.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Overwrites the published exit code.
    pub const fn set_exit_code(&mut self, code: i32) {
        self.exit_code = code;
    }

    fn enter(&mut self, stage: Stage) {
        trace!(
            from = ?self.stage,
            to = ?stage,
            command = %self.tree.label(self.command),
            "stage transition"
        );
        self.stage = stage;
    }
}

/// Hooks and initializers run around each handler.
pub(crate) struct Lifecycle<'a> {
    pub(crate) initializers: &'a [GlobalInitializer],
    pub(crate) before: &'a [InvocationHook],
    pub(crate) after: &'a [InvocationHook],
}

/// Runs the matched handler inside `ctx`.
///
/// Failures move the context to [`Stage::Faulted`] and skip the
/// after-invocation hooks. On success the handler's exit code is published
/// before the after hooks run and re-read afterwards.
///
/// # Errors
///
/// Returns [`InvocationError::NoHandler`] when the node has no handler,
/// and any failure raised while writing globals, resolving values or
/// running the handler.
pub(crate) async fn invoke(
    ctx: &mut InvocationContext<'_>,
    lifecycle: &Lifecycle<'_>,
) -> Result<i32, InvocationError> {
    let node = ctx.command();
    let Some(bound) = node.handler.as_ref() else {
        return Err(InvocationError::NoHandler {
            path: ctx.tree.label(ctx.command),
        });
    };

    ctx.enter(Stage::BeforeHook);
    for initializer in lifecycle.initializers {
        if let Err(err) = initializer.apply(ctx.matches) {
            ctx.enter(Stage::Faulted);
            return Err(err);
        }
    }
    for hook in lifecycle.before {
        hook(ctx);
    }

    ctx.enter(Stage::Invoking);
    debug!(member = %bound.ident, command = %ctx.tree.label(ctx.command), "invoking handler");
    let resolved = resolve_values(node, ctx.matches).and_then(|values| bound.handler.call(values));
    let outcome = match resolved {
        Ok(outcome) => outcome.resolve().await.map_err(InvocationError::Handler),
        Err(err) => Err(err),
    };
    let code = match outcome {
        Ok(code) => code,
        Err(err) => {
            ctx.enter(Stage::Faulted);
            return Err(err);
        }
    };

    ctx.exit_code = code;
    ctx.enter(Stage::AfterHook);
    for hook in lifecycle.after {
        hook(ctx);
    }
    ctx.enter(Stage::Done);
    debug!(exit_code = ctx.exit_code, "handler finished");
    Ok(ctx.exit_code)
}

fn resolve_values(
    node: &CommandNode,
    matches: &ArgMatches,
) -> Result<Vec<crate::value::AnyValue>, InvocationError> {
    node.bindings
        .iter()
        .map(|binding| binding.resolve(matches))
        .collect()
}
