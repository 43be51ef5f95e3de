//! Root command resolution.

use tracing::debug;

use crate::discovery::CommandMethod;
use crate::error::{UsageError, UsageResult};
use crate::marker::{Descriptor, MarkerKind};

/// Outcome of root resolution.
pub(crate) struct RootPlan {
    /// Handler bound to the root node, if any.
    pub(crate) handler: Option<CommandMethod>,
    /// Root description after applying the priority rule.
    pub(crate) description: String,
    /// Remaining command handlers.
    pub(crate) commands: Vec<CommandMethod>,
    /// Program-level command markers declaring groups.
    pub(crate) groups: Vec<Descriptor>,
}

/// Picks the root handler and description.
///
/// Root uniqueness is checked before root existence, so a program with
/// several root markers reports [`UsageError::MultipleRoots`] even when it
/// would also fail for lacking handlers.
///
/// # Errors
///
/// Returns [`UsageError::MultipleRoots`] for more than one root marker and
/// [`UsageError::NoCommands`] when no handler carries a marker.
pub(crate) fn resolve(
    program_markers: Vec<Descriptor>,
    commands: Vec<CommandMethod>,
    fallback: Option<&str>,
) -> UsageResult<RootPlan> {
    let (program_roots, groups): (Vec<_>, Vec<_>) = program_markers
        .into_iter()
        .partition(|marker| marker.kind() == MarkerKind::Root);
    let method_roots = commands
        .iter()
        .filter(|command| command.marker.kind() == MarkerKind::Root)
        .count();
    let count = program_roots.len() + method_roots;
    if count > 1 {
        return Err(UsageError::MultipleRoots { count });
    }
    if commands.is_empty() {
        return Err(UsageError::NoCommands);
    }

    let mut commands = commands;
    let root_index = if method_roots == 1 {
        commands
            .iter()
            .position(|command| command.marker.kind() == MarkerKind::Root)
    } else if program_roots.is_empty() && commands.len() == 1 {
        commands
            .iter()
            .position(|command| command.marker.declared_name().is_none())
    } else {
        None
    };
    let handler = root_index.map(|index| commands.remove(index));
    if let Some(root) = &handler {
        debug!(member = %root.ident, kind = %root.marker.kind(), "root handler selected");
    }

    let description = handler
        .as_ref()
        .and_then(|root| root.marker.description_text())
        .or_else(|| program_roots.first().and_then(Descriptor::description_text))
        .or(fallback)
        .unwrap_or_default()
        .to_owned();

    Ok(RootPlan {
        handler,
        description,
        commands,
        groups,
    })
}
