//! Places command markers into the tree.

use tracing::{debug, trace};

use super::{BoundHandler, CommandTree, NodeId};
use crate::discovery::{CommandMethod, MarkedParam};
use crate::error::{UsageError, UsageResult};
use crate::handler::ErasedHandler;
use crate::marker::Descriptor;
use crate::naming::{command_name, segments};
use crate::root::RootPlan;

/// A command marker waiting for placement.
struct Placement {
    segments: Vec<String>,
    marker: Descriptor,
    handler: Option<BoundHandler>,
}

impl Placement {
    fn group(marker: Descriptor) -> UsageResult<Self> {
        let Some(name) = marker.declared_name() else {
            return Err(UsageError::UnnamedMember {
                context: "a program-level command marker".to_owned(),
            });
        };
        Ok(Self {
            segments: segments(name).map(str::to_owned).collect(),
            marker,
            handler: None,
        })
    }

    fn command(command: CommandMethod) -> UsageResult<Self> {
        let CommandMethod {
            ident,
            marker,
            params,
            handler,
        } = command;
        let name = marker
            .declared_name()
            .map_or_else(|| command_name(&ident), str::to_owned);
        let path: Vec<String> = segments(&name).map(str::to_owned).collect();
        if path.is_empty() {
            return Err(UsageError::UnnamedMember {
                context: format!("command handler '{ident}'"),
            });
        }
        Ok(Self {
            segments: path,
            marker,
            handler: Some(bound(ident, handler, params)),
        })
    }
}

fn bound(ident: String, handler: ErasedHandler, params: Vec<MarkedParam>) -> BoundHandler {
    BoundHandler {
        ident,
        handler,
        params,
    }
}

/// Builds the tree for `plan` under a root called `root_name`.
///
/// Placements are processed in ascending path length so parents exist
/// before their children are attached; the sort is stable, so ties keep
/// declaration order with program-level groups first.
///
/// # Errors
///
/// Returns [`UsageError::DuplicateCommand`] for two definitions of one
/// path, [`UsageError::AliasCollision`] for clashing sibling aliases and
/// [`UsageError::EmptyCommand`] for visible commands with neither children
/// nor handler.
pub(crate) fn build(root_name: &str, plan: RootPlan) -> UsageResult<CommandTree> {
    let RootPlan {
        handler,
        description,
        commands,
        groups,
    } = plan;
    let mut tree = CommandTree::new(root_name.to_owned());
    let root = tree.root();
    {
        let node = tree.node_mut(root);
        node.declared = true;
        node.description = (!description.is_empty()).then_some(description);
        node.handler = handler.map(|method| bound(method.ident, method.handler, method.params));
    }

    let mut placements = groups
        .into_iter()
        .map(Placement::group)
        .chain(commands.into_iter().map(Placement::command))
        .collect::<UsageResult<Vec<_>>>()?;
    placements.sort_by_key(|placement| placement.segments.len());

    for placement in placements {
        place(&mut tree, placement)?;
    }
    ensure_populated(&tree)?;
    debug!(nodes = tree.len(), "command tree assembled");
    Ok(tree)
}

fn place(tree: &mut CommandTree, placement: Placement) -> UsageResult<()> {
    let Placement {
        segments,
        marker,
        handler,
    } = placement;
    let mut id = tree.root();
    for segment in &segments {
        id = if let Some(existing) = tree.find_child(id, segment) {
            existing
        } else {
            let created = tree.push_child(id, segment);
            trace!(parent = %tree.label(id), command = %segment, "created command node");
            created
        };
    }

    let node = tree.node(id);
    let duplicate = if handler.is_some() {
        node.handler.is_some()
    } else {
        node.declared
    };
    if duplicate {
        return Err(UsageError::DuplicateCommand {
            path: tree.path(id),
        });
    }
    for alias in marker.alias_list() {
        add_alias(tree, id, alias)?;
    }

    let node = tree.node_mut(id);
    node.declared = true;
    if let Some(description) = marker.description_text() {
        node.description = Some(description.to_owned());
    }
    node.hidden |= marker.is_hidden();
    if let Some(handler) = handler {
        trace!(member = %handler.ident, "bound handler");
        node.handler = Some(handler);
    }
    Ok(())
}

fn add_alias(tree: &mut CommandTree, id: NodeId, alias: &str) -> UsageResult<()> {
    let node = tree.node(id);
    if node.matches_name(alias) {
        return Ok(());
    }
    let clash = node.parent.is_some_and(|parent| {
        tree.node(parent)
            .children
            .iter()
            .any(|sibling| *sibling != id && tree.node(*sibling).matches_name(alias))
    });
    if clash {
        return Err(UsageError::AliasCollision {
            path: tree.path(id),
            alias: alias.to_owned(),
        });
    }
    tree.node_mut(id).aliases.push(alias.to_owned());
    Ok(())
}

fn ensure_populated(tree: &CommandTree) -> UsageResult<()> {
    tree.node_ids()
        .filter(|id| *id != tree.root())
        .find(|id| {
            let node = tree.node(*id);
            node.handler.is_none() && node.children.is_empty() && !node.hidden
        })
        .map_or(Ok(()), |id| {
            Err(UsageError::EmptyCommand {
                path: tree.path(id),
            })
        })
}
