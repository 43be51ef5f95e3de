//! Arena-backed command tree.
//!
//! Nodes live in a flat vector and refer to each other through [`NodeId`];
//! the parent link is a plain back-reference. The builder in this module
//! places every command marker at the path spelled by its name.

mod builder;

use std::sync::Arc;

use clap::ArgMatches;

use crate::discovery::MarkedParam;
use crate::handler::ErasedHandler;
use crate::synth::{ArgumentBinding, Binding, OptionBinding};

pub(crate) use builder::build;

/// Index of a node within its [`CommandTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Handler bound to a node.
pub(crate) struct BoundHandler {
    pub(crate) ident: String,
    pub(crate) handler: ErasedHandler,
    /// Parameters awaiting synthesis; drained by the synthesizer.
    pub(crate) params: Vec<MarkedParam>,
}

/// One command in the hierarchy.
pub struct CommandNode {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) declared: bool,
    pub(crate) handler: Option<BoundHandler>,
    pub(crate) bindings: Vec<Binding>,
    pub(crate) globals: Vec<Arc<OptionBinding>>,
}

impl CommandNode {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            description: None,
            hidden: false,
            parent,
            children: Vec::new(),
            declared: false,
            handler: None,
            bindings: Vec::new(),
            globals: Vec::new(),
        }
    }

    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command aliases.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Help text; parents created implicitly have none.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the command is hidden from help.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Parent node; `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in creation order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Identifier of the bound handler.
    #[must_use]
    pub fn handler_ident(&self) -> Option<&str> {
        self.handler.as_ref().map(|bound| bound.ident.as_str())
    }

    /// Options synthesized from handler parameters.
    pub fn options(&self) -> impl Iterator<Item = &OptionBinding> {
        self.bindings.iter().filter_map(|binding| match binding {
            Binding::Option(option) => Some(option),
            Binding::Argument(_) => None,
        })
    }

    /// Positional arguments synthesized from handler parameters.
    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentBinding> {
        self.bindings.iter().filter_map(|binding| match binding {
            Binding::Argument(argument) => Some(argument),
            Binding::Option(_) => None,
        })
    }

    /// Global options shared with every other node.
    pub fn globals(&self) -> impl Iterator<Item = &OptionBinding> {
        self.globals.iter().map(AsRef::as_ref)
    }

    pub(crate) fn matches_name(&self, segment: &str) -> bool {
        self.name == segment || self.aliases.iter().any(|alias| alias == segment)
    }
}

/// The assembled command hierarchy.
pub struct CommandTree {
    nodes: Vec<CommandNode>,
}

impl CommandTree {
    pub(crate) fn new(root_name: String) -> Self {
        Self {
            nodes: vec![CommandNode::new(root_name, None)],
        }
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root node exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for `id`.
    #[expect(
        clippy::indexing_slicing,
        reason = "node identifiers are only minted by this tree"
    )]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "node identifiers are only minted by this tree"
    )]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut CommandNode {
        &mut self.nodes[id.0]
    }

    /// Identifiers of all nodes in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode::new(name.to_owned(), Some(parent)));
        self.node_mut(parent).children.push(id);
        id
    }

    /// Finds a child of `parent` by name or alias.
    #[must_use]
    pub fn find_child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).matches_name(segment))
    }

    /// Finds a node by its space separated path of names or aliases.
    ///
    /// An empty path yields the root.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<NodeId> {
        crate::naming::segments(path)
            .try_fold(self.root(), |id, segment| self.find_child(id, segment))
    }

    /// Space separated path of `id`; empty for the root.
    #[must_use]
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        names.reverse();
        names.join(" ")
    }

    /// Path used in messages: the program name for the root.
    #[must_use]
    pub fn label(&self, id: NodeId) -> String {
        if id == self.root() {
            self.node(id).name.clone()
        } else {
            self.path(id)
        }
    }

    /// Walks the subcommand chain of `matches` down to the matched node.
    pub(crate) fn resolve_matches<'m>(&self, matches: &'m ArgMatches) -> (NodeId, &'m ArgMatches) {
        let mut id = self.root();
        let mut current = matches;
        while let Some((name, sub)) = current.subcommand() {
            let Some(child) = self
                .node(id)
                .children
                .iter()
                .copied()
                .find(|child| self.node(*child).name == name)
            else {
                break;
            };
            id = child;
            current = sub;
        }
        (id, current)
    }
}

impl std::fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for id in self.node_ids() {
            list.entry(&self.label(id));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests;
