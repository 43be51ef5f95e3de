//! Serialisable description of an assembled command tree.
//!
//! Tooling and tests use these structures to inspect the surface a program
//! exposes without going through help output.

use serde::Serialize;

use crate::synth::{ArgumentBinding, OptionBinding};
use crate::tree::{CommandTree, NodeId};
use crate::value::Shape;

/// One command and everything beneath it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommandDescription {
    /// Command name; the program name for the root.
    pub name: String,
    /// Space separated path; empty for the root.
    pub path: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub hidden: bool,
    /// Identifier of the bound handler.
    pub handler: Option<String>,
    /// Global options first, then the handler's own options.
    pub options: Vec<OptionDescription>,
    pub arguments: Vec<ArgumentDescription>,
    pub subcommands: Vec<CommandDescription>,
}

/// A named option.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OptionDescription {
    /// Primary switch, such as `--count`.
    pub flag: String,
    pub aliases: Vec<String>,
    pub help_name: Option<String>,
    pub description: Option<String>,
    pub hidden: bool,
    pub required: bool,
    pub global: bool,
    pub has_default: bool,
    pub value: ValueDescription,
}

/// A positional argument.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArgumentDescription {
    pub name: String,
    pub help_name: Option<String>,
    pub description: Option<String>,
    pub hidden: bool,
    pub required: bool,
    pub has_default: bool,
    pub value: ValueDescription,
}

/// Value type and count bounds.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValueDescription {
    /// Rust type name.
    #[serde(rename = "type")]
    pub type_name: String,
    pub shape: ShapeDescription,
    pub min: Option<usize>,
    pub max: Option<usize>,
}

/// Serialisable mirror of [`Shape`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShapeDescription {
    Single,
    Flag,
    Optional,
    Many,
}

impl From<Shape> for ShapeDescription {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Single => Self::Single,
            Shape::Flag => Self::Flag,
            Shape::Optional => Self::Optional,
            Shape::Many => Self::Many,
        }
    }
}

impl CommandDescription {
    pub(crate) fn of(tree: &CommandTree, id: NodeId) -> Self {
        let node = tree.node(id);
        Self {
            name: node.name().to_owned(),
            path: tree.path(id),
            aliases: node.aliases().to_vec(),
            description: node.description().map(str::to_owned),
            hidden: node.is_hidden(),
            handler: node.handler_ident().map(str::to_owned),
            options: node
                .globals()
                .chain(node.options())
                .map(OptionDescription::of)
                .collect(),
            arguments: node.arguments().map(ArgumentDescription::of).collect(),
            subcommands: node
                .children()
                .iter()
                .map(|child| Self::of(tree, *child))
                .collect(),
        }
    }

    /// Finds a descendant by its space separated path of names or aliases.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Self> {
        crate::naming::segments(path).try_fold(self, |command, segment| {
            command.subcommands.iter().find(|sub| {
                sub.name == segment || sub.aliases.iter().any(|alias| alias == segment)
            })
        })
    }

    /// Finds an option on this command by primary switch or alias.
    #[must_use]
    pub fn option(&self, flag: &str) -> Option<&OptionDescription> {
        self.options
            .iter()
            .find(|option| option.flag == flag || option.aliases.iter().any(|alias| alias == flag))
    }

    /// Renders the description as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OptionDescription {
    fn of(option: &OptionBinding) -> Self {
        Self {
            flag: option.flag(),
            aliases: option.alias_flags().collect(),
            help_name: option.help_name().map(str::to_owned),
            description: option.description().map(str::to_owned),
            hidden: option.is_hidden(),
            required: option.is_required(),
            global: option.is_global(),
            has_default: option.has_default(),
            value: ValueDescription::of(option.value(), option.arity()),
        }
    }
}

impl ArgumentDescription {
    fn of(argument: &ArgumentBinding) -> Self {
        Self {
            name: argument.name().to_owned(),
            help_name: argument.help_name().map(str::to_owned),
            description: argument.description().map(str::to_owned),
            hidden: argument.is_hidden(),
            required: argument.is_required(),
            has_default: argument.has_default(),
            value: ValueDescription::of(argument.value(), argument.arity()),
        }
    }
}

impl ValueDescription {
    fn of(value: &crate::value::ValueSpec, arity: Option<crate::Arity>) -> Self {
        Self {
            type_name: value.tag().name().to_owned(),
            shape: value.shape().into(),
            min: arity.map(crate::Arity::min),
            max: arity.and_then(crate::Arity::max),
        }
    }
}
