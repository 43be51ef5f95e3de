//! Option and argument synthesis.
//!
//! Each handler parameter becomes an [`OptionBinding`] (the default when it
//! carries no marker) or an [`ArgumentBinding`] (only through an explicit
//! argument marker). Bindings own their lazy default providers and render
//! themselves as clap arguments.

use std::collections::HashSet;

use clap::builder::ValueRange;
use clap::{Arg, ArgAction, ArgMatches};
use tracing::{debug, trace};

use crate::discovery::{MarkedParam, param_label};
use crate::error::{InvocationError, UsageError, UsageResult};
use crate::marker::{Arity, Descriptor, MarkerKind};
use crate::naming::{Switch, kebab_name, option_flag};
use crate::tree::{CommandTree, NodeId};
use crate::value::{AnyValue, DefaultProvider, Shape, ValueSpec};

/// A named option attached to a command node.
pub struct OptionBinding {
    switch: Switch,
    aliases: Vec<Switch>,
    help_name: Option<String>,
    description: Option<String>,
    hidden: bool,
    required: bool,
    global: bool,
    arity: Option<Arity>,
    value: ValueSpec,
    default: Option<DefaultProvider>,
}

impl OptionBinding {
    /// Primary switch, such as `--count`.
    #[must_use]
    pub fn flag(&self) -> String {
        self.switch.to_string()
    }

    /// Alias switches.
    pub fn alias_flags(&self) -> impl Iterator<Item = String> {
        self.aliases.iter().map(ToString::to_string)
    }

    /// Value placeholder shown in help.
    #[must_use]
    pub fn help_name(&self) -> Option<&str> {
        self.help_name.as_deref()
    }

    /// Help text.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the option is hidden from help.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the engine rejects a command line omitting the option.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the option is shared by every command.
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.global
    }

    /// Whether a lazy default is installed.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Declared arity override.
    #[must_use]
    pub const fn arity(&self) -> Option<Arity> {
        self.arity
    }

    /// Erased value type.
    #[must_use]
    pub const fn value(&self) -> &ValueSpec {
        &self.value
    }

    pub(crate) const fn mark_global(&mut self) {
        self.global = true;
    }

    pub(crate) fn switches(&self) -> impl Iterator<Item = &Switch> {
        std::iter::once(&self.switch).chain(&self.aliases)
    }

    fn id(&self) -> String {
        self.flag()
    }

    pub(crate) fn resolve(&self, matches: &ArgMatches) -> Result<AnyValue, InvocationError> {
        resolve_value(matches, &self.id(), self.value, self.default.as_ref())
    }

    pub(crate) fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id())
            .required(self.required)
            .hide(self.hidden)
            .global(self.global);
        arg = match &self.switch {
            Switch::Short(short) => arg.short(*short),
            Switch::Long(long) => arg.long(long.clone()),
        };
        for alias in &self.aliases {
            arg = match alias {
                Switch::Short(short) => arg.visible_short_alias(*short),
                Switch::Long(long) => arg.visible_alias(long.clone()),
            };
        }
        if let Some(help_name) = &self.help_name {
            arg = arg.value_name(help_name.clone());
        }
        if let Some(description) = &self.description {
            arg = arg.help(description.clone());
        }
        match self.value.shape() {
            Shape::Flag => arg.action(ArgAction::SetTrue),
            Shape::Many => with_arity(
                arg.action(ArgAction::Append)
                    .value_parser(self.value.parser()),
                self.arity,
            ),
            Shape::Single | Shape::Optional => with_arity(
                arg.action(ArgAction::Set)
                    .value_parser(self.value.parser()),
                self.arity,
            ),
        }
    }
}

impl std::fmt::Debug for OptionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionBinding")
            .field("flag", &self.flag())
            .field("required", &self.required)
            .field("global", &self.global)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// A positional argument attached to a command node.
pub struct ArgumentBinding {
    name: String,
    help_name: Option<String>,
    description: Option<String>,
    hidden: bool,
    required: bool,
    arity: Option<Arity>,
    value: ValueSpec,
    default: Option<DefaultProvider>,
}

impl ArgumentBinding {
    /// Argument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value placeholder shown in help.
    #[must_use]
    pub fn help_name(&self) -> Option<&str> {
        self.help_name.as_deref()
    }

    /// Help text.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the argument is hidden from help.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the engine rejects a command line omitting the argument.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Whether a lazy default is installed.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Declared arity override.
    #[must_use]
    pub const fn arity(&self) -> Option<Arity> {
        self.arity
    }

    /// Erased value type.
    #[must_use]
    pub const fn value(&self) -> &ValueSpec {
        &self.value
    }

    /// Whether the argument may consume more than one token.
    #[must_use]
    pub fn takes_many(&self) -> bool {
        self.value.shape() == Shape::Many || self.arity.is_some_and(Arity::is_multiple)
    }

    pub(crate) fn resolve(&self, matches: &ArgMatches) -> Result<AnyValue, InvocationError> {
        resolve_value(matches, &self.name, self.value, self.default.as_ref())
    }

    pub(crate) fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .required(self.required)
            .hide(self.hidden)
            .value_name(
                self.help_name
                    .clone()
                    .unwrap_or_else(|| self.name.to_uppercase()),
            )
            .value_parser(self.value.parser());
        if let Some(description) = &self.description {
            arg = arg.help(description.clone());
        }
        if self.value.shape() == Shape::Many {
            let arity = self.arity.or(Some(Arity::at_least(1)));
            with_arity(arg.action(ArgAction::Append), arity)
        } else {
            with_arity(arg.action(ArgAction::Set), self.arity)
        }
    }
}

impl std::fmt::Debug for ArgumentBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentBinding")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// A parameter binding in declaration order.
#[derive(Debug)]
pub enum Binding {
    /// Named option.
    Option(OptionBinding),
    /// Positional argument.
    Argument(ArgumentBinding),
}

impl Binding {
    pub(crate) fn resolve(&self, matches: &ArgMatches) -> Result<AnyValue, InvocationError> {
        match self {
            Self::Option(option) => option.resolve(matches),
            Self::Argument(argument) => argument.resolve(matches),
        }
    }

    pub(crate) fn to_arg(&self) -> Arg {
        match self {
            Self::Option(option) => option.to_arg(),
            Self::Argument(argument) => argument.to_arg(),
        }
    }
}

fn with_arity(arg: Arg, arity: Option<Arity>) -> Arg {
    match arity {
        Some(arity) => arg.num_args(value_range(arity)),
        None => arg,
    }
}

fn value_range(arity: Arity) -> ValueRange {
    match arity.max() {
        Some(max) => ValueRange::new(arity.min()..=max),
        None => ValueRange::new(arity.min()..),
    }
}

/// Parsed value, then lazy default, then the type's absent value.
fn resolve_value(
    matches: &ArgMatches,
    id: &str,
    value: ValueSpec,
    default: Option<&DefaultProvider>,
) -> Result<AnyValue, InvocationError> {
    let parsed = value
        .extract(matches, id)
        .map_err(|source| InvocationError::Matches {
            name: id.to_owned(),
            source,
        })?;
    if let Some(parsed) = parsed {
        return Ok(parsed);
    }
    if let Some(provider) = default {
        trace!(name = id, "using default value");
        return Ok(provider());
    }
    value.absent().ok_or_else(|| InvocationError::MissingValue {
        name: id.to_owned(),
    })
}

/// Validates a declared arity. Only flags may declare an arity that admits
/// no values.
fn checked_arity(
    label: &str,
    marker: Option<&Descriptor>,
    flag: bool,
) -> UsageResult<Option<Arity>> {
    match marker.and_then(Descriptor::arity_override) {
        Some(arity) if arity.is_inverted() => Err(UsageError::InvalidArity {
            member: label.to_owned(),
            min: arity.min(),
            max: arity.max().unwrap_or_default(),
        }),
        Some(arity) if arity.max() == Some(0) && !flag => Err(UsageError::ZeroArity {
            member: label.to_owned(),
        }),
        arity => Ok(arity),
    }
}

fn derive_name(
    label: &str,
    ident: Option<&str>,
    marker: Option<&Descriptor>,
) -> UsageResult<String> {
    marker
        .and_then(Descriptor::declared_name)
        .map(str::to_owned)
        .or_else(|| ident.map(kebab_name).filter(|name| !name.is_empty()))
        .ok_or_else(|| UsageError::UnnamedMember {
            context: format!("'{label}'"),
        })
}

/// Builds an option binding.
///
/// An explicitly required option installs no default. Otherwise a declared
/// default becomes the lazy fallback, and an option without one is required
/// unless its type has a natural absent value.
pub(crate) fn synthesize_option(
    label: &str,
    ident: Option<&str>,
    marker: Option<&Descriptor>,
    value: ValueSpec,
    default: Option<DefaultProvider>,
) -> UsageResult<OptionBinding> {
    let name = derive_name(label, ident, marker)?;
    let switch = Switch::parse(&option_flag(&name))?;
    let aliases = marker
        .map(Descriptor::alias_list)
        .unwrap_or_default()
        .iter()
        .map(|alias| Switch::parse(&option_flag(alias)))
        .collect::<UsageResult<Vec<_>>>()?;
    let arity = checked_arity(label, marker, value.shape() == Shape::Flag)?;
    let explicit = marker.is_some_and(Descriptor::is_required);
    let (required, default) = if explicit {
        (true, None)
    } else {
        let required = default.is_none() && !value.has_absent();
        (required, default)
    };
    trace!(member = label, option = %switch, required, "synthesized option");
    Ok(OptionBinding {
        switch,
        aliases,
        help_name: marker
            .and_then(Descriptor::help_name_value)
            .map(str::to_owned),
        description: marker
            .and_then(Descriptor::description_text)
            .map(str::to_owned),
        hidden: marker.is_some_and(Descriptor::is_hidden),
        required,
        global: false,
        arity,
        value,
        default,
    })
}

/// Builds an argument binding.
///
/// Absence of a default never forces an argument to be required on its
/// own: the argument is required when its arity demands at least one value
/// and neither a default nor an absent value can stand in.
pub(crate) fn synthesize_argument(
    label: &str,
    ident: Option<&str>,
    marker: &Descriptor,
    value: ValueSpec,
    default: Option<DefaultProvider>,
) -> UsageResult<ArgumentBinding> {
    let name = derive_name(label, ident, Some(marker))?;
    let arity = checked_arity(label, Some(marker), false)?;
    let needs_value = arity.is_none_or(|arity| arity.min() >= 1);
    let required =
        marker.is_required() || (default.is_none() && !value.has_absent() && needs_value);
    if !required && default.is_none() && !value.has_absent() {
        return Err(UsageError::MissingFallback {
            member: label.to_owned(),
        });
    }
    trace!(member = label, argument = %name, required, "synthesized argument");
    Ok(ArgumentBinding {
        name,
        help_name: marker.help_name_value().map(str::to_owned),
        description: marker.description_text().map(str::to_owned),
        hidden: marker.is_hidden(),
        required,
        arity,
        value,
        default,
    })
}

fn synthesize_param(method: &str, param: MarkedParam) -> UsageResult<Binding> {
    let MarkedParam {
        ident,
        position,
        marker,
        value,
        default,
    } = param;
    let label = param_label(method, ident.as_deref(), position);
    match marker {
        Some(marker) if marker.kind() == MarkerKind::Argument => {
            synthesize_argument(&label, ident.as_deref(), &marker, value, default)
                .map(Binding::Argument)
        }
        marker => synthesize_option(&label, ident.as_deref(), marker.as_ref(), value, default)
            .map(Binding::Option),
    }
}

/// Synthesizes bindings for every bound handler and checks argument order.
///
/// # Errors
///
/// Returns the first [`UsageError`] raised while deriving names, parsing
/// switches, validating arities or ordering arguments.
pub(crate) fn synthesize(tree: &mut CommandTree) -> UsageResult<()> {
    for id in tree.node_ids() {
        let Some(bound) = tree.node_mut(id).handler.as_mut() else {
            continue;
        };
        let method = bound.ident.clone();
        let params = std::mem::take(&mut bound.params);
        let bindings = params
            .into_iter()
            .map(|param| synthesize_param(&method, param))
            .collect::<UsageResult<Vec<_>>>()?;
        tree.node_mut(id).bindings = bindings;
        check_positionals(tree, id)?;
    }
    debug!("options and arguments synthesized");
    Ok(())
}

/// Only the final argument may be optional or take several values, so
/// the engine can assign tokens to arguments unambiguously.
fn check_positionals(tree: &CommandTree, id: NodeId) -> UsageResult<()> {
    let arguments: Vec<&ArgumentBinding> = tree.node(id).arguments().collect();
    let Some((_, leading)) = arguments.split_last() else {
        return Ok(());
    };
    match leading
        .iter()
        .find(|argument| argument.takes_many() || !argument.is_required())
    {
        Some(argument) => Err(UsageError::PositionalOrder {
            command: tree.label(id),
            argument: argument.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Rejects switch or argument names used twice on one command, counting
/// global options and the engine's reserved help and version switches.
/// Arguments share the switch namespace since both become clap ids.
pub(crate) fn check_namespace(
    tree: &CommandTree,
    reserve_help: bool,
    reserve_version: bool,
) -> UsageResult<()> {
    for id in tree.node_ids() {
        let node = tree.node(id);
        let mut switches: HashSet<String> = HashSet::new();
        if reserve_help {
            switches.extend(["-h".to_owned(), "--help".to_owned()]);
        }
        if reserve_version && id == tree.root() {
            switches.extend(["-V".to_owned(), "--version".to_owned()]);
        }
        let options = node.globals().chain(node.options());
        for switch in options.flat_map(|option| option.switches()) {
            let flag = switch.to_string();
            if !switches.insert(flag.clone()) {
                return Err(UsageError::DuplicateOption {
                    command: tree.label(id),
                    name: flag,
                });
            }
        }
        for argument in node.arguments() {
            if !switches.insert(argument.name.clone()) {
                return Err(UsageError::DuplicateOption {
                    command: tree.label(id),
                    name: argument.name.clone(),
                });
            }
        }
    }
    Ok(())
}
