//! Declarative markers describing the command-line role of a member.
//!
//! A [`Descriptor`] is the data carried by one marker. Handlers take
//! [`MarkerKind::Root`] or [`MarkerKind::Command`] markers, handler
//! parameters take [`MarkerKind::Option`] or [`MarkerKind::Argument`]
//! markers, and global storage takes [`MarkerKind::Option`] markers.

use std::fmt;
use std::ops::{RangeFrom, RangeInclusive};

/// Role declared by a marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// The root command of the program.
    Root,
    /// A command or subcommand.
    Command,
    /// A named option.
    Option,
    /// A positional argument.
    Argument,
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Root => "root",
            Self::Command => "command",
            Self::Option => "option",
            Self::Argument => "argument",
        })
    }
}

/// Bounds on the number of values an option or argument accepts.
///
/// An absent upper bound means "unbounded".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arity {
    min: usize,
    max: Option<usize>,
}

impl Arity {
    /// Creates an arity with explicit bounds.
    #[must_use]
    pub const fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Accepts exactly `count` values.
    #[must_use]
    pub const fn exactly(count: usize) -> Self {
        Self::new(count, Some(count))
    }

    /// Accepts `min` or more values.
    #[must_use]
    pub const fn at_least(min: usize) -> Self {
        Self::new(min, None)
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(self) -> usize {
        self.min
    }

    /// Upper bound, if any.
    #[must_use]
    pub const fn max(self) -> Option<usize> {
        self.max
    }

    /// Returns `true` when the bounds admit more than one value.
    #[must_use]
    pub fn is_multiple(self) -> bool {
        self.max.is_none_or(|max| max > 1)
    }

    /// Returns `true` when the lower bound exceeds the upper bound.
    #[must_use]
    pub fn is_inverted(self) -> bool {
        self.max.is_some_and(|max| self.min > max)
    }
}

impl From<usize> for Arity {
    fn from(count: usize) -> Self {
        Self::exactly(count)
    }
}

impl From<RangeInclusive<usize>> for Arity {
    fn from(range: RangeInclusive<usize>) -> Self {
        Self::new(*range.start(), Some(*range.end()))
    }
}

impl From<RangeFrom<usize>> for Arity {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::at_least(range.start)
    }
}

/// Structured data extracted from a marker.
///
/// Descriptors are assembled with a fluent API and are immutable once
/// attached to a member.
///
/// ```
/// use ortho_command::{Descriptor, MarkerKind};
///
/// let marker = Descriptor::command()
///     .name("remote add")
///     .alias("ra")
///     .description("Register a remote");
/// assert_eq!(marker.kind(), MarkerKind::Command);
/// assert_eq!(marker.declared_name(), Some("remote add"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    kind: MarkerKind,
    name: Option<String>,
    help_name: Option<String>,
    aliases: Vec<String>,
    description: Option<String>,
    hidden: bool,
    required: bool,
    arity: Option<Arity>,
}

impl Descriptor {
    /// Creates an empty descriptor of `kind`.
    #[must_use]
    pub const fn new(kind: MarkerKind) -> Self {
        Self {
            kind,
            name: None,
            help_name: None,
            aliases: Vec::new(),
            description: None,
            hidden: false,
            required: false,
            arity: None,
        }
    }

    /// Root marker.
    #[must_use]
    pub const fn root() -> Self {
        Self::new(MarkerKind::Root)
    }

    /// Command marker.
    #[must_use]
    pub const fn command() -> Self {
        Self::new(MarkerKind::Command)
    }

    /// Option marker.
    #[must_use]
    pub const fn option() -> Self {
        Self::new(MarkerKind::Option)
    }

    /// Argument marker.
    #[must_use]
    pub const fn argument() -> Self {
        Self::new(MarkerKind::Argument)
    }

    /// Sets the explicit name.
    ///
    /// For commands the name may contain spaces, each space separating one
    /// level of the command path.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the value placeholder shown in help output.
    #[must_use]
    pub fn help_name(mut self, help_name: impl Into<String>) -> Self {
        self.help_name = Some(help_name.into());
        self
    }

    /// Adds an alias. Repeated aliases are stored once.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    /// Adds several aliases.
    #[must_use]
    pub fn aliases<I, S>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        aliases.into_iter().fold(self, Self::alias)
    }

    /// Sets the help text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Hides the element from help output.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Marks the element as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Overrides the number of values accepted.
    #[must_use]
    pub fn arity(mut self, arity: impl Into<Arity>) -> Self {
        self.arity = Some(arity.into());
        self
    }

    /// Role of this marker.
    #[must_use]
    pub const fn kind(&self) -> MarkerKind {
        self.kind
    }

    /// Explicit name, treating an empty name as absent.
    #[must_use]
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }

    /// Explicit help placeholder.
    #[must_use]
    pub fn help_name_value(&self) -> Option<&str> {
        self.help_name.as_deref()
    }

    /// Declared aliases, in declaration order.
    #[must_use]
    pub fn alias_list(&self) -> &[String] {
        &self.aliases
    }

    /// Help text.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the element is hidden.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the element is explicitly required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Declared arity override.
    #[must_use]
    pub const fn arity_override(&self) -> Option<Arity> {
        self.arity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::exact(Arity::from(2), 2, Some(2))]
    #[case::inclusive(Arity::from(1..=3), 1, Some(3))]
    #[case::open(Arity::from(0..), 0, None)]
    fn arity_conversions(#[case] arity: Arity, #[case] min: usize, #[case] max: Option<usize>) {
        assert_eq!(arity.min(), min);
        assert_eq!(arity.max(), max);
    }

    #[rstest]
    #[case::single(Arity::exactly(1), false)]
    #[case::pair(Arity::exactly(2), true)]
    #[case::unbounded(Arity::at_least(0), true)]
    #[case::optional(Arity::new(0, Some(1)), false)]
    fn arity_multiplicity(#[case] arity: Arity, #[case] multiple: bool) {
        assert_eq!(arity.is_multiple(), multiple);
    }

    #[test]
    fn inverted_arity_is_detected() {
        assert!(Arity::new(3, Some(1)).is_inverted());
        assert!(!Arity::at_least(3).is_inverted());
    }

    #[test]
    fn aliases_are_deduplicated() {
        let marker = Descriptor::command().aliases(["x", "y", "x"]).alias("y");
        assert_eq!(marker.alias_list(), ["x", "y"]);
    }

    #[rstest]
    #[case::missing(Descriptor::command(), None)]
    #[case::empty(Descriptor::command().name(""), None)]
    #[case::blank(Descriptor::command().name("  "), None)]
    #[case::named(Descriptor::command().name("a b"), Some("a b"))]
    fn declared_name_ignores_empty(#[case] marker: Descriptor, #[case] expected: Option<&str>) {
        assert_eq!(marker.declared_name(), expected);
    }
}
