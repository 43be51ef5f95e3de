//! Name derivation for commands, options and arguments.

use heck::ToKebabCase;

use crate::error::{UsageError, UsageResult};

/// Converts an identifier to its hyphenated lower-case form.
///
/// Word boundaries follow `heck`: underscores and lower-to-upper case
/// transitions both become hyphens, so `optionField` and `option_field`
/// both yield `option-field`.
#[must_use]
pub fn kebab_name(ident: &str) -> String {
    ident.to_kebab_case()
}

/// Derives a command name from a handler identifier.
///
/// Underscores separate path segments and each segment is kebab-cased,
/// so `remote_addUrl` becomes `remote add-url`.
#[must_use]
pub fn command_name(ident: &str) -> String {
    ident
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(kebab_name)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a command name into its path segments.
pub fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split_whitespace()
}

/// Prefixes an option name with the conventional dash.
///
/// Single-character names take one dash and longer names take two. Names
/// already starting with a dash are returned untouched.
#[must_use]
pub fn option_flag(name: &str) -> String {
    if name.starts_with('-') {
        name.to_owned()
    } else if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

/// A parsed option switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Switch {
    /// `-x`
    Short(char),
    /// `--name`
    Long(String),
}

impl Switch {
    /// Parses a prefixed switch such as `-v` or `--verbose`.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidOptionName`] when the name is missing
    /// its prefix, has nothing after the prefix, contains whitespace, or is
    /// a multi-character name with a single dash.
    pub fn parse(flag: &str) -> UsageResult<Self> {
        let invalid = || UsageError::InvalidOptionName {
            name: flag.to_owned(),
        };
        if flag.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        if let Some(long) = flag.strip_prefix("--") {
            if long.is_empty() || long.starts_with('-') {
                return Err(invalid());
            }
            return Ok(Self::Long(long.to_owned()));
        }
        let Some(short) = flag.strip_prefix('-') else {
            return Err(invalid());
        };
        let mut chars = short.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != '-' => Ok(Self::Short(c)),
            _ => Err(invalid()),
        }
    }
}

impl std::fmt::Display for Switch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short(c) => write!(f, "-{c}"),
            Self::Long(name) => write!(f, "--{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("optionField", "option-field")]
    #[case("option_field", "option-field")]
    #[case("VERBOSE", "verbose")]
    #[case("LOG_LEVEL", "log-level")]
    #[case("x", "x")]
    fn kebab_names(#[case] ident: &str, #[case] expected: &str) {
        assert_eq!(kebab_name(ident), expected);
    }

    #[rstest]
    #[case("greet", "greet")]
    #[case("take_leave", "take leave")]
    #[case("remote_addUrl", "remote add-url")]
    #[case("_hidden", "hidden")]
    fn command_names(#[case] ident: &str, #[case] expected: &str) {
        assert_eq!(command_name(ident), expected);
    }

    #[rstest]
    #[case("v", "-v")]
    #[case("verbose", "--verbose")]
    #[case("-q", "-q")]
    #[case("--dry-run", "--dry-run")]
    fn option_flags(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(option_flag(name), expected);
    }

    #[rstest]
    #[case("-v", Switch::Short('v'))]
    #[case("--verbose", Switch::Long("verbose".into()))]
    fn switches_parse(#[case] flag: &str, #[case] expected: Switch) {
        assert_eq!(Switch::parse(flag), Ok(expected));
    }

    #[rstest]
    #[case("verbose")]
    #[case("-")]
    #[case("--")]
    #[case("---x")]
    #[case("-ab")]
    #[case("--two words")]
    fn invalid_switches(#[case] flag: &str) {
        assert_eq!(
            Switch::parse(flag),
            Err(UsageError::InvalidOptionName { name: flag.into() })
        );
    }

    #[test]
    fn segments_ignore_repeated_spaces() {
        assert_eq!(segments(" a  b c ").collect::<Vec<_>>(), ["a", "b", "c"]);
    }
}
