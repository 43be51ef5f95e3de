//! Message composition, kept free of I/O so it can be tested directly.

use crate::error::{GreetingError, Result};

/// Salutation used when none was configured.
pub const DEFAULT_SALUTATION: &str = "Hello";

fn visible(text: &str, blank: GreetingError) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(blank)
    } else {
        Ok(trimmed)
    }
}

/// Builds one greeting line.
///
/// # Errors
///
/// Returns [`GreetingError::BlankName`] or
/// [`GreetingError::BlankPunctuation`] for whitespace-only input.
pub fn greeting(salutation: &str, name: &str, punctuation: &str) -> Result<String> {
    let opening = Some(salutation.trim())
        .filter(|text| !text.is_empty())
        .unwrap_or(DEFAULT_SALUTATION);
    let addressee = visible(name, GreetingError::BlankName)?;
    let mark = visible(punctuation, GreetingError::BlankPunctuation)?;
    Ok(format!("{opening}, {addressee}{mark}"))
}

/// Builds a farewell, mentioning the gift when one is given.
///
/// # Errors
///
/// Returns [`GreetingError::BlankName`] or [`GreetingError::BlankFarewell`]
/// for whitespace-only input.
pub fn farewell(name: &str, phrase: &str, gift: Option<&str>) -> Result<String> {
    let addressee = visible(name, GreetingError::BlankName)?;
    let parting = visible(phrase, GreetingError::BlankFarewell)?;
    Ok(gift.map(str::trim).filter(|item| !item.is_empty()).map_or_else(
        || format!("{parting}, {addressee}."),
        |item| format!("{parting}, {addressee}. Please take this {item}."),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::configured("Hi", " Ada ", "!", "Hi, Ada!")]
    #[case::fallback("  ", "Ada", "?", "Hello, Ada?")]
    fn greetings_are_trimmed(
        #[case] salutation: &str,
        #[case] name: &str,
        #[case] punctuation: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(
            greeting(salutation, name, punctuation).expect("valid greeting"),
            expected
        );
    }

    #[rstest]
    #[case::blank_name(" ", "!")]
    #[case::blank_punctuation("Ada", "\t")]
    fn blank_greeting_parts_fail(#[case] name: &str, #[case] punctuation: &str) {
        assert!(greeting("Hi", name, punctuation).is_err());
    }

    #[rstest]
    #[case::plain(None, "Goodbye, Ada.")]
    #[case::blank_gift(Some("  "), "Goodbye, Ada.")]
    #[case::gift(Some("biscuit"), "Goodbye, Ada. Please take this biscuit.")]
    fn farewells_mention_gifts(#[case] gift: Option<&str>, #[case] expected: &str) {
        assert_eq!(
            farewell("Ada", "Goodbye", gift).expect("valid farewell"),
            expected
        );
    }
}
