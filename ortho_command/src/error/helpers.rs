//! Helpers for classifying and walking errors.

use std::error::Error as StdError;

use clap::{Error as ClapError, error::ErrorKind};

/// Returns `true` when a [`clap::Error`] corresponds to `--help` or
/// `--version`.
///
/// Clap surfaces these requests through dedicated [`ErrorKind`] variants.
/// The entry points print them to the output sink and exit with status zero
/// instead of reporting them as failures.
#[must_use]
pub fn is_display_request(err: &ClapError) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

/// Iterates over `err` followed by each of its sources.
pub fn cause_chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&cause| cause.source())
}
