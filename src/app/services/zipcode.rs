//! Postal code normalization

use crate::constants::ZIPCODE_LENGTH;
use std::fmt::Display;

/// Normalize a raw postal code to exactly five characters.
///
/// The value is rendered to a string first, left-padded with `0` and cut to
/// the first five characters. Never fails; empty input becomes `00000`.
pub fn normalize_zipcode(raw: impl Display) -> String {
    let raw = raw.to_string();
    let raw = raw.trim();
    let len = raw.chars().count();

    let mut normalized = String::with_capacity(ZIPCODE_LENGTH);
    normalized.extend(std::iter::repeat_n('0', ZIPCODE_LENGTH.saturating_sub(len)));
    normalized.extend(raw.chars().take(ZIPCODE_LENGTH));
    normalized
}
