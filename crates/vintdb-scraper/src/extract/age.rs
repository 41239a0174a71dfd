use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use vintdb_core::Age;

use super::parse_digits;

/// Decade value ignored by [`extract_age`].
///
/// "66" in listing names is overwhelmingly the "66前期/66後期" model
/// designation rather than an era, so "66s"/"66年代" is treated as noise.
/// No other two-digit value is excluded.
pub const EXCLUDED_DECADE: u8 = 66;

/// Two digits followed by a decade suffix: "60年代", "60s", "60's".
static DECADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<decade>[0-9０-９]{2})(?:年代|'s|s)").expect("valid decade regex")
});

/// The listing name names three or more distinct decades, so no single era
/// or range can be assigned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ambiguous age: {} distinct decades found ({})", .decades.len(), format_decades(.decades))]
pub struct AmbiguousAge {
    /// Distinct decades found, ascending.
    pub decades: Vec<u8>,
}

fn format_decades(decades: &[u8]) -> String {
    decades
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Derives a decade or decade range from a listing name.
///
/// All non-overlapping decade notations are collected, decade
/// [`EXCLUDED_DECADE`] is dropped, and the remaining distinct values decide
/// the result:
///
/// - none → `Ok(None)`
/// - one → `Ok(Some(Age::Decade(d)))`
/// - two → `Ok(Some(Age::Range { min, max }))`
///
/// # Errors
///
/// Returns [`AmbiguousAge`] when three or more distinct decades remain.
pub fn extract_age(item_name: &str) -> Result<Option<Age>, AmbiguousAge> {
    let decades: BTreeSet<u8> = DECADE_RE
        .captures_iter(item_name)
        .filter_map(|caps| parse_digits(&caps["decade"]))
        .filter_map(|d| u8::try_from(d).ok())
        .filter(|&d| d != EXCLUDED_DECADE)
        .collect();

    let mut iter = decades.iter().copied();
    match (iter.next(), iter.next(), iter.next()) {
        (None, _, _) => Ok(None),
        (Some(d), None, _) => Ok(Some(Age::Decade(d))),
        (Some(min), Some(max), None) => Ok(Some(Age::between(min, max))),
        _ => Err(AmbiguousAge {
            decades: decades.into_iter().collect(),
        }),
    }
}
