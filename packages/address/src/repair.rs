//! Repairs raw source locations before they are parsed.
//!
//! The source keeps units and house-number suffix letters in their own
//! columns, and the location string is frequently missing one or both.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Matches a house number that already carries its suffix letter
/// (e.g. "101A MAIN ST"). Anchored at the start of the address.
static SUFFIXED_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[A-Z]").expect("valid regex"));

/// Errors from [`repair_address`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    /// A suffix letter needed to be inserted but the address has neither a
    /// hyphen nor a space to anchor it.
    #[error("no position to insert suffix {suffix:?} into {address:?}")]
    NoInsertionPoint {
        /// The address at the time of insertion.
        address: String,
        /// The suffix letter(s) that could not be placed.
        suffix: String,
    },
}

/// Produces the address string handed to the parser.
///
/// 1. Trims `location`.
/// 2. Appends a non-empty `unit` as `" #<unit>"` with leading zeros removed.
///    A unit made only of zeros is dropped entirely.
/// 3. Re-inserts an alphabetic `suffix` after the house number, unless the
///    address already starts with a suffixed number. The suffix goes before
///    the first hyphen, or the first space when there is no hyphen.
///
/// # Errors
///
/// Returns [`RepairError::NoInsertionPoint`] if a suffix has to be inserted
/// but the address contains neither a hyphen nor a space.
pub fn repair_address(
    location: &str,
    unit: Option<&str>,
    suffix: Option<&str>,
) -> Result<String, RepairError> {
    let mut address = location.trim().to_string();

    if let Some(unit) = unit.map(str::trim).filter(|u| !u.is_empty()) {
        let unit = unit.trim_start_matches('0');
        if !unit.is_empty() {
            address.push_str(" #");
            address.push_str(unit);
        }
    }

    if let Some(suffix) = suffix
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.chars().all(char::is_alphabetic))
        && !SUFFIXED_NUMBER_RE.is_match(&address)
    {
        let Some(idx) = address.find('-').or_else(|| address.find(' ')) else {
            return Err(RepairError::NoInsertionPoint {
                address,
                suffix: suffix.to_string(),
            });
        };
        address.insert_str(idx, suffix);
    }

    Ok(address)
}
