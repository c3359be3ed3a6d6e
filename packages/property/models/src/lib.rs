#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property record types shared by the parcel loader crates.
//!
//! A [`RawPropertyRecord`] is read from the source cadastral database, run
//! through address repair and parsing, and becomes a flat
//! [`PropertyRecord`] that is bulk-written to the destination table.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Separator placed between owner names in [`PropertyRecord::owners`].
pub const OWNER_DELIMITER: &str = "|";

/// Destination column names, in the order records are written.
pub const PROPERTY_COLUMNS: &[&str] = &[
    "account_num",
    "source_address",
    "tencode",
    "owners",
    "address_low",
    "address_low_suffix",
    "address_low_fractional",
    "address_high",
    "street_predir",
    "street_name",
    "street_suffix",
    "street_postdir",
    "unit_num",
    "unit_type",
    "street_address",
];

/// A property row as it comes out of the source database.
///
/// Every column is read as text and may be `NULL`, so nothing here is
/// trusted until the row has been processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPropertyRecord {
    /// Parcel/account number (unique per parcel).
    pub account_num: Option<String>,
    /// Secondary property identifier, carried through unchanged.
    pub tencode: Option<String>,
    /// Free-text location string (e.g. `"1234 MARKET ST"`).
    pub location: Option<String>,
    /// Address suffix letter that the location may be missing (e.g. `"A"`).
    pub address_suffix: Option<String>,
    /// Unit designator, often zero-padded (e.g. `"0004"`).
    pub unit: Option<String>,
}

/// One row of the owner aggregation query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRow {
    /// Parcel/account number.
    pub account_num: String,
    /// Pipe-joined owner names, `None` when the parcel has no owners.
    pub owners: Option<String>,
}

/// A normalized property ready to be written to the destination table.
///
/// Every field always has a value; components the parser did not produce
/// are stored as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub account_num: String,
    /// The repaired address that was handed to the parser.
    pub source_address: String,
    pub tencode: String,
    pub owners: String,
    pub address_low: u32,
    pub address_low_suffix: String,
    pub address_low_fractional: String,
    pub address_high: String,
    pub street_predir: String,
    pub street_name: String,
    pub street_suffix: String,
    pub street_postdir: String,
    pub unit_num: String,
    pub unit_type: String,
    /// Full normalized street address produced by the parser.
    pub street_address: String,
}

/// Result of a completed load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Source rows visited.
    pub rows_read: u64,
    /// Records written to the destination table.
    pub records_written: u64,
    /// Rows dropped because their address could not be repaired or parsed.
    pub rows_skipped: u64,
    /// Rows dropped because of an unexpected failure.
    pub rows_failed: u64,
    /// Wall-clock duration of the load.
    pub duration: Duration,
}
