//! Street type, directional and unit designator tables.
//!
//! Each table maps every accepted spelling to the USPS standard
//! abbreviation, so "STREET", "STR" and "ST" all come out as "ST".

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Street suffixes: `(standard abbreviation, accepted spellings)`.
///
/// Source: USPS Publication 28 (Appendix C), trimmed to the types that
/// show up in cadastral data.
const STREET_TYPE_ENTRIES: &[(&str, &[&str])] = &[
    ("ALY", &["ALLEY", "ALLY", "ALY"]),
    ("AVE", &["AVENUE", "AVEN", "AV", "AVE"]),
    ("BLVD", &["BOULEVARD", "BOUL", "BLV", "BLVD"]),
    ("BR", &["BRANCH", "BR"]),
    ("BRG", &["BRIDGE", "BRG"]),
    ("CIR", &["CIRCLE", "CIRC", "CIR"]),
    ("CT", &["COURT", "CRT", "CT"]),
    ("CTR", &["CENTER", "CENTRE", "CNTR", "CTR"]),
    ("CRES", &["CRESCENT", "CRES"]),
    ("DR", &["DRIVE", "DRV", "DR"]),
    ("EXPY", &["EXPRESSWAY", "EXPWY", "EXPY"]),
    ("GDNS", &["GARDENS", "GDNS"]),
    ("GRN", &["GREEN", "GRN"]),
    ("HTS", &["HEIGHTS", "HTS"]),
    ("HWY", &["HIGHWAY", "HIWAY", "HWY"]),
    ("LN", &["LANE", "LN"]),
    ("MALL", &["MALL"]),
    ("PATH", &["PATH"]),
    ("PIKE", &["PIKE", "PIKES"]),
    ("PKWY", &["PARKWAY", "PARKWY", "PKY", "PKWY"]),
    ("PL", &["PLACE", "PL"]),
    ("PLZ", &["PLAZA", "PLZA", "PLZ"]),
    ("RD", &["ROAD", "RD"]),
    ("ROW", &["ROW"]),
    ("SQ", &["SQUARE", "SQR", "SQ"]),
    ("ST", &["STREET", "STR", "ST"]),
    ("TER", &["TERRACE", "TERR", "TER"]),
    ("WALK", &["WALK"]),
    ("WAY", &["WAY", "WY"]),
];

/// Directionals: `(standard abbreviation, accepted spellings)`.
const DIRECTIONAL_ENTRIES: &[(&str, &[&str])] = &[
    ("N", &["NORTH", "N"]),
    ("S", &["SOUTH", "S"]),
    ("E", &["EAST", "E"]),
    ("W", &["WEST", "W"]),
    ("NE", &["NORTHEAST", "NE"]),
    ("NW", &["NORTHWEST", "NW"]),
    ("SE", &["SOUTHEAST", "SE"]),
    ("SW", &["SOUTHWEST", "SW"]),
];

/// Secondary unit designators: `(standard abbreviation, accepted spellings)`.
const UNIT_TYPE_ENTRIES: &[(&str, &[&str])] = &[
    ("APT", &["APARTMENT", "APT"]),
    ("BLDG", &["BUILDING", "BLDG"]),
    ("FL", &["FLOOR", "FLR", "FL"]),
    ("RM", &["ROOM", "RM"]),
    ("STE", &["SUITE", "STE"]),
    ("UNIT", &["UNIT"]),
];

fn build_table(entries: &[(&'static str, &[&'static str])]) -> BTreeMap<&'static str, &'static str> {
    entries
        .iter()
        .flat_map(|(standard, spellings)| spellings.iter().map(move |s| (*s, *standard)))
        .collect()
}

static STREET_TYPES: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| build_table(STREET_TYPE_ENTRIES));

static DIRECTIONALS: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| build_table(DIRECTIONAL_ENTRIES));

static UNIT_TYPES: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| build_table(UNIT_TYPE_ENTRIES));

/// Returns the standard abbreviation if `token` is a street type.
#[must_use]
pub fn street_type(token: &str) -> Option<&'static str> {
    STREET_TYPES.get(token).copied()
}

/// Returns the standard abbreviation if `token` is a directional.
#[must_use]
pub fn directional(token: &str) -> Option<&'static str> {
    DIRECTIONALS.get(token).copied()
}

/// Returns the standard abbreviation if `token` is a unit designator.
#[must_use]
pub fn unit_type(token: &str) -> Option<&'static str> {
    UNIT_TYPES.get(token).copied()
}
