//! Rule-based street address parser.
//!
//! Handles the shapes found in cadastral location strings:
//!
//! ```text
//! 1234 MARKET ST
//! 1232-34 N BROAD STREET
//! 101A S 5TH ST #4
//! 417 1/2 W GIRARD AVE APT 2
//! ```
//!
//! The parser only decomposes; it has no knowledge of which streets exist.

use std::fmt::Write as _;

use regex::Regex;
use std::sync::LazyLock;

use crate::parser::{AddressNumber, AddressParser, ParseError, ParsedAddress, Street, Unit};
use crate::synonyms;

/// Punctuation that never carries meaning in a street address.
static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,]+").expect("valid regex"));

/// `#` unit. Everything after the last `#` is the unit value, which may be
/// free text ("#4B", "# 12", "#REAR 2", "#1/2", "#").
static HASH_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)#([^#]*)$").expect("valid regex"));

/// Trailing worded unit ("APT 2", "UNIT B", "FL 3").
///
/// The unit value must start with a digit or be a single letter so that
/// street names such as "FL ST" are left alone.
static WORD_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(.*\S)\s+(APARTMENT|APT|UNIT|SUITE|STE|FLOOR|FLR|FL|ROOM|RM|BUILDING|BLDG)\s+([0-9][A-Z0-9-]*|[A-Z])$",
    )
    .expect("valid regex")
});

/// House number with optional suffix letter, fraction and range, followed
/// by the street.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)([A-Z])?(?:\s+(\d+/\d+))?(?:-(\d+)[A-Z]?)?\s+(.+)$").expect("valid regex")
});

static LEADING_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d").expect("valid regex"));

/// The built-in [`AddressParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardParser;

impl StandardParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AddressParser for StandardParser {
    fn parse(&self, address: &str) -> Result<ParsedAddress, ParseError> {
        let normalized = normalize(address);
        if normalized.is_empty() {
            return Err(ParseError::Empty);
        }

        let (rest, unit) = split_unit(&normalized);

        let Some(caps) = NUMBER_RE.captures(rest) else {
            return Err(if LEADING_DIGIT_RE.is_match(rest) {
                ParseError::MissingStreetName(normalized.clone())
            } else {
                ParseError::MissingAddressNumber(normalized.clone())
            });
        };

        let low = &caps[1];
        let low_num = low
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidNumber(low.to_string()))?;
        let high_num_full = caps
            .get(4)
            .map(|high| expand_high(low, high.as_str()))
            .transpose()?;

        let address = AddressNumber {
            low_num,
            low_suffix: caps.get(2).map(|m| m.as_str().to_string()),
            low_fractional: caps.get(3).map(|m| m.as_str().to_string()),
            high_num_full,
        };

        let street = parse_street(&caps[5])
            .ok_or_else(|| ParseError::MissingStreetName(normalized.clone()))?;

        let street_address = build_street_address(&address, &street, &unit);

        log::trace!("Parsed {normalized:?} as {street_address:?}");

        Ok(ParsedAddress {
            street_address,
            address,
            street,
            unit,
        })
    }
}

/// Uppercases, drops punctuation and collapses whitespace.
fn normalize(input: &str) -> String {
    let upper = input.to_uppercase();
    let no_punct = PUNCTUATION_RE.replace_all(&upper, " ");
    no_punct.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a trailing unit designator off the address.
fn split_unit(address: &str) -> (&str, Unit) {
    if let Some(caps) = HASH_UNIT_RE.captures(address) {
        let rest = caps.get(1).map_or("", |m| m.as_str().trim_end());
        let num = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|n| !n.is_empty());
        return (
            rest,
            Unit {
                num: num.map(ToString::to_string),
                kind: Some("#".to_string()),
            },
        );
    }

    if let Some(caps) = WORD_UNIT_RE.captures(address) {
        let rest = caps.get(1).map_or("", |m| m.as_str());
        let kind = synonyms::unit_type(&caps[2]).unwrap_or(&caps[2]).to_string();
        return (
            rest,
            Unit {
                num: Some(caps[3].to_string()),
                kind: Some(kind),
            },
        );
    }

    (address, Unit::default())
}

/// Expands an abbreviated range end: `("1232", "34")` → `1234`.
fn expand_high(low: &str, high: &str) -> Result<u32, ParseError> {
    let full = if high.len() < low.len() {
        format!("{}{high}", &low[..low.len() - high.len()])
    } else {
        high.to_string()
    };

    full.parse::<u32>()
        .map_err(|_| ParseError::InvalidNumber(full.clone()))
}

/// Splits street tokens into directionals, name and suffix.
///
/// Returns `None` when no name remains.
fn parse_street(street: &str) -> Option<Street> {
    let mut tokens: Vec<&str> = street.split_whitespace().collect();

    let predir = if tokens.len() > 1 {
        synonyms::directional(tokens[0])
    } else {
        None
    };
    if predir.is_some() {
        tokens.remove(0);
    }

    let postdir = if tokens.len() > 1 {
        tokens.last().and_then(|t| synonyms::directional(t))
    } else {
        None
    };
    if postdir.is_some() {
        tokens.pop();
    }

    let suffix = if tokens.len() > 1 {
        tokens.last().and_then(|t| synonyms::street_type(t))
    } else {
        None
    };
    if suffix.is_some() {
        tokens.pop();
    }

    if tokens.is_empty() {
        return None;
    }

    Some(Street {
        predir: predir.map(ToString::to_string),
        name: tokens.join(" "),
        suffix: suffix.map(ToString::to_string),
        postdir: postdir.map(ToString::to_string),
    })
}

fn build_street_address(address: &AddressNumber, street: &Street, unit: &Unit) -> String {
    let mut number = address.low_num.to_string();
    if let Some(suffix) = &address.low_suffix {
        number.push_str(suffix);
    }
    if let Some(high) = address.high_num_full {
        let _ = write!(number, "-{high}");
    }

    let unit_part = match (&unit.kind, &unit.num) {
        (Some(kind), Some(num)) => Some(format!("{kind} {num}")),
        (Some(kind), None) => Some(kind.clone()),
        (None, Some(num)) => Some(num.clone()),
        (None, None) => None,
    };

    [
        Some(number.as_str()),
        address.low_fractional.as_deref(),
        street.predir.as_deref(),
        Some(street.name.as_str()),
        street.suffix.as_deref(),
        street.postdir.as_deref(),
        unit_part.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(address: &str) -> ParsedAddress {
        StandardParser.parse(address).unwrap()
    }

    #[test]
    fn parses_simple_address() {
        let parsed = parse("1234 MARKET ST");
        assert_eq!(parsed.address.low_num, 1234);
        assert_eq!(parsed.address.low_suffix, None);
        assert_eq!(parsed.street.predir, None);
        assert_eq!(parsed.street.name, "MARKET");
        assert_eq!(parsed.street.suffix.as_deref(), Some("ST"));
        assert_eq!(parsed.unit, Unit::default());
        assert_eq!(parsed.street_address, "1234 MARKET ST");
    }

    #[test]
    fn standardizes_spelled_out_parts() {
        let parsed = parse("1234 north broad street");
        assert_eq!(parsed.street.predir.as_deref(), Some("N"));
        assert_eq!(parsed.street.name, "BROAD");
        assert_eq!(parsed.street.suffix.as_deref(), Some("ST"));
        assert_eq!(parsed.street_address, "1234 N BROAD ST");
    }

    #[test]
    fn parses_suffix_letter() {
        let parsed = parse("101A MAIN ST");
        assert_eq!(parsed.address.low_num, 101);
        assert_eq!(parsed.address.low_suffix.as_deref(), Some("A"));
        assert_eq!(parsed.street_address, "101A MAIN ST");
    }

    #[test]
    fn expands_abbreviated_range() {
        let parsed = parse("1232-34 N BROAD ST");
        assert_eq!(parsed.address.low_num, 1232);
        assert_eq!(parsed.address.high_num_full, Some(1234));
        assert_eq!(parsed.street_address, "1232-1234 N BROAD ST");
    }

    #[test]
    fn keeps_full_range() {
        let parsed = parse("123A-125 MAIN ST");
        assert_eq!(parsed.address.low_suffix.as_deref(), Some("A"));
        assert_eq!(parsed.address.high_num_full, Some(125));
    }

    #[test]
    fn parses_fraction() {
        let parsed = parse("417 1/2 W GIRARD AVE");
        assert_eq!(parsed.address.low_fractional.as_deref(), Some("1/2"));
        assert_eq!(parsed.street.predir.as_deref(), Some("W"));
        assert_eq!(parsed.street.name, "GIRARD");
        assert_eq!(parsed.street_address, "417 1/2 W GIRARD AVE");
    }

    #[test]
    fn parses_hash_unit() {
        let parsed = parse("1234 MARKET ST #4B");
        assert_eq!(parsed.unit.kind.as_deref(), Some("#"));
        assert_eq!(parsed.unit.num.as_deref(), Some("4B"));
        assert_eq!(parsed.street.suffix.as_deref(), Some("ST"));
        assert_eq!(parsed.street_address, "1234 MARKET ST # 4B");
    }

    #[test]
    fn keeps_free_text_hash_units_whole() {
        for (address, num) in [
            ("1234 MARKET ST #4 B", "4 B"),
            ("1234 MARKET ST #REAR 2", "REAR 2"),
            ("1234 MARKET ST #1/2", "1/2"),
            ("1234 MARKET ST # A&B ", "A&B"),
        ] {
            let parsed = parse(address);
            assert_eq!(parsed.street.name, "MARKET", "{address}");
            assert_eq!(parsed.street.suffix.as_deref(), Some("ST"), "{address}");
            assert_eq!(parsed.unit.kind.as_deref(), Some("#"), "{address}");
            assert_eq!(parsed.unit.num.as_deref(), Some(num), "{address}");
        }

        assert_eq!(
            parse("1234 MARKET ST #4 B").street_address,
            "1234 MARKET ST # 4 B"
        );
    }

    #[test]
    fn bare_hash_has_no_unit_number() {
        let parsed = parse("1234 MARKET ST #");
        assert_eq!(parsed.unit.kind.as_deref(), Some("#"));
        assert_eq!(parsed.unit.num, None);
        assert_eq!(parsed.street.suffix.as_deref(), Some("ST"));
    }

    #[test]
    fn parses_worded_unit() {
        let parsed = parse("1234 MARKET ST APARTMENT 2");
        assert_eq!(parsed.unit.kind.as_deref(), Some("APT"));
        assert_eq!(parsed.unit.num.as_deref(), Some("2"));
        assert_eq!(parsed.street_address, "1234 MARKET ST APT 2");
    }

    #[test]
    fn leaves_unit_like_street_names_alone() {
        let parsed = parse("10 FL ST");
        assert_eq!(parsed.unit, Unit::default());
        assert_eq!(parsed.street.name, "FL");
    }

    #[test]
    fn parses_postdir() {
        let parsed = parse("500 CHESTNUT ST W");
        assert_eq!(parsed.street.postdir.as_deref(), Some("W"));
        assert_eq!(parsed.street.suffix.as_deref(), Some("ST"));
        assert_eq!(parsed.street.name, "CHESTNUT");
    }

    #[test]
    fn single_token_street_is_the_name() {
        let parsed = parse("100 BROADWAY");
        assert_eq!(parsed.street.name, "BROADWAY");
        assert_eq!(parsed.street.suffix, None);

        let parsed = parse("100 N");
        assert_eq!(parsed.street.name, "N");
        assert_eq!(parsed.street.predir, None);
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(parse("1234 N. BROAD ST.,").street_address, "1234 N BROAD ST");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(StandardParser.parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn rejects_missing_number() {
        assert_eq!(
            StandardParser.parse("MARKET ST"),
            Err(ParseError::MissingAddressNumber("MARKET ST".to_string()))
        );
    }

    #[test]
    fn rejects_missing_street() {
        assert_eq!(
            StandardParser.parse("1234"),
            Err(ParseError::MissingStreetName("1234".to_string()))
        );
        assert_eq!(
            StandardParser.parse("1234 #5"),
            Err(ParseError::MissingStreetName("1234 #5".to_string()))
        );
    }

    #[test]
    fn rejects_oversized_number() {
        assert_eq!(
            StandardParser.parse("99999999999 MAIN ST"),
            Err(ParseError::InvalidNumber("99999999999".to_string()))
        );
    }
}
