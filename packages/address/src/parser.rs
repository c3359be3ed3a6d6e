//! The boundary between the loader and an address-parsing engine.
//!
//! Components the engine could not find are `None` here. They only become
//! empty strings when a record is assembled for storage.

use thiserror::Error;

/// Converts a free-text address into structured components.
pub trait AddressParser {
    /// Parses a single address.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the address cannot be decomposed.
    fn parse(&self, address: &str) -> Result<ParsedAddress, ParseError>;
}

/// Errors from an [`AddressParser`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing left to parse after normalization.
    #[error("empty address")]
    Empty,

    /// The address does not start with a house number.
    #[error("no house number in {0:?}")]
    MissingAddressNumber(String),

    /// A house number was found but no street name follows it.
    #[error("no street name in {0:?}")]
    MissingStreetName(String),

    /// The house number is out of range or otherwise malformed.
    #[error("invalid house number {0:?}")]
    InvalidNumber(String),
}

/// Structured components of a parsed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    /// The normalized street address rebuilt from its components,
    /// e.g. `"1232-1234 N BROAD ST # 5"`.
    pub street_address: String,
    pub address: AddressNumber,
    pub street: Street,
    pub unit: Unit,
}

/// House number components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressNumber {
    pub low_num: u32,
    /// Letter attached to the low number (`"A"` in `"101A"`).
    pub low_suffix: Option<String>,
    /// Fractional part (`"1/2"` in `"101 1/2"`).
    pub low_fractional: Option<String>,
    /// High end of a range, expanded to a full number (`1234` for `"1232-34"`).
    pub high_num_full: Option<u32>,
}

/// Street components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Street {
    pub predir: Option<String>,
    pub name: String,
    pub suffix: Option<String>,
    pub postdir: Option<String>,
}

/// Unit components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unit {
    pub num: Option<String>,
    /// Designator such as `"#"`, `"APT"` or `"UNIT"`.
    pub kind: Option<String>,
}
