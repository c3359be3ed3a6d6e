#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address handling for the parcel loader.
//!
//! Source cadastral addresses arrive in several broken shapes:
//! - Zero-padded units kept in a separate column: `"1234 MARKET ST"` + `"0004"`
//! - House-number suffixes split off: `"101 MAIN ST"` + `"A"`
//! - Ranges: `"1232-34 N BROAD ST"`
//!
//! [`repair`] stitches these back into a single address string, and
//! [`parser`] turns that string into structured components through the
//! [`AddressParser`] trait. [`standard::StandardParser`] is the built-in
//! rule-based implementation.

pub mod parser;
pub mod repair;
pub mod standard;
pub mod synonyms;

pub use parser::{AddressNumber, AddressParser, ParseError, ParsedAddress, Street, Unit};
pub use repair::{RepairError, repair_address};
pub use standard::StandardParser;
