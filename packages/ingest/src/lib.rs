#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property record loader.
//!
//! Reads raw property rows and owner names from the source cadastral
//! database, repairs and parses each address, and rebuilds the destination
//! property table from scratch. See [`pipeline::run`].

pub mod assemble;
pub mod outcome;
pub mod owners;
pub mod pipeline;

pub use assemble::assemble_record;
pub use outcome::{RowError, SkipReason, process_row};
pub use owners::OwnerMap;
pub use pipeline::{IngestError, run};
