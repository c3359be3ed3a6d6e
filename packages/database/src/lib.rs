#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Source and destination stores for the parcel loader.
//!
//! The pipeline only talks to the [`SourceStore`] and [`DestinationStore`]
//! traits. [`source_db::SourceDb`] and [`property_db::PropertyDb`] are the
//! `DuckDB` implementations used by the binary. All calls block the
//! calling thread.

pub mod paths;
pub mod property_db;
pub mod source_db;

use parcel_loader_config::SourceConfig;
use parcel_loader_property_models::{OwnerRow, PropertyRecord, RawPropertyRecord};

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` query or connection error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// I/O error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Read access to the source cadastral database.
pub trait SourceStore {
    /// Runs the owner aggregation query once, yielding one row per
    /// `(account number, owner string)` group.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    fn read_owners(&self, config: &SourceConfig) -> Result<Vec<OwnerRow>, DbError>;

    /// Streams every source property through `visit`, one row at a time.
    ///
    /// Returns the number of rows visited.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row cannot be decoded.
    fn scan_properties(
        &self,
        config: &SourceConfig,
        visit: &mut dyn FnMut(RawPropertyRecord),
    ) -> Result<u64, DbError>;
}

/// Write access to the destination property table.
pub trait DestinationStore {
    /// Creates the destination table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the DDL fails.
    fn ensure_table(&self, table: &str) -> Result<(), DbError>;

    /// Drops the index on `table(field)` if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the DDL fails.
    fn drop_index(&self, table: &str, field: &str) -> Result<(), DbError>;

    /// Removes every row from `table`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the delete fails.
    fn truncate(&self, table: &str) -> Result<(), DbError>;

    /// Inserts `records` in order, `chunk_size` records per transaction.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any chunk fails. Chunks committed before the
    /// failure stay written.
    fn bulk_insert(
        &self,
        table: &str,
        records: &[PropertyRecord],
        chunk_size: usize,
    ) -> Result<u64, DbError>;

    /// Creates the index on `table(field)`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the DDL fails.
    fn create_index(&self, table: &str, field: &str) -> Result<(), DbError>;
}
