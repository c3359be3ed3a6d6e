#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loader configuration.
//!
//! The defaults live in `loader.toml`, which is baked into the binary at
//! compile time. A different file can be supplied through
//! `PARCEL_LOADER_CONFIG`. Database locations are taken from
//! `PARCEL_LOADER_SOURCE_DB` and `PARCEL_LOADER_DEST_DB`.
//!
//! Table and column names end up interpolated into SQL, so every one of
//! them is checked against a plain identifier pattern when the config is
//! loaded.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};
use thiserror::Error;

/// The default configuration, embedded at compile time.
pub const DEFAULT_CONFIG: &str = include_str!("../loader.toml");

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "PARCEL_LOADER_CONFIG";

/// Environment variable holding the source `DuckDB` path.
pub const SOURCE_DB_ENV: &str = "PARCEL_LOADER_SOURCE_DB";

/// Environment variable holding the destination `DuckDB` path.
pub const DEST_DB_ENV: &str = "PARCEL_LOADER_DEST_DB";

const DEFAULT_SOURCE_DB: &str = "data/source.duckdb";
const DEFAULT_DEST_DB: &str = "data/parcel_loader.duckdb";

/// Plain SQL identifier, optionally schema-qualified.
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid regex")
});

/// Errors from loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or is missing keys.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A table or column name is not a plain identifier.
    #[error("Invalid identifier for {setting}: {value:?}")]
    InvalidIdentifier {
        /// Which setting held the bad value.
        setting: String,
        /// The rejected value.
        value: String,
    },

    /// A numeric setting is out of range.
    #[error("Invalid setting: {message}")]
    InvalidSetting {
        /// Description of what went wrong.
        message: String,
    },
}

/// Logical roles of the source columns the loader reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FieldRole {
    /// Parcel/account number.
    AccountNum,
    /// Secondary property identifier.
    Tencode,
    /// Raw location string.
    SourceAddress,
    /// House-number suffix letter.
    AddressSuffix,
    /// Unit designator.
    Unit,
}

/// Source column name for each [`FieldRole`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMap {
    pub account_num: String,
    pub tencode: String,
    pub source_address: String,
    pub address_suffix: String,
    pub unit: String,
}

impl FieldMap {
    /// Returns the source column mapped to `role`.
    #[must_use]
    pub fn column(&self, role: FieldRole) -> &str {
        match role {
            FieldRole::AccountNum => &self.account_num,
            FieldRole::Tencode => &self.tencode,
            FieldRole::SourceAddress => &self.source_address,
            FieldRole::AddressSuffix => &self.address_suffix,
            FieldRole::Unit => &self.unit,
        }
    }

    /// Returns every `(role, column)` pair in [`FieldRole`] order.
    #[must_use]
    pub fn columns(&self) -> Vec<(FieldRole, &str)> {
        FieldRole::iter().map(|role| (role, self.column(role))).collect()
    }
}

/// Tables joined to aggregate owner names per parcel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnerTables {
    /// Table linking property identifiers to owner records.
    pub link_table: String,
    /// Table holding one row per owner name.
    pub owner_table: String,
    /// Property identifier column shared by the link and owner tables.
    pub property_key: String,
    /// Owner name column.
    pub name_field: String,
}

/// Where and how properties are read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Source property table.
    pub table: String,
    pub fields: FieldMap,
    pub owners: OwnerTables,
}

/// Where normalized properties are written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationConfig {
    /// Destination property table.
    pub table: String,
    /// Column carrying the secondary lookup index.
    pub index_field: String,
    /// Records per bulk-insert chunk.
    pub chunk_size: usize,
}

/// Run-time knobs for the batch pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Log progress every this many source rows.
    pub progress_interval: u64,
}

/// Complete loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    pub pipeline: PipelineConfig,
}

impl LoaderConfig {
    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed, a table or column
    /// name is not a plain identifier, or a numeric setting is zero.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config from `path`, or the embedded default when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::parse(DEFAULT_CONFIG);
        };

        log::info!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Loads the config named by `PARCEL_LOADER_CONFIG`, falling back to the
    /// embedded default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self, ConfigError> {
        let path = lookup(CONFIG_ENV).map(PathBuf::from);
        Self::load(path.as_deref())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let owners = &self.source.owners;
        let mut identifiers = vec![
            ("source.table".to_string(), self.source.table.as_str()),
            ("source.owners.link_table".to_string(), owners.link_table.as_str()),
            ("source.owners.owner_table".to_string(), owners.owner_table.as_str()),
            ("source.owners.property_key".to_string(), owners.property_key.as_str()),
            ("source.owners.name_field".to_string(), owners.name_field.as_str()),
            ("destination.table".to_string(), self.destination.table.as_str()),
            ("destination.index_field".to_string(), self.destination.index_field.as_str()),
        ];
        identifiers.extend(
            self.source
                .fields
                .columns()
                .into_iter()
                .map(|(role, column)| (format!("source.fields.{role}"), column)),
        );

        for (setting, value) in identifiers {
            if !IDENTIFIER_RE.is_match(value) {
                return Err(ConfigError::InvalidIdentifier {
                    setting,
                    value: value.to_string(),
                });
            }
        }

        if self.destination.chunk_size == 0 {
            return Err(ConfigError::InvalidSetting {
                message: "destination.chunk_size must be greater than zero".to_string(),
            });
        }
        if self.pipeline.progress_interval == 0 {
            return Err(ConfigError::InvalidSetting {
                message: "pipeline.progress_interval must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Locations of the source and destination databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePaths {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl DatabasePaths {
    /// Builds paths from optional overrides, falling back to the `data/`
    /// defaults.
    #[must_use]
    pub fn new(source: Option<PathBuf>, destination: Option<PathBuf>) -> Self {
        Self {
            source: source.unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DB)),
            destination: destination.unwrap_or_else(|| PathBuf::from(DEFAULT_DEST_DB)),
        }
    }

    /// Reads `PARCEL_LOADER_SOURCE_DB` and `PARCEL_LOADER_DEST_DB`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        Self::new(
            lookup(SOURCE_DB_ENV).map(PathBuf::from),
            lookup(DEST_DB_ENV).map(PathBuf::from),
        )
    }
}
