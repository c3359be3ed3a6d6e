//! Per-row processing and its failure classes.
//!
//! A row either becomes a [`PropertyRecord`] or is dropped with a
//! [`RowError`]. Neither kind of drop stops the load.

use std::panic::{self, AssertUnwindSafe};

use parcel_loader_address::{AddressParser, ParseError, RepairError, repair_address};
use parcel_loader_property_models::{PropertyRecord, RawPropertyRecord};
use thiserror::Error;

use crate::{OwnerMap, assemble_record};

/// An address that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("repair failed: {0}")]
    Repair(#[from] RepairError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}

/// Why a source row produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// Expected data-quality failure. Counted and logged at debug level.
    #[error("{reason}")]
    Skipped {
        address: String,
        reason: SkipReason,
    },

    /// Anything else: missing required columns or a parser panic.
    #[error("{message}")]
    Unexpected { address: String, message: String },
}

impl RowError {
    /// The address the row was being processed with when it failed.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::Skipped { address, .. } | Self::Unexpected { address, .. } => address,
        }
    }

    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Repairs, parses, and assembles a single source row.
///
/// # Errors
///
/// Returns [`RowError::Skipped`] if the address cannot be repaired or
/// parsed, and [`RowError::Unexpected`] if the row lacks an account number
/// or location, or the parser panics.
pub fn process_row(
    raw: &RawPropertyRecord,
    parser: &dyn AddressParser,
    owners: &OwnerMap,
) -> Result<PropertyRecord, RowError> {
    let Some(location) = raw.location.as_deref() else {
        return Err(RowError::Unexpected {
            address: String::new(),
            message: format!(
                "missing location for account {}",
                raw.account_num.as_deref().unwrap_or("<none>")
            ),
        });
    };

    let Some(account_num) = raw.account_num.as_deref() else {
        return Err(RowError::Unexpected {
            address: location.to_string(),
            message: "missing account number".to_string(),
        });
    };

    let source_address = repair_address(
        location,
        raw.unit.as_deref(),
        raw.address_suffix.as_deref(),
    )
    .map_err(|e| RowError::Skipped {
        address: location.trim().to_string(),
        reason: e.into(),
    })?;

    let parsed = panic::catch_unwind(AssertUnwindSafe(|| parser.parse(&source_address)))
        .map_err(|payload| RowError::Unexpected {
            address: source_address.clone(),
            message: panic_message(payload.as_ref()),
        })?
        .map_err(|e| RowError::Skipped {
            address: source_address.clone(),
            reason: e.into(),
        })?;

    Ok(assemble_record(
        account_num,
        raw.tencode.as_deref().unwrap_or_default(),
        &source_address,
        parsed,
        owners.owners(account_num),
    ))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map_or_else(|| "parser panicked".to_string(), |s| format!("parser panicked: {s}"))
}
