//! The full load: rebuilds the destination property table from the source.

use std::time::Instant;

use parcel_loader_address::AddressParser;
use parcel_loader_config::LoaderConfig;
use parcel_loader_database::{DbError, DestinationStore, SourceStore};
use parcel_loader_property_models::LoadSummary;
use thiserror::Error;

use crate::{OwnerMap, process_row};

/// Fatal load errors. Row-level failures never surface here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Row counter for progress logging.
///
/// Reports row 0 and then every `interval` rows after it.
#[derive(Debug)]
struct Progress {
    interval: u64,
    seen: u64,
}

impl Progress {
    fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            seen: 0,
        }
    }

    /// Counts one row. Returns its index when a report is due.
    const fn tick(&mut self) -> Option<u64> {
        let i = self.seen;
        self.seen += 1;
        if i % self.interval == 0 { Some(i) } else { None }
    }
}

/// Runs the load end to end.
///
/// The destination table is dropped of its index and emptied before the
/// source is read, then refilled and re-indexed. Rows whose address cannot
/// be repaired or parsed are skipped; the load only stops on a database
/// error.
///
/// # Errors
///
/// Returns [`IngestError`] if any source or destination operation fails.
/// Chunks committed before a failing insert stay in the destination table.
pub fn run(
    source: &dyn SourceStore,
    destination: &dyn DestinationStore,
    parser: &dyn AddressParser,
    config: &LoaderConfig,
) -> Result<LoadSummary, IngestError> {
    let start = Instant::now();
    let table = config.destination.table.as_str();
    let index_field = config.destination.index_field.as_str();

    destination.ensure_table(table)?;

    log::info!("Dropping index...");
    destination.drop_index(table, index_field)?;

    log::info!("Deleting existing properties...");
    destination.truncate(table)?;

    log::info!("Reading owners from source...");
    let owners = OwnerMap::from_rows(source.read_owners(&config.source)?);
    log::info!("Loaded owners for {} account(s)", owners.len());

    log::info!("Reading properties from source...");
    let mut progress = Progress::new(config.pipeline.progress_interval);
    let mut summary = LoadSummary::default();
    let mut records = Vec::new();

    let rows_read = source.scan_properties(&config.source, &mut |raw| {
        if let Some(i) = progress.tick() {
            log::info!("Processed {i} row(s)");
        }

        match process_row(&raw, parser, &owners) {
            Ok(record) => records.push(record),
            Err(e) if e.is_skip() => {
                summary.rows_skipped += 1;
                log::debug!("Skipping {:?}: {e}", e.address());
            }
            Err(e) => {
                summary.rows_failed += 1;
                log::error!("Unhandled failure on {:?}: {e}", e.address());
            }
        }
    })?;
    summary.rows_read = rows_read;

    log::info!(
        "Normalized {} of {} row(s) ({} skipped, {} failed)",
        records.len(),
        summary.rows_read,
        summary.rows_skipped,
        summary.rows_failed,
    );

    log::info!("Writing properties...");
    summary.records_written =
        destination.bulk_insert(table, &records, config.destination.chunk_size)?;

    log::info!("Creating index...");
    destination.create_index(table, index_field)?;

    summary.duration = start.elapsed();
    Ok(summary)
}
