#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rebuilds the property table from the source cadastral database.
//!
//! Takes no arguments. Database locations and the loader config come from
//! `PARCEL_LOADER_SOURCE_DB`, `PARCEL_LOADER_DEST_DB` and
//! `PARCEL_LOADER_CONFIG`.
//!
//! Progress, the load summary and the elapsed time are logged at `info`
//! level, which `pretty_env_logger` hides unless `RUST_LOG` asks for it:
//!
//! ```text
//! RUST_LOG=info parcel_loader
//! ```
//!
//! `RUST_LOG=debug` additionally lists every skipped address.

use std::time::Instant;

use parcel_loader_address::StandardParser;
use parcel_loader_config::{DatabasePaths, LoaderConfig};
use parcel_loader_database::{property_db::PropertyDb, source_db::SourceDb};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let start = Instant::now();
    log::info!("Starting...");

    let config = LoaderConfig::from_env()?;
    let paths = DatabasePaths::from_env();

    let source = SourceDb::open(&paths.source)?;
    let destination = PropertyDb::open(&paths.destination)?;
    let parser = StandardParser::new();

    let summary = parcel_loader_ingest::run(&source, &destination, &parser, &config)?;

    log::info!(
        "Wrote {} of {} propert(ies) to {} ({} skipped, {} failed)",
        summary.records_written,
        summary.rows_read,
        config.destination.table,
        summary.rows_skipped,
        summary.rows_failed,
    );
    log::info!("Finished in {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}
