//! Destination property table.
//!
//! The destination is a single flat table with one column per entry of
//! [`PROPERTY_COLUMNS`]. Rows are written with multi-row `INSERT`
//! statements, one explicit transaction per chunk.

use std::path::Path;

use duckdb::Connection;
use parcel_loader_property_models::{PROPERTY_COLUMNS, PropertyRecord};

use crate::{DbError, DestinationStore, paths};

/// Number of rows bound into a single `INSERT` statement.
const ROWS_PER_STATEMENT: usize = 1_000;

/// A handle on the destination database.
pub struct PropertyDb {
    conn: Connection,
}

impl PropertyDb {
    /// Opens (or creates) the destination `DuckDB` file, creating its
    /// parent directory first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the directory or database cannot be created.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        paths::ensure_parent(path)?;
        let conn = Connection::open(path)?;
        log::info!("Opened destination database {}", path.display());
        Ok(Self { conn })
    }

    /// Wraps an already-open connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Returns the number of rows currently stored in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub fn count(&self, table: &str) -> Result<u64, DbError> {
        let mut stmt = self.conn.prepare(&format!("SELECT COUNT(*) FROM {table}"))?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        u64::try_from(count).map_err(|e| DbError::Conversion {
            message: format!("row count {count}: {e}"),
        })
    }

    /// Returns whether the index on `table(field)` currently exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the catalogue query fails.
    pub fn index_exists(&self, table: &str, field: &str) -> Result<bool, DbError> {
        let (schema, bare) = split_table(table);
        let (_, name) = index_name(table, field);

        let mut sql = String::from(
            "SELECT COUNT(*) FROM duckdb_indexes()
             WHERE lower(index_name) = lower(?) AND lower(table_name) = lower(?)",
        );
        let mut params = vec![name, bare.to_string()];
        if let Some(schema) = schema {
            sql.push_str(" AND lower(schema_name) = lower(?)");
            params.push(schema.to_string());
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let count: i64 =
            stmt.query_row(duckdb::params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Reads every row of `table`, ordered by account number then street
    /// address.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a stored `address_low` is
    /// out of range.
    pub fn fetch_all(&self, table: &str) -> Result<Vec<PropertyRecord>, DbError> {
        let sql = format!(
            "SELECT {columns} FROM {table} ORDER BY account_num, street_address",
            columns = PROPERTY_COLUMNS.join(", "),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            let address_low: i64 = row.get(4)?;
            let address_low = u32::try_from(address_low).map_err(|e| DbError::Conversion {
                message: format!("address_low {address_low}: {e}"),
            })?;

            records.push(PropertyRecord {
                account_num: row.get(0)?,
                source_address: row.get(1)?,
                tencode: row.get(2)?,
                owners: row.get(3)?,
                address_low,
                address_low_suffix: row.get(5)?,
                address_low_fractional: row.get(6)?,
                address_high: row.get(7)?,
                street_predir: row.get(8)?,
                street_name: row.get(9)?,
                street_suffix: row.get(10)?,
                street_postdir: row.get(11)?,
                unit_num: row.get(12)?,
                unit_type: row.get(13)?,
                street_address: row.get(14)?,
            });
        }

        Ok(records)
    }

    fn insert_chunk(&self, table: &str, chunk: &[PropertyRecord]) -> Result<u64, DbError> {
        let mut inserted = 0u64;

        for rows in chunk.chunks(ROWS_PER_STATEMENT) {
            let placeholder = format!(
                "({})",
                vec!["?"; PROPERTY_COLUMNS.len()].join(", ")
            );
            let sql = format!(
                "INSERT INTO {table} ({columns}) VALUES {values}",
                columns = PROPERTY_COLUMNS.join(", "),
                values = vec![placeholder.as_str(); rows.len()].join(", "),
            );

            let mut stmt = self.conn.prepare(&sql)?;
            let mut param_idx = 1usize;

            for record in rows {
                stmt.raw_bind_parameter(param_idx, &record.account_num)?;
                stmt.raw_bind_parameter(param_idx + 1, &record.source_address)?;
                stmt.raw_bind_parameter(param_idx + 2, &record.tencode)?;
                stmt.raw_bind_parameter(param_idx + 3, &record.owners)?;
                stmt.raw_bind_parameter(param_idx + 4, record.address_low)?;
                stmt.raw_bind_parameter(param_idx + 5, &record.address_low_suffix)?;
                stmt.raw_bind_parameter(param_idx + 6, &record.address_low_fractional)?;
                stmt.raw_bind_parameter(param_idx + 7, &record.address_high)?;
                stmt.raw_bind_parameter(param_idx + 8, &record.street_predir)?;
                stmt.raw_bind_parameter(param_idx + 9, &record.street_name)?;
                stmt.raw_bind_parameter(param_idx + 10, &record.street_suffix)?;
                stmt.raw_bind_parameter(param_idx + 11, &record.street_postdir)?;
                stmt.raw_bind_parameter(param_idx + 12, &record.unit_num)?;
                stmt.raw_bind_parameter(param_idx + 13, &record.unit_type)?;
                stmt.raw_bind_parameter(param_idx + 14, &record.street_address)?;

                param_idx += PROPERTY_COLUMNS.len();
            }

            let rows = stmt.raw_execute()?;
            inserted += u64::try_from(rows).unwrap_or(0);
        }

        Ok(inserted)
    }
}

fn split_table(table: &str) -> (Option<&str>, &str) {
    table
        .split_once('.')
        .map_or((None, table), |(schema, bare)| (Some(schema), bare))
}

/// Splits an optionally schema-qualified table into the schema prefix and
/// the bare index name `<table>_<field>_idx`.
fn index_name<'a>(table: &'a str, field: &str) -> (Option<&'a str>, String) {
    let (schema, bare) = split_table(table);
    (schema, format!("{bare}_{field}_idx"))
}

fn create_table_sql(table: &str) -> String {
    let columns = PROPERTY_COLUMNS
        .iter()
        .map(|column| {
            if *column == "address_low" {
                format!("{column} BIGINT NOT NULL")
            } else {
                format!("{column} TEXT NOT NULL")
            }
        })
        .collect::<Vec<_>>()
        .join(",\n    ");

    format!("CREATE TABLE IF NOT EXISTS {table} (\n    {columns}\n)")
}

impl DestinationStore for PropertyDb {
    fn ensure_table(&self, table: &str) -> Result<(), DbError> {
        self.conn.execute_batch(&create_table_sql(table))?;
        Ok(())
    }

    fn drop_index(&self, table: &str, field: &str) -> Result<(), DbError> {
        let (schema, name) = index_name(table, field);
        let qualified = schema.map_or_else(|| name.clone(), |schema| format!("{schema}.{name}"));
        self.conn
            .execute_batch(&format!("DROP INDEX IF EXISTS {qualified}"))?;
        log::debug!("Dropped index {qualified} (if present)");
        Ok(())
    }

    fn truncate(&self, table: &str) -> Result<(), DbError> {
        self.conn.execute_batch(&format!("DELETE FROM {table}"))?;
        Ok(())
    }

    fn bulk_insert(
        &self,
        table: &str,
        records: &[PropertyRecord],
        chunk_size: usize,
    ) -> Result<u64, DbError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut total = 0u64;

        for (i, chunk) in records.chunks(chunk_size.max(1)).enumerate() {
            self.conn.execute_batch("BEGIN TRANSACTION")?;

            match self.insert_chunk(table, chunk) {
                Ok(inserted) => {
                    self.conn.execute_batch("COMMIT")?;
                    total += inserted;
                    log::debug!("Committed chunk {} ({inserted} rows)", i + 1);
                }
                Err(e) => {
                    if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                        log::error!("Rollback of chunk {} failed: {rollback}", i + 1);
                    }
                    return Err(e);
                }
            }
        }

        Ok(total)
    }

    fn create_index(&self, table: &str, field: &str) -> Result<(), DbError> {
        let (_, name) = index_name(table, field);
        self.conn
            .execute_batch(&format!("CREATE INDEX {name} ON {table} ({field})"))?;
        log::debug!("Created index {name}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "opa_property";

    fn record(account_num: &str, street_address: &str) -> PropertyRecord {
        PropertyRecord {
            account_num: account_num.to_string(),
            source_address: street_address.to_string(),
            tencode: format!("T{account_num}"),
            owners: "SMITH JOHN".to_string(),
            address_low: 1234,
            address_low_suffix: String::new(),
            address_low_fractional: String::new(),
            address_high: String::new(),
            street_predir: String::new(),
            street_name: "MARKET".to_string(),
            street_suffix: "ST".to_string(),
            street_postdir: String::new(),
            unit_num: String::new(),
            unit_type: String::new(),
            street_address: street_address.to_string(),
        }
    }

    fn db() -> PropertyDb {
        let db = PropertyDb::from_connection(Connection::open_in_memory().unwrap());
        db.ensure_table(TABLE).unwrap();
        db
    }

    #[test]
    fn inserts_across_chunks_and_statements() {
        let db = db();
        let records: Vec<_> = (0..2_503)
            .map(|i| record(&format!("{i:09}"), "1234 MARKET ST"))
            .collect();

        let written = db.bulk_insert(TABLE, &records, 1_000).unwrap();

        assert_eq!(written, 2_503);
        assert_eq!(db.count(TABLE).unwrap(), 2_503);
    }

    #[test]
    fn round_trips_every_column() {
        let db = db();
        let mut stored = record("881000100", "1232-1234 N BROAD ST # 4B");
        stored.address_low = 1232;
        stored.address_high = "1234".to_string();
        stored.street_predir = "N".to_string();
        stored.street_name = "BROAD".to_string();
        stored.unit_num = "4B".to_string();

        db.bulk_insert(TABLE, std::slice::from_ref(&stored), 10)
            .unwrap();

        assert_eq!(db.fetch_all(TABLE).unwrap(), vec![stored]);
    }

    #[test]
    fn truncate_empties_table() {
        let db = db();
        db.bulk_insert(TABLE, &[record("1", "1 A ST")], 10).unwrap();
        db.truncate(TABLE).unwrap();
        assert_eq!(db.count(TABLE).unwrap(), 0);
    }

    #[test]
    fn index_can_be_dropped_and_recreated() {
        let db = db();
        db.drop_index(TABLE, "street_address").unwrap();
        assert!(!db.index_exists(TABLE, "street_address").unwrap());

        db.create_index(TABLE, "street_address").unwrap();
        assert!(db.index_exists(TABLE, "street_address").unwrap());

        db.drop_index(TABLE, "street_address").unwrap();
        assert!(!db.index_exists(TABLE, "street_address").unwrap());
    }

    #[test]
    fn index_lookup_is_scoped_to_table() {
        let db = db();
        db.ensure_table("archive").unwrap();
        db.conn
            .execute_batch("CREATE INDEX opa_property_street_address_idx ON archive (street_address)")
            .unwrap();

        assert!(!db.index_exists(TABLE, "street_address").unwrap());
    }

    #[test]
    fn index_lookup_respects_schema() {
        let db = db();
        db.conn.execute_batch("CREATE SCHEMA staging").unwrap();
        db.ensure_table("staging.opa_property").unwrap();
        db.create_index("staging.opa_property", "street_address")
            .unwrap();

        assert!(
            db.index_exists("staging.opa_property", "street_address")
                .unwrap()
        );
        assert!(!db.index_exists("main.opa_property", "street_address").unwrap());

        db.drop_index("staging.opa_property", "street_address")
            .unwrap();
        assert!(
            !db.index_exists("staging.opa_property", "street_address")
                .unwrap()
        );
    }

    #[test]
    fn ensure_table_is_idempotent() {
        let db = db();
        db.ensure_table(TABLE).unwrap();
        assert_eq!(db.count(TABLE).unwrap(), 0);
    }

    #[test]
    fn failed_chunk_is_rolled_back() {
        let db = db();
        let good = record("1", "1 A ST");

        let result = db.bulk_insert("missing_table", &[good.clone()], 10);
        assert!(matches!(result, Err(DbError::DuckDb(_))));

        // The connection is usable again after the rollback.
        assert_eq!(db.bulk_insert(TABLE, &[good], 10).unwrap(), 1);
    }

    #[test]
    fn index_name_keeps_schema_separate() {
        assert_eq!(
            index_name("main.opa_property", "street_address"),
            (Some("main"), "opa_property_street_address_idx".to_string())
        );
        assert_eq!(
            index_name("opa_property", "street_address"),
            (None, "opa_property_street_address_idx".to_string())
        );
    }
}
