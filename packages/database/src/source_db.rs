//! Source cadastral database access.
//!
//! Reads property rows and the per-parcel owner aggregate from a `DuckDB`
//! copy of the cadastral system. Every column is cast to text on the way
//! out, since identifiers are numeric in some extracts and text in others.

use std::path::Path;

use duckdb::{AccessMode, Config, Connection};
use parcel_loader_config::{FieldRole, SourceConfig};
use parcel_loader_property_models::{OWNER_DELIMITER, OwnerRow, RawPropertyRecord};

use crate::{DbError, SourceStore};

/// A read-only handle on the source database.
pub struct SourceDb {
    conn: Connection,
}

impl SourceDb {
    /// Opens the source `DuckDB` file read-only.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the file does not exist or cannot be opened.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        let conn = Connection::open_with_flags(path, config)?;
        log::info!("Opened source database {}", path.display());
        Ok(Self { conn })
    }

    /// Wraps an already-open connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

/// Builds the owner aggregation query.
///
/// Owner names are trimmed and joined per property identifier, then
/// grouped per parcel. Rows come back sorted by account number with
/// `NULL` owner strings first, so a parcel that has both an owned and an
/// unowned property keeps its owner string under last-write-wins.
fn owners_sql(config: &SourceConfig) -> String {
    let account = config.fields.column(FieldRole::AccountNum);
    let tencode = config.fields.column(FieldRole::Tencode);
    let owners = &config.owners;
    let key = &owners.property_key;
    let name = &owners.name_field;

    format!(
        "SELECT CAST(p.{account} AS VARCHAR) AS account_num, o.owners
         FROM {table} p
         LEFT JOIN {link} po ON p.{tencode} = po.{key}
         LEFT JOIN (
             SELECT {key}, string_agg(trim({name}), '{OWNER_DELIMITER}' ORDER BY {key}, trim({name})) AS owners
             FROM {owner_table}
             GROUP BY {key}
         ) o ON o.{key} = po.{key}
         GROUP BY p.{account}, o.owners
         ORDER BY account_num, o.owners NULLS FIRST",
        table = config.table,
        link = owners.link_table,
        owner_table = owners.owner_table,
    )
}

fn properties_sql(config: &SourceConfig) -> String {
    let columns = [
        FieldRole::AccountNum,
        FieldRole::Tencode,
        FieldRole::SourceAddress,
        FieldRole::AddressSuffix,
        FieldRole::Unit,
    ]
    .iter()
    .map(|role| format!("CAST({col} AS VARCHAR)", col = config.fields.column(*role)))
    .collect::<Vec<_>>()
    .join(", ");

    format!("SELECT {columns} FROM {table}", table = config.table)
}

impl SourceStore for SourceDb {
    fn read_owners(&self, config: &SourceConfig) -> Result<Vec<OwnerRow>, DbError> {
        let mut stmt = self.conn.prepare(&owners_sql(config))?;
        let mut rows = stmt.query([])?;

        let mut results = Vec::new();
        let mut missing_account = 0u64;

        while let Some(row) = rows.next()? {
            let account_num: Option<String> = row.get(0)?;
            let owners: Option<String> = row.get(1)?;

            let Some(account_num) = account_num else {
                missing_account += 1;
                continue;
            };

            results.push(OwnerRow {
                account_num,
                owners,
            });
        }

        if missing_account > 0 {
            log::warn!("Ignored {missing_account} owner row(s) without an account number");
        }

        Ok(results)
    }

    fn scan_properties(
        &self,
        config: &SourceConfig,
        visit: &mut dyn FnMut(RawPropertyRecord),
    ) -> Result<u64, DbError> {
        let mut stmt = self.conn.prepare(&properties_sql(config))?;
        let mut rows = stmt.query([])?;
        let mut count = 0u64;

        while let Some(row) = rows.next()? {
            visit(RawPropertyRecord {
                account_num: row.get(0)?,
                tencode: row.get(1)?,
                location: row.get(2)?,
                address_suffix: row.get(3)?,
                unit: row.get(4)?,
            });
            count += 1;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcel_loader_config::{DEFAULT_CONFIG, LoaderConfig};

    fn source_config() -> SourceConfig {
        LoaderConfig::parse(DEFAULT_CONFIG).unwrap().source
    }

    fn seeded_db() -> SourceDb {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE properties (
                parcelno BIGINT,
                propertyid TEXT,
                location TEXT,
                suffix TEXT,
                unit TEXT
            );
            CREATE TABLE properties_owners (propertyid TEXT);
            CREATE TABLE owners (propertyid TEXT, name TEXT);

            INSERT INTO properties VALUES
                (881000100, 'P1', '1234 MARKET ST', NULL, NULL),
                (881000200, 'P2', '101 MAIN ST ', 'A', '0004'),
                (881000300, 'P3', NULL, NULL, NULL);

            INSERT INTO properties_owners VALUES ('P1'), ('P2');

            INSERT INTO owners VALUES
                ('P1', ' SMITH JOHN '),
                ('P1', 'ADAMS JANE'),
                ('P2', 'CITY OF PHILADELPHIA');",
        )
        .unwrap();
        SourceDb::from_connection(conn)
    }

    #[test]
    fn aggregates_trimmed_owner_names() {
        let db = seeded_db();
        let rows = db.read_owners(&source_config()).unwrap();

        assert_eq!(
            rows,
            vec![
                OwnerRow {
                    account_num: "881000100".to_string(),
                    owners: Some("ADAMS JANE|SMITH JOHN".to_string()),
                },
                OwnerRow {
                    account_num: "881000200".to_string(),
                    owners: Some("CITY OF PHILADELPHIA".to_string()),
                },
                OwnerRow {
                    account_num: "881000300".to_string(),
                    owners: None,
                },
            ]
        );
    }

    #[test]
    fn scans_every_property_as_text() {
        let db = seeded_db();
        let mut seen = Vec::new();
        let count = db
            .scan_properties(&source_config(), &mut |raw| seen.push(raw))
            .unwrap();

        assert_eq!(count, 3);
        seen.sort_by(|a, b| a.account_num.cmp(&b.account_num));

        assert_eq!(
            seen[1],
            RawPropertyRecord {
                account_num: Some("881000200".to_string()),
                tencode: Some("P2".to_string()),
                location: Some("101 MAIN ST ".to_string()),
                address_suffix: Some("A".to_string()),
                unit: Some("0004".to_string()),
            }
        );
        assert_eq!(seen[2].location, None);
    }

    #[test]
    fn properties_query_selects_mapped_columns() {
        assert_eq!(
            properties_sql(&source_config()),
            "SELECT CAST(parcelno AS VARCHAR), CAST(propertyid AS VARCHAR), \
             CAST(location AS VARCHAR), CAST(suffix AS VARCHAR), CAST(unit AS VARCHAR) \
             FROM properties"
        );
    }

    #[test]
    fn missing_table_is_an_error() {
        let db = SourceDb::from_connection(Connection::open_in_memory().unwrap());
        assert!(matches!(
            db.scan_properties(&source_config(), &mut |_| {}),
            Err(DbError::DuckDb(_))
        ));
    }
}
