//! Per-parcel owner lookup.

use std::collections::BTreeMap;

use parcel_loader_property_models::OwnerRow;

/// Account number to pipe-joined owner names.
#[derive(Debug, Clone, Default)]
pub struct OwnerMap {
    owners: BTreeMap<String, String>,
}

impl OwnerMap {
    /// Builds the map from aggregated owner rows.
    ///
    /// A later row for the same account number replaces an earlier one. A
    /// `NULL` owner string is stored as empty.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = OwnerRow>) -> Self {
        let mut owners = BTreeMap::new();
        let mut duplicates = 0u64;

        for row in rows {
            if owners
                .insert(row.account_num, row.owners.unwrap_or_default())
                .is_some()
            {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            log::debug!("{duplicates} duplicate owner row(s) replaced an earlier entry");
        }

        Self { owners }
    }

    /// Owner string for `account_num`, or `""` when the parcel has none.
    #[must_use]
    pub fn owners(&self, account_num: &str) -> &str {
        self.owners.get(account_num).map_or("", String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(account_num: &str, owners: Option<&str>) -> OwnerRow {
        OwnerRow {
            account_num: account_num.to_string(),
            owners: owners.map(str::to_string),
        }
    }

    #[test]
    fn missing_account_yields_empty_string() {
        let map = OwnerMap::from_rows(vec![row("1", Some("SMITH JOHN"))]);
        assert_eq!(map.owners("1"), "SMITH JOHN");
        assert_eq!(map.owners("2"), "");
    }

    #[test]
    fn last_row_wins_for_duplicate_accounts() {
        let map = OwnerMap::from_rows(vec![
            row("1", Some("FIRST")),
            row("1", Some("SECOND")),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.owners("1"), "SECOND");
    }

    #[test]
    fn null_owner_string_is_empty() {
        let map = OwnerMap::from_rows(vec![row("1", None)]);
        assert_eq!(map.owners("1"), "");
        assert!(!map.is_empty());
    }
}
