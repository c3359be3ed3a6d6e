//! Filesystem helpers for `DuckDB` database files.

use std::path::Path;

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensures the directory that will hold `db_path` exists.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_parent(db_path: &Path) -> std::io::Result<()> {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_parent() {
        let dir = std::env::temp_dir().join(format!("parcel_loader_paths_{}", std::process::id()));
        let db_path = dir.join("nested").join("out.duckdb");

        ensure_parent(&db_path).unwrap();
        assert!(db_path.parent().unwrap().is_dir());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bare_file_name_needs_no_parent() {
        ensure_parent(Path::new("out.duckdb")).unwrap();
    }
}
