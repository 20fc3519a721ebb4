//! `DuckDB` connection handling for the read-only cache.
//!
//! The cache is opened fresh for every call and closed when the returned
//! connection is dropped. No connection outlives a single read.

use std::path::{Path, PathBuf};

use ::duckdb::{AccessMode, Config, Connection};
use tracing::debug;

use crate::WarehouseError;

/// Opens short-lived read-only connections to a cache file.
#[derive(Debug, Clone)]
pub struct CacheConnector {
    db_path: PathBuf,
}

impl CacheConnector {
    /// Create a connector for the given database file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: path.into(),
        }
    }

    /// Open a new read-only connection.
    ///
    /// # Errors
    /// Returns [`WarehouseError::CacheUnavailable`] if the file is missing or
    /// `DuckDB` refuses to open it.
    pub fn open(&self) -> Result<Connection, WarehouseError> {
        if !self.db_path.is_file() {
            return Err(WarehouseError::unavailable(
                &self.db_path,
                "cache file not found",
            ));
        }

        debug!(path = %self.db_path.display(), "opening cache connection");
        open_read_only(&self.db_path)
            .map_err(|error| WarehouseError::unavailable(&self.db_path, error))
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }
}

fn open_read_only(path: &Path) -> Result<Connection, ::duckdb::Error> {
    let config = Config::default().access_mode(AccessMode::ReadOnly)?;
    let connection = Connection::open_with_flags(path, config)?;
    connection.execute_batch("PRAGMA disable_progress_bar;")?;
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_unavailable() {
        let temp = tempdir().expect("tempdir");
        let connector = CacheConnector::new(temp.path().join("absent.duckdb"));

        let err = connector.open().expect_err("must fail");
        assert!(matches!(err, WarehouseError::CacheUnavailable { .. }));
    }

    #[test]
    fn read_only_connection_rejects_writes() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("cache.duckdb");
        {
            let seed = Connection::open(&path).expect("seed connection");
            seed.execute_batch("CREATE TABLE t (x INTEGER);")
                .expect("create table");
        }

        let connection = CacheConnector::new(&path).open().expect("open");
        let write = connection.execute_batch("INSERT INTO t VALUES (1);");
        assert!(write.is_err(), "read-only connection accepted a write");
    }
}
