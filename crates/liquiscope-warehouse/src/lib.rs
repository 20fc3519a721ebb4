//! # Liquiscope Warehouse
//!
//! Read-only access to the local liquidity cache.
//!
//! ## Overview
//!
//! The cache is a `DuckDB` file holding one table of per-symbol daily
//! records. This crate never writes to it: every call opens a fresh
//! read-only connection, runs one query and closes it again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use liquiscope_warehouse::{CacheConfig, CacheReader};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = CacheReader::open(CacheConfig::default())?;
//!
//!     for symbol in reader.list_symbols()? {
//!         let rows = reader.fetch_rows(&symbol)?;
//!         println!("{symbol}: {} rows", rows.row_count);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Security
//!
//! Symbols are always bound as query parameters. The table name is the only
//! interpolated identifier and is restricted to `[A-Za-z0-9_]`.
//!
//! ## Expected schema
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `symbol` | `VARCHAR` | asset identifier |
//! | `date` | `DATE` / `TIMESTAMP` / `VARCHAR` | trading day |
//! | `adj_close` | `DOUBLE` | adjusted close |
//! | `amihud` | `DOUBLE` | illiquidity measure |
//! | `z_score` | `DOUBLE` | normalized illiquidity |
//!
//! Any further columns are returned untouched.
//!
//! ## Bringing an existing SQLite cache
//!
//! Only `DuckDB` files are read. A cache written as SQLite (for example a
//! `liquidity_cache.db`) cannot be opened directly; copy it into a `DuckDB`
//! file once with the `sqlite` extension:
//!
//! ```sql
//! -- duckdb liquidity_cache.duckdb
//! INSTALL sqlite; LOAD sqlite;
//! CREATE TABLE asset_data AS
//!     SELECT * FROM sqlite_scan('liquidity_cache.db', 'asset_data');
//! ```
//!
//! Then point `LIQUISCOPE_CACHE` (or `--cache`) at the new file.

pub mod duckdb;
mod error;

use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

use ::duckdb::params;
use ::duckdb::types::{TimeUnit, Value as DuckValue};
use serde::Serialize;
use serde_json::{Number, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::debug;

pub use crate::duckdb::CacheConnector;
pub use crate::error::WarehouseError;

/// Default cache file name, relative to the working directory. This is a
/// `DuckDB` file; SQLite caches must be converted first (see crate docs).
pub const DEFAULT_CACHE_FILE: &str = "liquidity_cache.duckdb";

/// Default name of the table holding asset records.
pub const DEFAULT_TABLE: &str = "asset_data";

/// Julian day number of 1970-01-01.
const UNIX_EPOCH_JULIAN_DAY: i32 = 2_440_588;

/// Configuration for the cache reader.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Path to the `DuckDB` cache file.
    pub db_path: PathBuf,
    /// Table holding the asset records.
    pub table: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: resolve_cache_path(),
            table: resolve_table(),
        }
    }
}

impl CacheConfig {
    /// Config for a specific file with the default table.
    pub fn at(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            table: String::from(DEFAULT_TABLE),
        }
    }
}

/// Column metadata for query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlColumn {
    /// Column name.
    pub name: String,
    /// Column data type.
    #[serde(rename = "type")]
    pub r#type: String,
}

/// Rows read from the cache, in the cache's native order.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Column definitions.
    pub columns: Vec<SqlColumn>,
    /// Row data as JSON values, one entry per column.
    pub rows: Vec<Vec<Value>>,
    /// Number of rows returned.
    pub row_count: usize,
}

/// Reads symbols and per-symbol rows from the cache.
#[derive(Debug, Clone)]
pub struct CacheReader {
    connector: CacheConnector,
    table: String,
}

impl CacheReader {
    /// Create a reader. The file itself is only touched when a query runs.
    ///
    /// # Errors
    /// Returns [`WarehouseError::InvalidTable`] if the table name is not a
    /// plain identifier.
    pub fn open(config: CacheConfig) -> Result<Self, WarehouseError> {
        if !is_plain_identifier(&config.table) {
            return Err(WarehouseError::InvalidTable(config.table));
        }

        Ok(Self {
            connector: CacheConnector::new(config.db_path),
            table: config.table,
        })
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.connector.db_path()
    }

    /// Get the table name this reader queries.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Distinct symbols present in the cache.
    ///
    /// # Errors
    /// Returns [`WarehouseError::CacheUnavailable`] if the cache cannot be
    /// opened or queried.
    pub fn list_symbols(&self) -> Result<BTreeSet<String>, WarehouseError> {
        let connection = self.connector.open()?;
        let unavailable =
            |error: ::duckdb::Error| WarehouseError::unavailable(self.connector.db_path(), error);

        let sql = format!(
            "SELECT DISTINCT CAST(symbol AS VARCHAR) FROM {} WHERE symbol IS NOT NULL",
            self.table
        );
        let mut statement = connection.prepare(&sql).map_err(unavailable)?;
        let symbols = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(unavailable)?
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(unavailable)?;

        debug!(count = symbols.len(), "listed cache symbols");
        Ok(symbols)
    }

    /// All rows for `symbol`. An unknown symbol yields an empty result.
    ///
    /// # Errors
    /// Returns [`WarehouseError::CacheUnavailable`] if the cache cannot be
    /// opened or queried.
    pub fn fetch_rows(&self, symbol: &str) -> Result<QueryResult, WarehouseError> {
        let connection = self.connector.open()?;
        let unavailable =
            |error: ::duckdb::Error| WarehouseError::unavailable(self.connector.db_path(), error);

        let sql = format!("SELECT * FROM {} WHERE symbol = ?", self.table);
        let mut statement = connection.prepare(&sql).map_err(unavailable)?;

        // Column metadata is only available once the statement has run, so
        // it is read through the cursor of the single execution.
        let mut rows_cursor = statement.query(params![symbol]).map_err(unavailable)?;
        let columns = match rows_cursor.as_ref() {
            Some(executed) => column_metadata(executed).map_err(unavailable)?,
            None => Vec::new(),
        };
        let column_count = columns.len();

        let mut rows = Vec::new();
        while let Some(row) = rows_cursor.next().map_err(unavailable)? {
            rows.push(read_row(row, column_count).map_err(unavailable)?);
        }

        debug!(symbol, rows = rows.len(), "fetched cache rows");
        Ok(QueryResult {
            columns,
            row_count: rows.len(),
            rows,
        })
    }
}

/// Names and types of an executed statement's result columns.
fn column_metadata(statement: &::duckdb::Statement<'_>) -> Result<Vec<SqlColumn>, ::duckdb::Error> {
    (0..statement.column_count())
        .map(|index| {
            Ok(SqlColumn {
                name: statement.column_name(index)?.to_string(),
                r#type: statement.column_type(index).to_string(),
            })
        })
        .collect()
}

/// Read a single row from the result set.
fn read_row(row: &::duckdb::Row<'_>, column_count: usize) -> Result<Vec<Value>, ::duckdb::Error> {
    let mut output = Vec::with_capacity(column_count);
    for index in 0..column_count {
        let value: DuckValue = row.get(index)?;
        output.push(to_json_value(value));
    }
    Ok(output)
}

/// Convert a DuckDB value to a JSON value.
fn to_json_value(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(value) => Value::Bool(value),
        DuckValue::TinyInt(value) => Value::Number(Number::from(value)),
        DuckValue::SmallInt(value) => Value::Number(Number::from(value)),
        DuckValue::Int(value) => Value::Number(Number::from(value)),
        DuckValue::BigInt(value) => Value::Number(Number::from(value)),
        DuckValue::UTinyInt(value) => Value::Number(Number::from(value)),
        DuckValue::USmallInt(value) => Value::Number(Number::from(value)),
        DuckValue::UInt(value) => Value::Number(Number::from(value)),
        DuckValue::UBigInt(value) => Value::Number(Number::from(value)),
        DuckValue::Float(value) => number_from_f64(f64::from(value)),
        DuckValue::Double(value) => number_from_f64(value),
        DuckValue::Decimal(value) => value
            .to_string()
            .parse::<f64>()
            .map(number_from_f64)
            .unwrap_or(Value::Null),
        DuckValue::Text(value) => Value::String(value),
        DuckValue::Blob(value) => Value::String(hex::encode(value)),
        DuckValue::Date32(days) => date_from_epoch_days(days)
            .map(Value::String)
            .unwrap_or(Value::Null),
        DuckValue::Timestamp(unit, value) => timestamp_to_rfc3339(unit, value)
            .map(Value::String)
            .unwrap_or(Value::Null),
        other => Value::String(format!("{other:?}")),
    }
}

/// Convert an f64 to a JSON number, returning Null for NaN/Inf.
fn number_from_f64(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Format a `DATE` cell (days since the Unix epoch) as `YYYY-MM-DD`.
fn date_from_epoch_days(days: i32) -> Option<String> {
    let date = Date::from_julian_day(UNIX_EPOCH_JULIAN_DAY.checked_add(days)?).ok()?;
    date.format(format_description!("[year]-[month]-[day]")).ok()
}

/// Format a `TIMESTAMP` cell as RFC 3339 in UTC.
fn timestamp_to_rfc3339(unit: TimeUnit, value: i64) -> Option<String> {
    let value = i128::from(value);
    let nanos = match unit {
        TimeUnit::Second => value * 1_000_000_000,
        TimeUnit::Millisecond => value * 1_000_000,
        TimeUnit::Microsecond => value * 1_000,
        TimeUnit::Nanosecond => value,
    };
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()?
        .format(&Rfc3339)
        .ok()
}

/// True for non-empty `[A-Za-z0-9_]` names not starting with a digit.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Resolve the cache path from the environment or the default file name.
fn resolve_cache_path() -> PathBuf {
    if let Some(path) = env::var_os("LIQUISCOPE_CACHE") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    PathBuf::from(DEFAULT_CACHE_FILE)
}

fn resolve_table() -> String {
    env::var("LIQUISCOPE_CACHE_TABLE")
        .ok()
        .filter(|table| !table.trim().is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_TABLE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::duckdb::Connection;
    use tempfile::tempdir;

    fn seed_cache(path: &Path) {
        let connection = Connection::open(path).expect("seed connection");
        connection
            .execute_batch(
                r"
CREATE TABLE asset_data (
    symbol VARCHAR,
    date DATE,
    adj_close DOUBLE,
    amihud DOUBLE,
    z_score DOUBLE,
    volume BIGINT
);
INSERT INTO asset_data VALUES
    ('AAA', DATE '2024-01-02', 10.5, 0.001, 0.3, 1000),
    ('AAA', DATE '2024-01-01', 10.0, 0.002, -0.1, 1200),
    ('2330.TW', DATE '2024-01-01', 580.0, NULL, 1.2, 5000),
    ('BBB', DATE '2024-01-01', 42.0, 0.004, 0.0, NULL);
",
            )
            .expect("seed rows");
    }

    #[test]
    fn lists_distinct_symbols_in_order() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("cache.duckdb");
        seed_cache(&path);

        let reader = CacheReader::open(CacheConfig::at(&path)).expect("reader");
        let symbols = reader.list_symbols().expect("symbols");

        let symbols: Vec<_> = symbols.into_iter().collect();
        assert_eq!(symbols, vec!["2330.TW", "AAA", "BBB"]);
    }

    #[test]
    fn fetch_rows_returns_native_order_with_all_columns() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("cache.duckdb");
        seed_cache(&path);

        let reader = CacheReader::open(CacheConfig::at(&path)).expect("reader");
        let result = reader.fetch_rows("AAA").expect("rows");

        let names: Vec<_> = result.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["symbol", "date", "adj_close", "amihud", "z_score", "volume"]
        );
        assert_eq!(result.row_count, 2);
        assert_eq!(result.rows[0][1], Value::String(String::from("2024-01-02")));
        assert_eq!(result.rows[1][1], Value::String(String::from("2024-01-01")));
        assert_eq!(result.rows[1][5], Value::Number(Number::from(1200)));
    }

    #[test]
    fn null_cells_stay_null() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("cache.duckdb");
        seed_cache(&path);

        let reader = CacheReader::open(CacheConfig::at(&path)).expect("reader");
        let result = reader.fetch_rows("2330.TW").expect("rows");

        assert_eq!(result.row_count, 1);
        assert_eq!(result.rows[0][3], Value::Null);
    }

    #[test]
    fn unknown_symbol_is_empty_not_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("cache.duckdb");
        seed_cache(&path);

        let reader = CacheReader::open(CacheConfig::at(&path)).expect("reader");
        let result = reader.fetch_rows("ZZZ").expect("unknown symbol must not fail");

        assert_eq!(result.row_count, 0);
        assert!(result.rows.is_empty());
    }

    #[test]
    fn single_execution_reports_columns_with_and_without_rows() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("cache.duckdb");
        seed_cache(&path);

        let reader = CacheReader::open(CacheConfig::at(&path)).expect("reader");
        let hit = reader.fetch_rows("BBB").expect("rows");
        let miss = reader.fetch_rows("ZZZ").expect("rows");

        assert_eq!(hit.columns, miss.columns);
        assert_eq!(miss.columns.len(), 6);
        assert_eq!(miss.columns[1].name, "date");
        assert_eq!(hit.rows[0].len(), hit.columns.len());
    }

    #[test]
    fn symbol_is_bound_as_parameter() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("cache.duckdb");
        seed_cache(&path);

        let reader = CacheReader::open(CacheConfig::at(&path)).expect("reader");
        let result = reader
            .fetch_rows("AAA' OR '1'='1")
            .expect("query should still run");

        assert_eq!(result.row_count, 0);
    }

    #[test]
    fn missing_file_is_cache_unavailable() {
        let temp = tempdir().expect("tempdir");
        let reader =
            CacheReader::open(CacheConfig::at(temp.path().join("missing.duckdb"))).expect("reader");

        let err = reader.list_symbols().expect_err("must fail");
        assert!(matches!(err, WarehouseError::CacheUnavailable { .. }));

        let err = reader.fetch_rows("AAA").expect_err("must fail");
        assert!(matches!(err, WarehouseError::CacheUnavailable { .. }));
    }

    #[test]
    fn missing_table_is_cache_unavailable() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("cache.duckdb");
        {
            let connection = Connection::open(&path).expect("seed connection");
            connection
                .execute_batch("CREATE TABLE other (x INTEGER);")
                .expect("create table");
        }

        let reader = CacheReader::open(CacheConfig::at(&path)).expect("reader");
        let err = reader.fetch_rows("AAA").expect_err("must fail");
        assert!(matches!(err, WarehouseError::CacheUnavailable { .. }));
    }

    #[test]
    fn rejects_table_names_that_are_not_identifiers() {
        let err = CacheReader::open(CacheConfig {
            db_path: PathBuf::from("cache.duckdb"),
            table: String::from("asset_data; DROP TABLE asset_data"),
        })
        .expect_err("must fail");

        assert!(matches!(err, WarehouseError::InvalidTable(_)));
    }

    #[test]
    fn converts_epoch_days_and_timestamps() {
        assert_eq!(date_from_epoch_days(0).as_deref(), Some("1970-01-01"));
        assert_eq!(date_from_epoch_days(19_723).as_deref(), Some("2024-01-01"));
        assert_eq!(
            timestamp_to_rfc3339(TimeUnit::Microsecond, 1_704_067_200_000_000).as_deref(),
            Some("2024-01-01T00:00:00Z")
        );
    }
}
