//! Record sources backing the dashboard pipeline.
//!
//! [`RecordSource`] is the seam between the pipeline and storage. The
//! production implementation is the `DuckDB` [`CacheReader`]; [`MemorySource`]
//! serves fixed records for tests and demos.
//!
//! Calls are blocking. Async callers should run them on a blocking thread.

use std::collections::BTreeSet;

use liquiscope_warehouse::CacheReader;
use tracing::debug;

use crate::{AssetRecord, CoreError, Symbol, CONSUMED_COLUMNS};

/// Records for one symbol together with the source's passthrough columns.
///
/// `extra_columns` is known even when `records` is empty, so a window that
/// matches no rows still describes the full table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub extra_columns: Vec<String>,
    pub records: Vec<AssetRecord>,
}

impl RecordSet {
    /// Derive the passthrough columns from the records themselves.
    pub fn from_records(records: Vec<AssetRecord>) -> Self {
        let mut extra_columns: Vec<String> = Vec::new();
        for (name, _) in records.iter().flat_map(|record| record.extra.iter()) {
            if !extra_columns.contains(name) {
                extra_columns.push(name.clone());
            }
        }
        Self {
            extra_columns,
            records,
        }
    }

    pub fn into_records(self) -> Vec<AssetRecord> {
        self.records
    }
}

/// Read access to cached asset records.
pub trait RecordSource: Send + Sync {
    /// Distinct symbols known to the source, sorted.
    fn list_symbols(&self) -> Result<BTreeSet<Symbol>, CoreError>;

    /// Every record for `symbol` in the source's native order. Unknown
    /// symbols yield an empty vector.
    fn fetch_records(&self, symbol: &Symbol) -> Result<Vec<AssetRecord>, CoreError>;

    /// Records plus passthrough column names. Sources with a schema should
    /// report its columns here; the default derives them from the records.
    fn fetch_record_set(&self, symbol: &Symbol) -> Result<RecordSet, CoreError> {
        self.fetch_records(symbol).map(RecordSet::from_records)
    }
}

impl RecordSource for CacheReader {
    fn list_symbols(&self) -> Result<BTreeSet<Symbol>, CoreError> {
        let raw = CacheReader::list_symbols(self)?;
        let mut symbols = BTreeSet::new();
        for value in raw {
            match Symbol::parse(&value) {
                Ok(symbol) => {
                    symbols.insert(symbol);
                }
                // A blank or malformed symbol can never be selected; leave it out.
                Err(error) => debug!(symbol = %value, %error, "skipping unusable cache symbol"),
            }
        }
        Ok(symbols)
    }

    fn fetch_records(&self, symbol: &Symbol) -> Result<Vec<AssetRecord>, CoreError> {
        self.fetch_record_set(symbol).map(RecordSet::into_records)
    }

    fn fetch_record_set(&self, symbol: &Symbol) -> Result<RecordSet, CoreError> {
        let result = self.fetch_rows(symbol.as_str())?;
        let records = result
            .rows
            .iter()
            .map(|row| AssetRecord::from_row(&result.columns, row))
            .collect::<Result<Vec<_>, _>>()?;
        let extra_columns = result
            .columns
            .into_iter()
            .map(|column| column.name)
            .filter(|name| !CONSUMED_COLUMNS.contains(&name.as_str()))
            .collect();

        Ok(RecordSet {
            extra_columns,
            records,
        })
    }
}

/// Fixed in-memory records.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<AssetRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<AssetRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemorySource {
    fn list_symbols(&self) -> Result<BTreeSet<Symbol>, CoreError> {
        Ok(self.records.iter().map(|record| record.symbol.clone()).collect())
    }

    fn fetch_records(&self, symbol: &Symbol) -> Result<Vec<AssetRecord>, CoreError> {
        Ok(self
            .records
            .iter()
            .filter(|record| &record.symbol == symbol)
            .cloned()
            .collect())
    }
}

impl<S: RecordSource + ?Sized> RecordSource for std::sync::Arc<S> {
    fn list_symbols(&self) -> Result<BTreeSet<Symbol>, CoreError> {
        (**self).list_symbols()
    }

    fn fetch_records(&self, symbol: &Symbol) -> Result<Vec<AssetRecord>, CoreError> {
        (**self).fetch_records(symbol)
    }

    fn fetch_record_set(&self, symbol: &Symbol) -> Result<RecordSet, CoreError> {
        (**self).fetch_record_set(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TradeDate;
    use duckdb::Connection;
    use liquiscope_warehouse::CacheConfig;
    use tempfile::TempDir;

    fn seed_cache(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("cache.duckdb");
        let connection = Connection::open(&path).expect("open cache");
        connection
            .execute_batch(
                "CREATE TABLE asset_data (symbol VARCHAR, date DATE, adj_close DOUBLE, \
                 amihud DOUBLE, z_score DOUBLE, volume BIGINT);
                 INSERT INTO asset_data VALUES
                   ('AAA', DATE '2024-01-02', 10.5, 0.001, 0.3, 1200),
                   ('AAA', DATE '2024-01-01', 10.0, NULL, -0.2, 900),
                   ('2330.TW', DATE '2024-01-01', 580.0, 0.0004, 1.1, 5000),
                   ('', DATE '2024-01-01', 1.0, 1.0, 1.0, 1);",
            )
            .expect("seed cache");
        path
    }

    fn symbol(value: &str) -> Symbol {
        Symbol::parse(value).expect("symbol")
    }

    #[test]
    fn cache_reader_maps_rows_in_native_order() {
        let dir = TempDir::new().expect("tempdir");
        let reader = CacheReader::open(CacheConfig::at(seed_cache(&dir))).expect("reader");

        let records = RecordSource::fetch_records(&reader, &symbol("AAA")).expect("records");

        let days: Vec<_> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(days, vec!["2024-01-02", "2024-01-01"]);
        assert_eq!(records[1].amihud, None);
        assert_eq!(records[0].extra_value("volume"), Some(&serde_json::json!(1200)));
    }

    #[test]
    fn cache_reader_skips_blank_symbols_in_catalog() {
        let dir = TempDir::new().expect("tempdir");
        let reader = CacheReader::open(CacheConfig::at(seed_cache(&dir))).expect("reader");

        let symbols = RecordSource::list_symbols(&reader).expect("symbols");

        let names: Vec<_> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["2330.TW", "AAA"]);
    }

    #[test]
    fn unknown_symbol_is_empty_not_error() {
        let dir = TempDir::new().expect("tempdir");
        let reader = CacheReader::open(CacheConfig::at(seed_cache(&dir))).expect("reader");

        let records = RecordSource::fetch_records(&reader, &symbol("ZZZ")).expect("records");
        assert!(records.is_empty());
    }

    #[test]
    fn unknown_symbol_still_reports_cache_columns() {
        let dir = TempDir::new().expect("tempdir");
        let reader = CacheReader::open(CacheConfig::at(seed_cache(&dir))).expect("reader");

        let set = RecordSource::fetch_record_set(&reader, &symbol("ZZZ")).expect("set");

        assert!(set.records.is_empty());
        assert_eq!(set.extra_columns, vec![String::from("volume")]);
    }

    #[test]
    fn memory_record_set_derives_columns_from_records() {
        let date = TradeDate::parse("2024-01-01").expect("date");
        let source = MemorySource::new(vec![AssetRecord::new(symbol("AAA"), date, None, None, None)
            .with_extra("volume", serde_json::json!(7))]);

        let set = source.fetch_record_set(&symbol("AAA")).expect("set");
        assert_eq!(set.extra_columns, vec![String::from("volume")]);
        assert_eq!(set.records.len(), 1);
    }

    #[test]
    fn missing_cache_is_unavailable() {
        let dir = TempDir::new().expect("tempdir");
        let reader =
            CacheReader::open(CacheConfig::at(dir.path().join("absent.duckdb"))).expect("reader");

        let error = RecordSource::list_symbols(&reader).expect_err("must fail");
        assert!(error.is_cache_unavailable());
    }

    #[test]
    fn memory_source_filters_by_exact_symbol() {
        let date = TradeDate::parse("2024-01-01").expect("date");
        let source = MemorySource::new(vec![
            AssetRecord::new(symbol("AAA"), date, Some(1.0), None, None),
            AssetRecord::new(symbol("aaa"), date, Some(2.0), None, None),
        ]);

        let records = source.fetch_records(&symbol("AAA")).expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(source.list_symbols().expect("symbols").len(), 2);
    }
}
