use serde::Serialize;
use serde_json::{Map, Value};

use crate::AssetRecord;

/// Columns every record carries, in display order.
pub const BASE_COLUMNS: [&str; 5] = ["symbol", "date", "adjusted_close", "amihud", "z_score"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub name: String,
    pub id: String,
}

impl TableColumn {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            id: name.to_owned(),
        }
    }
}

/// Column descriptors plus one keyed map per row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TablePayload {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Map<String, Value>>,
}

impl TablePayload {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.id.as_str()).collect()
    }

    /// Cell values of one row in column order.
    pub fn row_values(&self, index: usize) -> Option<Vec<&Value>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .map(|column| row.get(&column.id).unwrap_or(&Value::Null))
                .collect(),
        )
    }
}

/// Turn records into a table.
///
/// The five base columns are always present. Passthrough columns follow in
/// first-seen order; rows lacking one get `null` in that cell.
pub fn build_table_payload(records: &[AssetRecord]) -> TablePayload {
    build_table_with_columns(&[], records)
}

/// Like [`build_table_payload`], but `known_extras` (the source's passthrough
/// columns, in source order) are listed even when no record carries them.
pub fn build_table_with_columns(known_extras: &[String], records: &[AssetRecord]) -> TablePayload {
    let mut extra_columns: Vec<&str> = Vec::new();
    let seen = known_extras
        .iter()
        .map(String::as_str)
        .chain(records.iter().flat_map(|record| record.extra.iter().map(|(name, _)| name.as_str())));
    for name in seen {
        if !BASE_COLUMNS.contains(&name) && !extra_columns.contains(&name) {
            extra_columns.push(name);
        }
    }

    let columns = BASE_COLUMNS
        .iter()
        .copied()
        .chain(extra_columns.iter().copied())
        .map(TableColumn::named)
        .collect();

    let rows = records
        .iter()
        .map(|record| table_row(record, &extra_columns))
        .collect();

    TablePayload { columns, rows }
}

fn table_row(record: &AssetRecord, extra_columns: &[&str]) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("symbol".into(), Value::String(record.symbol.to_string()));
    row.insert("date".into(), Value::String(record.date.to_string()));
    row.insert("adjusted_close".into(), number(record.adjusted_close));
    row.insert("amihud".into(), number(record.amihud));
    row.insert("z_score".into(), number(record.z_score));
    for column in extra_columns {
        let value = record.extra_value(column).cloned().unwrap_or(Value::Null);
        row.insert((*column).to_owned(), value);
    }
    row
}

// NaN and infinities have no JSON form; they render as null.
fn number(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}
