use liquiscope_warehouse::SqlColumn;
use serde::Serialize;
use serde_json::Value;

use crate::{Symbol, TradeDate, ValidationError};

/// Cache column holding the adjusted close.
pub const ADJ_CLOSE_COLUMN: &str = "adj_close";

/// Cache columns mapped onto named record fields. Any other column passes
/// through untouched.
pub const CONSUMED_COLUMNS: [&str; 5] = ["symbol", "date", ADJ_CLOSE_COLUMN, "amihud", "z_score"];

/// One cached daily row for a symbol.
///
/// Numeric fields are `None` where the cache holds `NULL`; no range checks
/// are applied. Columns beyond the five consumed ones are kept in `extra`
/// in cache column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRecord {
    pub symbol: Symbol,
    pub date: TradeDate,
    pub adjusted_close: Option<f64>,
    pub amihud: Option<f64>,
    pub z_score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, Value)>,
}

impl AssetRecord {
    pub fn new(
        symbol: Symbol,
        date: TradeDate,
        adjusted_close: Option<f64>,
        amihud: Option<f64>,
        z_score: Option<f64>,
    ) -> Self {
        Self {
            symbol,
            date,
            adjusted_close,
            amihud,
            z_score,
            extra: Vec::new(),
        }
    }

    /// Attach a passthrough column.
    pub fn with_extra(mut self, column: impl Into<String>, value: Value) -> Self {
        self.extra.push((column.into(), value));
        self
    }

    /// Value of a passthrough column, if the record carries it.
    pub fn extra_value(&self, column: &str) -> Option<&Value> {
        self.extra
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Build a record from one raw cache row.
    pub fn from_row(columns: &[SqlColumn], row: &[Value]) -> Result<Self, ValidationError> {
        if columns.len() != row.len() {
            return Err(ValidationError::RowWidthMismatch {
                expected: columns.len(),
                actual: row.len(),
            });
        }

        let mut symbol = None;
        let mut date = None;
        let mut adjusted_close = None;
        let mut amihud = None;
        let mut z_score = None;
        let mut extra = Vec::new();

        for (column, value) in columns.iter().zip(row) {
            match column.name.as_str() {
                "symbol" => symbol = Some(symbol_cell(value)?),
                "date" => date = Some(date_cell(value)?),
                ADJ_CLOSE_COLUMN => adjusted_close = Some(number_cell(ADJ_CLOSE_COLUMN, value)?),
                "amihud" => amihud = Some(number_cell("amihud", value)?),
                "z_score" => z_score = Some(number_cell("z_score", value)?),
                other => extra.push((other.to_owned(), value.clone())),
            }
        }

        Ok(Self {
            symbol: symbol.ok_or(ValidationError::MissingColumn { column: "symbol" })?,
            date: date.ok_or(ValidationError::MissingColumn { column: "date" })?,
            adjusted_close: adjusted_close.ok_or(ValidationError::MissingColumn {
                column: ADJ_CLOSE_COLUMN,
            })?,
            amihud: amihud.ok_or(ValidationError::MissingColumn { column: "amihud" })?,
            z_score: z_score.ok_or(ValidationError::MissingColumn { column: "z_score" })?,
            extra,
        })
    }
}

fn symbol_cell(value: &Value) -> Result<Symbol, ValidationError> {
    match value {
        Value::String(text) => Symbol::parse(text),
        other => Err(invalid("symbol", other)),
    }
}

fn date_cell(value: &Value) -> Result<TradeDate, ValidationError> {
    match value {
        Value::String(text) => TradeDate::parse(text),
        other => Err(invalid("date", other)),
    }
}

/// Numbers pass through as-is; numeric text is accepted, `NULL` is `None`.
fn number_cell(column: &str, value: &Value) -> Result<Option<f64>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(column, value)),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(column, value)),
        other => Err(invalid(column, other)),
    }
}

fn invalid(column: &str, value: &Value) -> ValidationError {
    ValidationError::InvalidColumnValue {
        column: column.to_owned(),
        value: value.to_string(),
    }
}
