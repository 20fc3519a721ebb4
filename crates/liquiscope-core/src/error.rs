use liquiscope_warehouse::WarehouseError;
use thiserror::Error;

use crate::TradeDate;

/// Validation errors for user input and cache rows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character {ch:?} at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("start date {start} is after end date {end}")]
    InvertedDateWindow { start: TradeDate, end: TradeDate },

    #[error("theme must be 'dark' or 'light': '{value}'")]
    InvalidTheme { value: String },

    #[error("cache row is missing required column '{column}'")]
    MissingColumn { column: &'static str },
    #[error("cache column '{column}' holds an unusable value: {value}")]
    InvalidColumnValue { column: String, value: String },
    #[error("cache row has {actual} values for {expected} columns")]
    RowWidthMismatch { expected: usize, actual: usize },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Cache(#[from] WarehouseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// True when the cache store could not be opened or queried.
    pub fn is_cache_unavailable(&self) -> bool {
        matches!(self, Self::Cache(WarehouseError::CacheUnavailable { .. }))
    }
}
