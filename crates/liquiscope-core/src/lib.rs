//! # Liquiscope Core
//!
//! Domain types and the selection pipeline behind the liquidity dashboard.
//!
//! ## Overview
//!
//! - **Domain models** for symbols, trading dates, cached records and user
//!   selections
//! - **Record sources** over the read-only `DuckDB` cache
//! - **Pipeline** turning a selection into two charts and a table
//! - **Notifier** delivering alerts to a Telegram chat
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | `RecordSource` trait, cache and in-memory sources |
//! | [`domain`] | Symbol, TradeDate, AssetRecord, Selection, ThemeMode |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`notifier`] | Telegram alert delivery |
//! | [`pipeline`] | Date filter, chart and table projection |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use liquiscope_core::{CacheConfig, CacheReader, Dashboard, Selection, ThemeMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dashboard = Dashboard::new(CacheReader::open(CacheConfig::default())?);
//!
//!     let selection = Selection::parse(Some("AAA"), Some("2024-01-02"), Some("2024-01-04"))?;
//!     let view = dashboard.render(&selection, ThemeMode::Dark)?;
//!
//!     println!("{} table rows", view.table.rows.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use liquiscope_core::CoreError;
//!
//! fn describe(error: &CoreError) -> &'static str {
//!     match error {
//!         CoreError::Cache(_) => "cache unavailable, try again later",
//!         CoreError::Validation(_) => "bad input or malformed cache row",
//!         CoreError::Serialization(_) => "could not encode output",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Bot credentials are read from environment variables only and are
//!   redacted from debug output and failure reasons
//! - Symbols are bound as query parameters, never interpolated

pub mod cache;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod notifier;
pub mod pipeline;

// Record sources
pub use cache::{MemorySource, RecordSet, RecordSource};

// Domain models
pub use domain::{
    AssetRecord, ChartPalette, DateWindow, Selection, Symbol, ThemeMode, TradeDate,
    ADJ_CLOSE_COLUMN, CONSUMED_COLUMNS,
};

// Error types
pub use error::{CoreError, ValidationError};

// Warehouse (re-exported from liquiscope-warehouse)
pub use liquiscope_warehouse::{CacheConfig, CacheReader, QueryResult, SqlColumn, WarehouseError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};

// Notifier
pub use notifier::{DeliveryStatus, NotifierError, TelegramConfig, TelegramNotifier};

// Pipeline
pub use pipeline::{
    build_liquidity_chart, build_price_chart, build_table_payload, build_table_with_columns,
    filter_by_date, project, project_with_columns, ChartKind, ChartSpec, Dashboard, DashboardView,
    SymbolOption, TableColumn, TablePayload, UnboundedWindow,
};
