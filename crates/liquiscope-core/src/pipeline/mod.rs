//! # Selection pipeline
//!
//! One user interaction in, three display payloads out:
//!
//! ```text
//! Selection ──▶ RecordSource::fetch_record_set ──▶ filter_by_date ──┬─▶ price chart
//!                                                               ├─▶ liquidity chart
//!                                                               └─▶ table payload
//! ```
//!
//! Nothing is cached between calls. Each render reads the source afresh.

pub mod chart;
pub mod filter;
pub mod table;

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::cache::RecordSource;
use crate::{AssetRecord, CoreError, Selection, Symbol, ThemeMode};

pub use chart::{build_liquidity_chart, build_price_chart, ChartKind, ChartSpec};
pub use filter::filter_by_date;
pub use table::{build_table_payload, build_table_with_columns, TableColumn, TablePayload};

/// Everything the dashboard shows for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub theme: ThemeMode,
    pub price_chart: ChartSpec,
    pub liquidity_chart: ChartSpec,
    pub table: TablePayload,
}

impl DashboardView {
    /// Blank charts and a table with no columns: nothing is selected.
    pub fn empty(theme: ThemeMode) -> Self {
        Self {
            theme,
            price_chart: ChartSpec::blank(ChartKind::Price, theme),
            liquidity_chart: ChartSpec::blank(ChartKind::Liquidity, theme),
            table: TablePayload::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price_chart.is_empty() && self.liquidity_chart.is_empty() && self.table.is_empty()
    }
}

/// Build all three payloads from already filtered records.
pub fn project(symbol: &Symbol, records: &[AssetRecord], theme: ThemeMode) -> DashboardView {
    project_with_columns(symbol, &[], records, theme)
}

/// [`project`] with the source's passthrough columns kept in the table even
/// when `records` is empty.
pub fn project_with_columns(
    symbol: &Symbol,
    extra_columns: &[String],
    records: &[AssetRecord],
    theme: ThemeMode,
) -> DashboardView {
    DashboardView {
        theme,
        price_chart: build_price_chart(symbol, records, theme),
        liquidity_chart: build_liquidity_chart(symbol, records, theme),
        table: build_table_with_columns(extra_columns, records),
    }
}

/// What to show when a symbol is selected but no date is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnboundedWindow {
    /// Show nothing until both dates are picked.
    #[default]
    Empty,
    /// Show the symbol's full history when neither date is picked. A window
    /// with only one bound still shows nothing.
    FullHistory,
}

impl UnboundedWindow {
    /// `LIQUISCOPE_FULL_HISTORY=1` (or `true`) selects [`Self::FullHistory`].
    pub fn from_env() -> Self {
        match std::env::var("LIQUISCOPE_FULL_HISTORY") {
            Ok(value) if value == "1" || value.eq_ignore_ascii_case("true") => Self::FullHistory,
            _ => Self::Empty,
        }
    }
}

/// Selector entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolOption {
    pub label: String,
    pub value: String,
}

impl From<&Symbol> for SymbolOption {
    fn from(symbol: &Symbol) -> Self {
        Self {
            label: symbol.to_string(),
            value: symbol.to_string(),
        }
    }
}

/// The dashboard pipeline over a record source.
#[derive(Debug, Clone)]
pub struct Dashboard<S> {
    source: S,
    unbounded: UnboundedWindow,
}

impl<S: RecordSource> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            unbounded: UnboundedWindow::default(),
        }
    }

    #[must_use]
    pub fn with_unbounded_window(mut self, policy: UnboundedWindow) -> Self {
        self.unbounded = policy;
        self
    }

    pub fn unbounded_window(&self) -> UnboundedWindow {
        self.unbounded
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Symbols available for selection.
    pub fn catalog(&self) -> Result<BTreeSet<Symbol>, CoreError> {
        self.source.list_symbols()
    }

    /// Catalog as selector entries, sorted.
    pub fn symbol_options(&self) -> Result<Vec<SymbolOption>, CoreError> {
        Ok(self.catalog()?.iter().map(SymbolOption::from).collect())
    }

    /// Run the pipeline for one selection.
    ///
    /// No symbol, or a window the policy does not cover, renders an empty
    /// view without touching the source.
    ///
    /// # Errors
    /// Returns [`CoreError::Cache`] if the source cannot be read and
    /// [`CoreError::Validation`] if a cached row cannot be mapped.
    #[instrument(skip_all, fields(symbol = ?selection.symbol, %theme))]
    pub fn render(&self, selection: &Selection, theme: ThemeMode) -> Result<DashboardView, CoreError> {
        let Some(symbol) = selection.symbol.as_ref() else {
            debug!("no symbol selected");
            return Ok(DashboardView::empty(theme));
        };

        let window = selection.window;
        let full_history = self.unbounded == UnboundedWindow::FullHistory && window.is_unbounded();
        if !window.is_complete() && !full_history {
            debug!("date window incomplete");
            return Ok(DashboardView::empty(theme));
        }

        let set = self.source.fetch_record_set(symbol)?;
        let kept = if full_history {
            set.records
        } else {
            filter_by_date(&set.records, window.start, window.end)
        };

        debug!(rows = kept.len(), "rendering dashboard");
        Ok(project_with_columns(symbol, &set.extra_columns, &kept, theme))
    }
}
