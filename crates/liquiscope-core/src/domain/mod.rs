//! # Domain Models
//!
//! Value types shared by the cache reader, the selection pipeline and the
//! presentation shell.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Case-preserving asset identifier |
//! | [`TradeDate`] | Calendar date, `YYYY-MM-DD` on the wire |
//! | [`AssetRecord`] | One cached daily row |
//! | [`DateWindow`] | Inclusive date range, bounds optional |
//! | [`Selection`] | Symbol + window from one interaction |
//! | [`ThemeMode`] | Per-session display theme |
//!
//! Records are immutable once read: every query recomputes from the cache.

mod record;
mod selection;
mod symbol;
mod theme;
mod trade_date;

pub use record::{AssetRecord, ADJ_CLOSE_COLUMN, CONSUMED_COLUMNS};
pub use selection::{DateWindow, Selection};
pub use symbol::Symbol;
pub use theme::{ChartPalette, ThemeMode};
pub use trade_date::TradeDate;
