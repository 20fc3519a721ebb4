use serde::Serialize;

use crate::{Symbol, TradeDate, ValidationError};

/// Inclusive `[start, end]` date range picked by the user. Either bound may
/// be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: Option<TradeDate>,
    pub end: Option<TradeDate>,
}

impl DateWindow {
    /// Build a window, rejecting `start > end`.
    pub fn new(start: Option<TradeDate>, end: Option<TradeDate>) -> Result<Self, ValidationError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ValidationError::InvertedDateWindow { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Window with both bounds set.
    pub fn between(start: TradeDate, end: TradeDate) -> Result<Self, ValidationError> {
        Self::new(Some(start), Some(end))
    }

    /// Parse optional `YYYY-MM-DD` bounds; blank strings count as unset.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, ValidationError> {
        Self::new(parse_bound(start)?, parse_bound(end)?)
    }

    /// Both bounds are present.
    pub const fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Neither bound is present.
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: TradeDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        }
    }
}

fn parse_bound(value: Option<&str>) -> Result<Option<TradeDate>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => TradeDate::parse(text).map(Some),
    }
}

/// What the user has selected in one interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub symbol: Option<Symbol>,
    pub window: DateWindow,
}

impl Selection {
    pub fn new(symbol: Option<Symbol>, window: DateWindow) -> Self {
        Self { symbol, window }
    }

    /// Parse raw widget values; blank values count as unselected.
    pub fn parse(
        symbol: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let symbol = match symbol.map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(Symbol::parse(text)?),
        };
        Ok(Self {
            symbol,
            window: DateWindow::parse(start, end)?,
        })
    }
}
