use crate::{AssetRecord, DateWindow, TradeDate};

/// Keep the records dated within `[start, end]`, both ends inclusive.
///
/// Input order is preserved. If either bound is missing nothing is kept:
/// an unfiltered history is never shown.
pub fn filter_by_date(
    records: &[AssetRecord],
    start: Option<TradeDate>,
    end: Option<TradeDate>,
) -> Vec<AssetRecord> {
    let window = DateWindow { start, end };
    if !window.is_complete() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| window.contains(record.date))
        .cloned()
        .collect()
}
