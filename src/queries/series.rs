//! Date-indexed value series for one station and pollutant.

use chrono::NaiveDate;
use serde::Serialize;

use crate::table::MeasurementTable;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Values of `station`/`pollutant` dated within `[from, to]` (inclusive), in
/// ascending date order. Empty when nothing matches or `from > to`.
pub fn time_series(
    table: &MeasurementTable,
    station: u32,
    pollutant: u32,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<SeriesPoint> {
    let pair = table.pair(station, pollutant);
    let start = pair.partition_point(|m| m.date < from);
    let end = pair.partition_point(|m| m.date <= to);

    pair.get(start..end)
        .unwrap_or_default()
        .iter()
        .map(|m| SeriesPoint {
            date: m.date,
            value: m.value,
        })
        .collect()
}
