//! Narrows the raw table to identifier columns plus day value columns.

use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::IDENTIFIER_COLUMNS;
use crate::table::{RawTable, WideRow, WideTable};

/// Keeps `ESTACION`, `MAGNITUD`, `ANO`, `MES` and every column whose name
/// starts with `day_prefix`, in source order, and types their cells.
///
/// Fails if an identifier column is absent or holds a non-integer cell.
/// Value cells that are empty or not numbers become missing values.
#[tracing::instrument(skip(raw), fields(rows = raw.len()))]
pub fn filter_columns(raw: &RawTable, day_prefix: &str) -> Result<WideTable> {
    let mut id_idx = [0usize; 4];
    for (slot, name) in id_idx.iter_mut().zip(IDENTIFIER_COLUMNS) {
        *slot = raw
            .column_index(name)
            .with_context(|| format!("required column '{name}' not found"))?;
    }

    let (day_idx, day_columns): (Vec<usize>, Vec<String>) = raw
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with(day_prefix))
        .map(|(i, h)| (i, h.clone()))
        .unzip();

    debug!(day_columns = day_columns.len(), "Day columns selected");

    let mut rows = Vec::with_capacity(raw.len());
    for (row_no, cells) in raw.rows.iter().enumerate() {
        let [station, pollutant, year, month] = id_idx;
        rows.push(WideRow {
            station: parse_id(cells, station, row_no, IDENTIFIER_COLUMNS[0])?,
            pollutant: parse_id(cells, pollutant, row_no, IDENTIFIER_COLUMNS[1])?,
            year: parse_id(cells, year, row_no, IDENTIFIER_COLUMNS[2])?,
            month: parse_id(cells, month, row_no, IDENTIFIER_COLUMNS[3])?,
            days: day_idx.iter().map(|&i| parse_value(&cells[i])).collect(),
        });
    }

    Ok(WideTable { day_columns, rows })
}

fn parse_id<T: FromStr>(cells: &[String], idx: usize, row_no: usize, column: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let cell = cells[idx].trim();
    cell.parse::<T>()
        .with_context(|| format!("row {}, column '{column}': '{cell}' is not an integer", row_no + 1))
}

/// Parses a measurement cell. Accepts `,` as decimal separator.
pub fn parse_value(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}
