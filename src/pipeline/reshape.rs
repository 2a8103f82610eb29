//! Wide-to-long pivot: one output row per input row and day column.

use anyhow::{Result, bail};
use tracing::debug;

use crate::table::{LongRow, WideTable};

/// Unpivots every day column of `wide` into its own [`LongRow`].
///
/// Output is grouped by day column first, then by input row, so
/// `len == wide.len() * wide.day_columns.len()`. A day column whose name is
/// not `day_prefix` followed by digits aborts the reshape.
#[tracing::instrument(skip(wide), fields(rows = wide.len(), day_columns = wide.day_columns.len()))]
pub fn reshape(wide: &WideTable, day_prefix: &str) -> Result<Vec<LongRow>> {
    let days = wide
        .day_columns
        .iter()
        .map(|name| day_number(name, day_prefix))
        .collect::<Result<Vec<u32>>>()?;

    let mut long = Vec::with_capacity(wide.len() * days.len());
    for (col, &day) in days.iter().enumerate() {
        for row in &wide.rows {
            long.push(LongRow {
                station: row.station,
                pollutant: row.pollutant,
                year: row.year,
                month: row.month,
                day,
                value: row.days.get(col).copied().flatten(),
            });
        }
    }

    debug!(rows = long.len(), "Reshaped to long form");
    Ok(long)
}

/// Extracts the day number from a column name such as `D07`.
pub fn day_number(column: &str, day_prefix: &str) -> Result<u32> {
    let Some(digits) = column.strip_prefix(day_prefix) else {
        bail!("day column '{column}' does not start with '{day_prefix}'");
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        bail!("day column '{column}' has no numeric day suffix");
    }
    Ok(digits.parse()?)
}
