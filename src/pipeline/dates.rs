//! Calendar date derivation and final ordering.

use chrono::NaiveDate;
use tracing::debug;

use crate::table::{LongRow, Measurement, MeasurementTable};

/// Builds a date for every row, drops rows whose (year, month, day) is not a
/// real calendar day and sorts the rest by (station, pollutant, date).
///
/// Returns the finalized table and the number of dropped rows.
#[tracing::instrument(skip(rows), fields(rows = rows.len()))]
pub fn derive_dates(rows: Vec<LongRow>) -> (MeasurementTable, usize) {
    let total = rows.len();

    let kept: Vec<Measurement> = rows
        .into_iter()
        .filter_map(|row| {
            let date = NaiveDate::from_ymd_opt(row.year, row.month, row.day)?;
            Some(Measurement {
                station: row.station,
                pollutant: row.pollutant,
                year: row.year,
                month: row.month,
                day: row.day,
                value: row.value,
                date,
            })
        })
        .collect();

    let dropped = total - kept.len();
    debug!(kept = kept.len(), dropped, "Dates derived");

    (MeasurementTable::from_rows(kept), dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn long(station: u32, year: i32, month: u32, day: u32) -> LongRow {
        LongRow {
            station,
            pollutant: 8,
            year,
            month,
            day,
            value: Some(1.0),
        }
    }

    #[test]
    fn test_invalid_dates_are_dropped() {
        let rows = vec![
            long(4, 2019, 2, 28),
            long(4, 2019, 2, 30),
            long(4, 2019, 4, 31),
            long(4, 2019, 1, 0),
            long(4, 2019, 13, 1),
            long(4, 2020, 2, 29),
        ];

        let (table, dropped) = derive_dates(rows);

        assert_eq!(dropped, 4);
        assert_eq!(table.len(), 2);
        assert!(!table.iter().any(|r| r.month == 2 && r.day == 30));
    }

    #[test]
    fn test_derived_date_matches_components_and_is_sorted() {
        let rows = vec![
            long(5, 2019, 1, 1),
            long(4, 2019, 3, 2),
            long(4, 2018, 12, 31),
            long(4, 2019, 3, 1),
        ];

        let (table, _) = derive_dates(rows);

        for r in &table {
            assert_eq!(
                (r.date.year(), r.date.month(), r.date.day()),
                (r.year, r.month, r.day)
            );
        }
        assert!(table.rows().windows(2).all(|w| w[0].sort_key() <= w[1].sort_key()));
        assert_eq!(table.rows()[0].date, NaiveDate::from_ymd_opt(2018, 12, 31).unwrap());
        assert_eq!(table.rows()[3].station, 5);
    }
}
