//! Descriptive statistics over measurement values.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::queries::utility::{mean, quantile, sample_stddev};
use crate::table::{Measurement, MeasurementTable};

/// Count, mean, spread and five-number summary of a set of values.
///
/// `count` only includes non-missing values. Every other field is `None`
/// when `count` is zero, and `std` is also `None` for a single value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Summary {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        if sorted.is_empty() {
            return Summary::default();
        }
        sorted.sort_by(f64::total_cmp);

        let avg = mean(&sorted);
        Summary {
            count: sorted.len(),
            mean: Some(avg),
            std: sample_stddev(&sorted, avg),
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a Measurement>) -> Self {
        Self::from_values(rows.into_iter().filter_map(|m| m.value))
    }
}

/// Statistics per pollutant code, over every station and date.
pub fn summary_by_pollutant(table: &MeasurementTable) -> BTreeMap<u32, Summary> {
    table
        .group_by(|m| m.pollutant)
        .into_iter()
        .map(|(pollutant, rows)| (pollutant, Summary::from_rows(rows)))
        .collect()
}

/// Statistics per (station, pollutant) pair.
pub fn summary_by_station_pollutant(table: &MeasurementTable) -> BTreeMap<(u32, u32), Summary> {
    table
        .group_by(|m| (m.station, m.pollutant))
        .into_iter()
        .map(|(key, rows)| (key, Summary::from_rows(rows)))
        .collect()
}

/// Statistics for one station and pollutant. A pair with no rows yields a
/// summary with `count == 0`.
pub fn summary_for(table: &MeasurementTable, station: u32, pollutant: u32) -> Summary {
    Summary::from_rows(table.pair(station, pollutant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn m(station: u32, pollutant: u32, day: u32, value: Option<f64>) -> Measurement {
        Measurement {
            station,
            pollutant,
            year: 2019,
            month: 1,
            day,
            value,
            date: NaiveDate::from_ymd_opt(2019, 1, day).unwrap(),
        }
    }

    fn sample_table() -> MeasurementTable {
        MeasurementTable::from_rows(vec![
            m(4, 8, 1, Some(10.0)),
            m(4, 8, 2, Some(20.0)),
            m(4, 8, 3, None),
            m(4, 1, 1, Some(3.0)),
            m(5, 8, 1, Some(30.0)),
            m(5, 8, 2, Some(40.0)),
        ])
    }

    #[test]
    fn test_summary_from_values() {
        let s = Summary::from_values([4.0, 1.0, 3.0, 2.0]);

        assert_eq!(s.count, 4);
        assert_eq!(s.mean, Some(2.5));
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.q25, Some(1.75));
        assert_eq!(s.median, Some(2.5));
        assert_eq!(s.q75, Some(3.25));
        assert_eq!(s.max, Some(4.0));
        assert!((s.std.unwrap() - 1.2909944487358056).abs() < 1e-12);
    }

    #[test]
    fn test_summary_of_nothing_has_zero_count() {
        let s = Summary::from_values(std::iter::empty());

        assert_eq!(s.count, 0);
        assert_eq!(s.mean, None);
        assert_eq!(s.max, None);
    }

    #[test]
    fn test_single_value_has_no_std() {
        let s = Summary::from_values([5.0]);

        assert_eq!(s.count, 1);
        assert_eq!(s.std, None);
        assert_eq!(s.median, Some(5.0));
    }

    #[test]
    fn test_summary_by_pollutant_counts_non_missing_values() {
        let by_pollutant = summary_by_pollutant(&sample_table());

        assert_eq!(by_pollutant.len(), 2);
        assert_eq!(by_pollutant[&8].count, 4);
        assert_eq!(by_pollutant[&8].mean, Some(25.0));
        assert_eq!(by_pollutant[&1].count, 1);
    }

    #[test]
    fn test_summary_by_station_pollutant() {
        let by_pair = summary_by_station_pollutant(&sample_table());

        let keys: Vec<_> = by_pair.keys().copied().collect();
        assert_eq!(keys, vec![(4, 1), (4, 8), (5, 8)]);
        assert_eq!(by_pair[&(4, 8)].count, 2);
        assert_eq!(by_pair[&(5, 8)].mean, Some(35.0));
    }

    #[test]
    fn test_summary_for_unknown_pair_is_empty() {
        let table = sample_table();

        assert_eq!(summary_for(&table, 4, 8).mean, Some(15.0));
        assert_eq!(summary_for(&table, 99, 8).count, 0);
    }
}
