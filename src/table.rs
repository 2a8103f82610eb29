//! Typed tables flowing through the pipeline.
//!
//! ```text
//!  RawTable  ──filter──▶  WideTable  ──reshape──▶  Vec<LongRow>  ──dates──▶  MeasurementTable
//!  (strings)              (typed ids,              (one row per               (valid dates,
//!                          day columns)             station/pollutant/day)     sorted)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::queries::utility::mean;

// ---------------------------------------------------------------------------
// RawTable – concatenated file contents, every cell still text
// ---------------------------------------------------------------------------

/// Header plus text cells, as decoded from one or more source files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends `other` below `self`, aligning cells by column name.
    ///
    /// Columns only present in `other` are added to the right; cells of
    /// columns a side lacks are left empty.
    pub fn append(&mut self, other: RawTable) {
        let mapping: Vec<usize> = other
            .headers
            .iter()
            .map(|name| match self.column_index(name) {
                Some(idx) => idx,
                None => {
                    self.headers.push(name.clone());
                    self.headers.len() - 1
                }
            })
            .collect();

        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }

        for row in other.rows {
            let mut aligned = vec![String::new(); width];
            for (cell, &target) in row.into_iter().zip(&mapping) {
                aligned[target] = cell;
            }
            self.rows.push(aligned);
        }
    }
}

// ---------------------------------------------------------------------------
// WideTable – identifiers parsed, one value column per day of month
// ---------------------------------------------------------------------------

/// One station/pollutant/month record with its daily values.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub station: u32,
    pub pollutant: u32,
    pub year: i32,
    pub month: u32,
    /// One entry per column of [`WideTable::day_columns`], same order.
    pub days: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    /// Day column names in source order, e.g. `D01`, `D02`, ...
    pub day_columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LongRow – one day of one record, before date validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub station: u32,
    pub pollutant: u32,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub value: Option<f64>,
}

// ---------------------------------------------------------------------------
// MeasurementTable – the finalized, query-ready table
// ---------------------------------------------------------------------------

/// A single daily measurement with a valid calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub station: u32,
    pub pollutant: u32,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// `None` when the source cell was empty or not a number.
    pub value: Option<f64>,
    pub date: NaiveDate,
}

impl Measurement {
    /// The ordering key of a finalized table.
    pub fn sort_key(&self) -> (u32, u32, NaiveDate) {
        (self.station, self.pollutant, self.date)
    }
}

/// Measurements sorted ascending by (station, pollutant, date).
///
/// Only the date deriver builds one; queries borrow it read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTable {
    rows: Vec<Measurement>,
}

impl MeasurementTable {
    /// Sorts `rows` into the table's canonical order. The sort is stable, so
    /// duplicate keys keep their load order.
    pub fn from_rows(mut rows: Vec<Measurement>) -> Self {
        rows.sort_by_key(Measurement::sort_key);
        Self { rows }
    }

    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows for one (station, pollutant) pair, located by binary search.
    pub fn pair(&self, station: u32, pollutant: u32) -> &[Measurement] {
        let start = self
            .rows
            .partition_point(|m| (m.station, m.pollutant) < (station, pollutant));
        let end = self
            .rows
            .partition_point(|m| (m.station, m.pollutant) <= (station, pollutant));
        &self.rows[start..end]
    }

    pub fn group_by<K, F>(&self, key: F) -> BTreeMap<K, Vec<&Measurement>>
    where
        K: Ord,
        F: Fn(&Measurement) -> K,
    {
        group_by(self.rows.iter(), key)
    }
}

impl<'a> IntoIterator for &'a MeasurementTable {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Buckets `rows` by `key`, keeping row order inside each bucket.
pub fn group_by<'a, K, I, F>(rows: I, key: F) -> BTreeMap<K, Vec<&'a Measurement>>
where
    K: Ord,
    I: IntoIterator<Item = &'a Measurement>,
    F: Fn(&Measurement) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a Measurement>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(row)).or_default().push(row);
    }
    groups
}

// ---------------------------------------------------------------------------
// Matrix – result of a pivot
// ---------------------------------------------------------------------------

/// A dense row-key × column-key grid of optional values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix<R, C> {
    pub row_keys: Vec<R>,
    pub column_keys: Vec<C>,
    /// `cells[i][j]` belongs to `row_keys[i]` and `column_keys[j]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl<R: Ord, C: Ord> Matrix<R, C> {
    /// The cell at (`row`, `column`), or `None` if either key is absent or
    /// the cell itself is missing.
    pub fn get(&self, row: &R, column: &C) -> Option<f64> {
        let i = self.row_keys.binary_search(row).ok()?;
        let j = self.column_keys.binary_search(column).ok()?;
        self.cells[i][j]
    }

    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty()
    }
}

/// Groups `rows` by (`row_key`, `column_key`) and lays the mean of each
/// group's non-missing values out as a matrix. Axes hold only keys seen in
/// `rows`, ascending.
pub fn pivot_mean<'a, R, C, I, FR, FC>(rows: I, row_key: FR, column_key: FC) -> Matrix<R, C>
where
    R: Ord + Clone,
    C: Ord + Clone,
    I: IntoIterator<Item = &'a Measurement>,
    FR: Fn(&Measurement) -> R,
    FC: Fn(&Measurement) -> C,
{
    let groups = group_by(rows, |m| (row_key(m), column_key(m)));

    let row_keys: Vec<R> = groups
        .keys()
        .map(|(r, _)| r.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let column_keys: Vec<C> = groups
        .keys()
        .map(|(_, c)| c.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells = vec![vec![None; column_keys.len()]; row_keys.len()];
    for ((r, c), members) in &groups {
        let values: Vec<f64> = members.iter().filter_map(|m| m.value).collect();
        if values.is_empty() {
            continue;
        }
        // Both keys came from `groups`, so the searches cannot miss.
        if let (Ok(i), Ok(j)) = (row_keys.binary_search(r), column_keys.binary_search(c)) {
            cells[i][j] = Some(mean(&values));
        }
    }

    Matrix {
        row_keys,
        column_keys,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(station: u32, pollutant: u32, ymd: (i32, u32, u32), value: Option<f64>) -> Measurement {
        Measurement {
            station,
            pollutant,
            year: ymd.0,
            month: ymd.1,
            day: ymd.2,
            value,
            date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
        }
    }

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_append_same_columns_preserves_order() {
        let mut a = raw(&["A", "B"], &[&["1", "2"]]);
        a.append(raw(&["A", "B"], &[&["3", "4"], &["5", "6"]]));

        assert_eq!(a.headers, vec!["A", "B"]);
        assert_eq!(a.rows[0], vec!["1", "2"]);
        assert_eq!(a.rows[2], vec!["5", "6"]);
    }

    #[test]
    fn test_append_aligns_by_column_name() {
        let mut a = raw(&["A", "B"], &[&["1", "2"]]);
        a.append(raw(&["B", "C"], &[&["x", "y"]]));

        assert_eq!(a.headers, vec!["A", "B", "C"]);
        assert_eq!(a.rows[0], vec!["1", "2", ""]);
        assert_eq!(a.rows[1], vec!["", "x", "y"]);
    }

    #[test]
    fn test_from_rows_sorts_by_station_pollutant_date() {
        let table = MeasurementTable::from_rows(vec![
            m(8, 1, (2019, 1, 2), Some(1.0)),
            m(4, 8, (2019, 1, 1), Some(2.0)),
            m(4, 1, (2019, 3, 1), Some(3.0)),
            m(4, 1, (2018, 12, 31), Some(4.0)),
        ]);

        let keys: Vec<_> = table.iter().map(|r| (r.station, r.pollutant, r.year)).collect();
        assert_eq!(keys, vec![(4, 1, 2018), (4, 1, 2019), (4, 8, 2019), (8, 1, 2019)]);
    }

    #[test]
    fn test_pair_slices_exact_station_and_pollutant() {
        let table = MeasurementTable::from_rows(vec![
            m(4, 1, (2019, 1, 1), None),
            m(4, 8, (2019, 1, 1), None),
            m(4, 8, (2019, 1, 2), None),
            m(5, 8, (2019, 1, 1), None),
        ]);

        assert_eq!(table.pair(4, 8).len(), 2);
        assert!(table.pair(4, 8).iter().all(|r| r.station == 4 && r.pollutant == 8));
        assert!(table.pair(9, 9).is_empty());
    }

    #[test]
    fn test_pivot_mean_leaves_absent_and_all_missing_cells_empty() {
        let rows = vec![
            m(4, 8, (2019, 1, 1), Some(10.0)),
            m(4, 8, (2019, 1, 2), Some(20.0)),
            m(4, 8, (2019, 1, 3), None),
            m(5, 8, (2019, 2, 1), None),
            m(5, 8, (2019, 3, 1), Some(7.0)),
        ];

        let matrix = pivot_mean(&rows, |r| r.station, |r| r.month);

        assert_eq!(matrix.row_keys, vec![4, 5]);
        assert_eq!(matrix.column_keys, vec![1, 2, 3]);
        assert_eq!(matrix.get(&4, &1), Some(15.0));
        assert_eq!(matrix.get(&4, &3), None);
        assert_eq!(matrix.get(&5, &2), None);
        assert_eq!(matrix.get(&5, &3), Some(7.0));
        assert_eq!(matrix.get(&6, &1), None);
    }

    #[test]
    fn test_group_by_keeps_row_order_within_group() {
        let table = MeasurementTable::from_rows(vec![
            m(4, 8, (2019, 1, 2), Some(2.0)),
            m(4, 8, (2019, 1, 1), Some(1.0)),
            m(5, 8, (2019, 1, 1), Some(3.0)),
        ]);

        let groups = table.group_by(|r| r.pollutant);
        let values: Vec<_> = groups[&8].iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }
}
