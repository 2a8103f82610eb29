//! Console rendering of query results.
//!
//! Supports `tabled` text tables and pretty-printed JSON. Everything is
//! written to a caller-supplied writer so the binary can target stdout and
//! tests can target a buffer.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::{Alignment, Style};
use tracing::debug;

use crate::queries::{Catalog, SeriesPoint, Summary};
use crate::table::Matrix;

/// Column headers of a summary table, after the group key column(s).
const SUMMARY_HEADERS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Writes any serializable result as pretty JSON followed by a newline.
pub fn write_json<W: Write>(w: &mut W, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

pub fn write_catalog<W: Write>(w: &mut W, catalog: &Catalog) -> Result<()> {
    writeln!(w, "Stations: {}", join(&catalog.stations))?;
    writeln!(w, "Pollutants: {}", join(&catalog.pollutants))?;
    Ok(())
}

/// One row per group: the key columns, then count/mean/std/quartiles.
pub fn write_summaries<'a, W, K>(
    w: &mut W,
    key_headers: &[&str],
    rows: impl IntoIterator<Item = (K, &'a Summary)>,
) -> Result<()>
where
    W: Write,
    K: KeyCells,
{
    let mut header: Vec<String> = key_headers.iter().map(|h| h.to_string()).collect();
    header.extend(SUMMARY_HEADERS.iter().map(|h| h.to_string()));

    let body: Vec<Vec<String>> = rows
        .into_iter()
        .map(|(key, s)| {
            let mut cells = key.cells();
            cells.extend(summary_cells(s));
            cells
        })
        .collect();

    debug!(rows = body.len(), "Writing summary table");
    write_table(w, header, body)
}

/// A single summary laid out vertically, one statistic per line.
pub fn write_summary<W: Write>(w: &mut W, summary: &Summary) -> Result<()> {
    let body: Vec<Vec<String>> = SUMMARY_HEADERS
        .iter()
        .zip(summary_cells(summary))
        .map(|(name, value)| vec![name.to_string(), value])
        .collect();
    write_table(w, vec!["statistic".to_string(), "value".to_string()], body)
}

pub fn write_series<W: Write>(w: &mut W, series: &[SeriesPoint]) -> Result<()> {
    if series.is_empty() {
        writeln!(w, "(no measurements)")?;
        return Ok(());
    }
    let body: Vec<Vec<String>> = series
        .iter()
        .map(|p| vec![p.date.format("%Y-%m-%d").to_string(), cell(p.value)])
        .collect();
    write_table(w, vec!["date".to_string(), "value".to_string()], body)
}

/// Writes a pivot with `corner` above the row keys and column keys across.
pub fn write_matrix<W, R, C>(w: &mut W, corner: &str, matrix: &Matrix<R, C>) -> Result<()>
where
    W: Write,
    R: Display,
    C: Display,
{
    if matrix.row_keys.is_empty() {
        writeln!(w, "(no measurements)")?;
        return Ok(());
    }

    let mut header = vec![corner.to_string()];
    header.extend(matrix.column_keys.iter().map(|c| c.to_string()));

    let body: Vec<Vec<String>> = matrix
        .row_keys
        .iter()
        .zip(&matrix.cells)
        .map(|(key, row)| {
            let mut cells = vec![key.to_string()];
            cells.extend(row.iter().map(|v| cell(*v)));
            cells
        })
        .collect();

    write_table(w, header, body)
}

/// Group keys that render as one or more leading table cells.
pub trait KeyCells {
    fn cells(&self) -> Vec<String>;
}

impl KeyCells for u32 {
    fn cells(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl KeyCells for (u32, u32) {
    fn cells(&self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl<K: KeyCells> KeyCells for &K {
    fn cells(&self) -> Vec<String> {
        K::cells(*self)
    }
}

fn summary_cells(s: &Summary) -> Vec<String> {
    vec![
        s.count.to_string(),
        cell(s.mean),
        cell(s.std),
        cell(s.min),
        cell(s.q25),
        cell(s.median),
        cell(s.q75),
        cell(s.max),
    ]
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "NaN".to_string(),
    }
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders a header row and body rows as a rounded, right-aligned table.
fn write_table<W: Write>(w: &mut W, header: Vec<String>, body: Vec<Vec<String>>) -> Result<()> {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in body {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.with(Alignment::right());

    writeln!(w, "{table}")?;
    Ok(())
}
