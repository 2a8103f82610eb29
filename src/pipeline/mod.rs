//! The extract-transform stages, leaves first.
//!
//! ```text
//!   sources ──▶ loader ──▶ filter ──▶ reshape ──▶ dates ──▶ MeasurementTable
//! ```
//!
//! [`run`] chains the stages and reports what each one kept or dropped.

pub mod dates;
pub mod filter;
pub mod reshape;

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::loader::load_sources;
use crate::table::MeasurementTable;

pub use dates::derive_dates;
pub use filter::filter_columns;
pub use reshape::reshape;

/// Row counts and file outcomes of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub files_loaded: Vec<PathBuf>,
    pub files_missing: Vec<PathBuf>,
    /// Rows in the concatenated source files.
    pub wide_rows: usize,
    /// Day columns selected by the column filter.
    pub day_columns: usize,
    /// Rows after the wide-to-long pivot.
    pub long_rows: usize,
    /// Rows discarded because (year, month, day) is not a calendar date.
    pub dropped_invalid_dates: usize,
}

/// The finalized table together with how it was produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub table: MeasurementTable,
    pub stats: PipelineStats,
}

/// Runs loader, column filter, reshaper and date deriver in order.
#[tracing::instrument(skip(config))]
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let (raw, load) = load_sources(config)?;
    let wide = filter_columns(&raw, &config.day_prefix)?;
    drop(raw);
    let long = reshape(&wide, &config.day_prefix)?;
    let long_rows = long.len();
    let (table, dropped_invalid_dates) = derive_dates(long);

    let stats = PipelineStats {
        files_loaded: load.loaded,
        files_missing: load.missing,
        wide_rows: wide.len(),
        day_columns: wide.day_columns.len(),
        long_rows,
        dropped_invalid_dates,
    };

    info!(
        files_loaded = stats.files_loaded.len(),
        files_missing = stats.files_missing.len(),
        wide_rows = stats.wide_rows,
        long_rows = stats.long_rows,
        dropped_invalid_dates,
        measurements = table.len(),
        "Pipeline finished"
    );

    Ok(PipelineReport { table, stats })
}
