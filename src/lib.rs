//! Air-quality export ingestion and descriptive statistics.
//!
//! Yearly semicolon-delimited exports (one column per day of month) are
//! loaded, reshaped to one row per station/pollutant/day, dated, and then
//! queried through [`queries`].

pub mod config;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod queries;
pub mod table;

pub use config::{PipelineConfig, SourceFile};
pub use pipeline::{PipelineReport, PipelineStats, run};
pub use table::{Matrix, Measurement, MeasurementTable};
