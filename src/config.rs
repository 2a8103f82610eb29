//! Source descriptors and pipeline configuration.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Yearly exports shipped by the air-quality network, newest first.
pub const DEFAULT_SOURCE_FILES: &[(&str, i32)] = &[
    ("emisiones-2019.csv.csv", 2019),
    ("emisiones-2018.csv.csv", 2018),
    ("emisiones-2017.csv.csv", 2017),
    ("emisiones-2016.csv.csv", 2016),
];

/// Column holding the monitoring station identifier.
pub const STATION_COLUMN: &str = "ESTACION";
/// Column holding the pollutant (magnitude) code.
pub const POLLUTANT_COLUMN: &str = "MAGNITUD";
/// Column holding the calendar year.
pub const YEAR_COLUMN: &str = "ANO";
/// Column holding the calendar month.
pub const MONTH_COLUMN: &str = "MES";

/// Identifier columns kept by the column filter, in output order.
pub const IDENTIFIER_COLUMNS: [&str; 4] =
    [STATION_COLUMN, POLLUTANT_COLUMN, YEAR_COLUMN, MONTH_COLUMN];

/// One input file of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Calendar year the file covers, when known. Informational only.
    pub year: Option<i32>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            year: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Everything the ETL stages need to know about their inputs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Files to load, in concatenation order.
    pub sources: Vec<SourceFile>,
    /// Field delimiter of the exports.
    pub delimiter: u8,
    /// Prefix that marks a per-day value column (`D01` .. `D31`).
    pub day_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_data_dir(".")
    }
}

impl PipelineConfig {
    /// The default yearly file list resolved against `data_dir`.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        let sources = DEFAULT_SOURCE_FILES
            .iter()
            .map(|(name, year)| SourceFile::new(data_dir.join(name)).with_year(*year))
            .collect();

        Self::from_sources(sources)
    }

    /// A configuration reading exactly `sources`, with default parsing options.
    pub fn from_sources(sources: Vec<SourceFile>) -> Self {
        Self {
            sources,
            delimiter: b';',
            day_prefix: "D".to_string(),
        }
    }
}
