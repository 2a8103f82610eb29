//! Reads the yearly exports into a single [`RawTable`].

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use csv::{ByteRecord, ReaderBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{PipelineConfig, SourceFile};
use crate::table::RawTable;

/// Which configured sources were read and which were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// Loads every configured source in order and concatenates them.
///
/// Files that do not exist are logged and skipped. Any other I/O or CSV
/// error is fatal, as is ending up with no file loaded at all.
#[tracing::instrument(skip(config), fields(sources = config.sources.len()))]
pub fn load_sources(config: &PipelineConfig) -> Result<(RawTable, LoadReport)> {
    let mut combined: Option<RawTable> = None;
    let mut report = LoadReport::default();

    for source in &config.sources {
        match load_file(&source.path, config.delimiter)? {
            Some(table) => {
                info!(
                    path = %source.path.display(),
                    year = source.year,
                    rows = table.len(),
                    "Source file loaded"
                );
                report.loaded.push(source.path.clone());
                match combined.as_mut() {
                    Some(acc) => acc.append(table),
                    None => combined = Some(table),
                }
            }
            None => {
                warn!(path = %source.path.display(), "Source file not found, skipping");
                report.missing.push(source.path.clone());
            }
        }
    }

    let Some(table) = combined else {
        bail!(
            "none of the {} configured source files could be found: {}",
            config.sources.len(),
            describe(&config.sources)
        );
    };

    debug!(rows = table.len(), columns = table.headers.len(), "Sources combined");
    Ok((table, report))
}

/// Reads one delimited, Latin-1 encoded file. Returns `Ok(None)` when the
/// file does not exist.
pub fn load_file(path: &Path, delimiter: u8) -> Result<Option<RawTable>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("opening {}", path.display()));
        }
    };

    let table = read_table(file, delimiter).with_context(|| format!("reading {}", path.display()))?;
    Ok(Some(table))
}

/// Parses delimited text from any reader, decoding every field as Latin-1.
pub fn read_table<R: Read>(reader: R, delimiter: u8) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.byte_headers().context("reading header row")?;
    let mut table = RawTable::new(headers.iter().map(latin1).collect());

    let mut record = ByteRecord::new();
    let mut row_no = 0usize;
    while rdr
        .read_byte_record(&mut record)
        .with_context(|| format!("reading row {}", row_no + 1))?
    {
        row_no += 1;
        let mut row: Vec<String> = record.iter().map(latin1).collect();
        row.resize(table.headers.len(), String::new());
        table.rows.push(row);
    }

    Ok(table)
}

/// Latin-1 maps each byte to the code point with the same value.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn describe(sources: &[SourceFile]) -> String {
    sources
        .iter()
        .map(|s| s.path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
