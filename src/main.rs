//! CLI entry point for the emissions report tool.
//!
//! Runs the load/reshape pipeline over the yearly exports and prints one
//! family of query results per subcommand.

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use emisiones::output::{
    write_catalog, write_json, write_matrix, write_series, write_summaries, write_summary,
};
use emisiones::queries::{
    Summary, monthly_means_for_pollutant, monthly_means_for_station, stations_and_pollutants,
    summary_by_pollutant, summary_by_station_pollutant, summary_for, time_series,
};
use emisiones::{MeasurementTable, PipelineConfig, SourceFile};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "emisiones")]
#[command(about = "Descriptive statistics over yearly air-quality exports", long_about = None)]
struct Cli {
    /// Directory holding the default yearly export files
    #[arg(long, env = "EMISIONES_DATA_DIR", default_value = ".", global = true)]
    data_dir: PathBuf,

    /// Explicit source file, repeatable; replaces the default yearly list
    #[arg(long = "source", value_name = "FILE", global = true)]
    sources: Vec<PathBuf>,

    /// Output rendering
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Grouping {
    Pollutant,
    StationPollutant,
}

#[derive(Subcommand)]
enum Commands {
    /// Station and pollutant lists, per-pollutant summary and monthly means
    Report {
        #[arg(long, default_value_t = 4)]
        station: u32,
        #[arg(long, default_value_t = 8)]
        pollutant: u32,
        #[arg(long, default_value_t = 2019)]
        year: i32,
    },
    /// List the stations and pollutants present in the data
    Stations,
    /// Daily values of one station and pollutant within a date range
    Series {
        #[arg(long)]
        station: u32,
        #[arg(long)]
        pollutant: u32,
        /// First date included (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last date included (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
    /// Descriptive statistics, grouped or for a single station and pollutant
    Summary {
        #[arg(long, value_enum, default_value_t = Grouping::Pollutant)]
        by: Grouping,
        /// With --pollutant, summarize this station only
        #[arg(long, requires = "pollutant")]
        station: Option<u32>,
        #[arg(long, requires = "station")]
        pollutant: Option<u32>,
    },
    /// Mean per station and month for one pollutant in one year
    MonthlyPollutant {
        #[arg(long)]
        pollutant: u32,
        #[arg(long)]
        year: i32,
    },
    /// Mean per month and pollutant for one station
    MonthlyStation {
        #[arg(long)]
        station: u32,
    },
}

/// Flat JSON record for a (station, pollutant) summary row.
#[derive(Serialize)]
struct PairSummary<'a> {
    station: u32,
    pollutant: u32,
    #[serde(flatten)]
    summary: &'a Summary,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/emisiones.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("emisiones.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = if cli.sources.is_empty() {
        PipelineConfig::with_data_dir(&cli.data_dir)
    } else {
        PipelineConfig::from_sources(cli.sources.iter().map(SourceFile::new).collect())
    };

    let report = emisiones::run(&config)?;
    let table = &report.table;
    let json = cli.format == Format::Json;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Commands::Report {
        station: 4,
        pollutant: 8,
        year: 2019,
    }) {
        Commands::Report {
            station,
            pollutant,
            year,
        } => {
            if json {
                let summary = summary_for(table, station, pollutant);
                let pair = PairSummary {
                    station,
                    pollutant,
                    summary: &summary,
                };
                let body = serde_json::json!({
                    "pipeline": report.stats,
                    "catalog": stations_and_pollutants(table),
                    "by_pollutant": summary_by_pollutant(table),
                    "station_pollutant": pair,
                    "monthly_pollutant": monthly_means_for_pollutant(table, pollutant, year),
                    "monthly_station": monthly_means_for_station(table, station),
                });
                write_json(&mut out, &body)?;
            } else {
                write_report(&mut out, table, station, pollutant, year)?;
            }
        }
        Commands::Stations => {
            let catalog = stations_and_pollutants(table);
            if json {
                write_json(&mut out, &catalog)?;
            } else {
                write_catalog(&mut out, &catalog)?;
            }
        }
        Commands::Series {
            station,
            pollutant,
            from,
            to,
        } => {
            let series = time_series(table, station, pollutant, from, to);
            info!(station, pollutant, %from, %to, points = series.len(), "Series extracted");
            if json {
                write_json(&mut out, &series)?;
            } else {
                write_series(&mut out, &series)?;
            }
        }
        Commands::Summary {
            by,
            station,
            pollutant,
        } => match (station, pollutant) {
            (Some(station), Some(pollutant)) => {
                let summary = summary_for(table, station, pollutant);
                if json {
                    write_json(
                        &mut out,
                        &PairSummary {
                            station,
                            pollutant,
                            summary: &summary,
                        },
                    )?;
                } else {
                    write_summary(&mut out, &summary)?;
                }
            }
            _ => match by {
                Grouping::Pollutant => {
                    let summaries = summary_by_pollutant(table);
                    if json {
                        write_json(&mut out, &summaries)?;
                    } else {
                        write_summaries(&mut out, &["pollutant"], &summaries)?;
                    }
                }
                Grouping::StationPollutant => {
                    let summaries = summary_by_station_pollutant(table);
                    if json {
                        let records: Vec<PairSummary> = summaries
                            .iter()
                            .map(|(&(station, pollutant), summary)| PairSummary {
                                station,
                                pollutant,
                                summary,
                            })
                            .collect();
                        write_json(&mut out, &records)?;
                    } else {
                        write_summaries(&mut out, &["station", "pollutant"], &summaries)?;
                    }
                }
            },
        },
        Commands::MonthlyPollutant { pollutant, year } => {
            let matrix = monthly_means_for_pollutant(table, pollutant, year);
            if json {
                write_json(&mut out, &matrix)?;
            } else {
                write_matrix(&mut out, "station", &matrix)?;
            }
        }
        Commands::MonthlyStation { station } => {
            let matrix = monthly_means_for_station(table, station);
            if json {
                write_json(&mut out, &matrix)?;
            } else {
                write_matrix(&mut out, "month", &matrix)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// The default text report: listings, summaries and both monthly pivots.
fn write_report<W: Write>(
    out: &mut W,
    table: &MeasurementTable,
    station: u32,
    pollutant: u32,
    year: i32,
) -> Result<()> {
    write_catalog(out, &stations_and_pollutants(table))?;

    writeln!(out, "\n--- Summary by pollutant ---")?;
    write_summaries(out, &["pollutant"], &summary_by_pollutant(table))?;

    writeln!(out, "\n--- Summary for station {station}, pollutant {pollutant} ---")?;
    write_summary(out, &summary_for(table, station, pollutant))?;

    writeln!(out, "\n--- Monthly means of pollutant {pollutant} in {year} ---")?;
    write_matrix(out, "station", &monthly_means_for_pollutant(table, pollutant, year))?;

    writeln!(out, "\n--- Monthly means by pollutant at station {station} ---")?;
    write_matrix(out, "month", &monthly_means_for_station(table, station))?;

    Ok(())
}
