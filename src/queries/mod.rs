//! Read-only views over a finalized [`MeasurementTable`](crate::table::MeasurementTable).
//!
//! Every query is a pure function of the table and its arguments. An empty
//! match is an empty result, never an error.

pub mod listing;
pub mod monthly;
pub mod series;
pub mod summary;
pub mod utility;

pub use listing::{Catalog, stations_and_pollutants};
pub use monthly::{monthly_means_for_pollutant, monthly_means_for_station};
pub use series::{SeriesPoint, time_series};
pub use summary::{Summary, summary_by_pollutant, summary_by_station_pollutant, summary_for};
