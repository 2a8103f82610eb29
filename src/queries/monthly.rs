//! Monthly mean pivots.

use chrono::Datelike;

use crate::table::{Matrix, MeasurementTable, pivot_mean};

/// Mean value per station (rows) and month (columns) of `pollutant` during
/// calendar `year`.
pub fn monthly_means_for_pollutant(
    table: &MeasurementTable,
    pollutant: u32,
    year: i32,
) -> Matrix<u32, u32> {
    let rows = table
        .iter()
        .filter(|m| m.pollutant == pollutant && m.date.year() == year);

    pivot_mean(rows, |m| m.station, |m| m.date.month())
}

/// Mean value per month (rows) and pollutant (columns) at `station`, over
/// all years.
pub fn monthly_means_for_station(table: &MeasurementTable, station: u32) -> Matrix<u32, u32> {
    let rows = table.iter().filter(|m| m.station == station);

    pivot_mean(rows, |m| m.date.month(), |m| m.pollutant)
}
