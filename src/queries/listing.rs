//! Distinct stations and pollutants present in a table.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::table::MeasurementTable;

/// Distinct station identifiers and pollutant codes, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub stations: Vec<u32>,
    pub pollutants: Vec<u32>,
}

pub fn stations_and_pollutants(table: &MeasurementTable) -> Catalog {
    let stations: BTreeSet<u32> = table.iter().map(|m| m.station).collect();
    let pollutants: BTreeSet<u32> = table.iter().map(|m| m.pollutant).collect();

    Catalog {
        stations: stations.into_iter().collect(),
        pollutants: pollutants.into_iter().collect(),
    }
}
