use crate::{
    catalog::{self, RouteCatalog},
    shared::geo::Coordinate,
};
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
    time::Instant,
};
use tracing::debug;

/// One entry of the catalog document:
///
/// ```json
/// { "route_number": "31", "name": "Hauptbahnhof - Neuenheim",
///   "stations": [{ "name": "Hauptbahnhof", "coords": [49.4037, 8.6756] }] }
/// ```
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouteRecord {
    #[serde(alias = "id")]
    pub route_number: String,
    pub name: String,
    pub stations: Vec<StationRecord>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct StationRecord {
    pub name: String,
    #[serde(alias = "coordinates")]
    pub coords: Coordinate,
}

impl RouteCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, catalog::Error> {
        let records: Vec<RouteRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, catalog::Error> {
        let records: Vec<RouteRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, catalog::Error> {
        debug!("Reading catalog from {}...", path.as_ref().display());
        let now = Instant::now();
        let file = File::open(path)?;
        let catalog = Self::from_reader(BufReader::new(file))?;
        debug!("Reading catalog took {:?}", now.elapsed());
        Ok(catalog)
    }
}
