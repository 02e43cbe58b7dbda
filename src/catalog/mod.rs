mod models;
pub mod source;

pub use models::*;
pub use source::{RouteRecord, StationRecord};

use crate::shared::{self, normalize};
use std::{
    collections::{HashMap, HashSet},
    io,
    sync::{Arc, PoisonError, RwLock},
    time::Instant,
};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Route `{0}` does not match any entry")]
    RouteNotFound(String),
    #[error("Station `{station}` is not served by route {route}")]
    StationNotFound { route: String, station: String },
    #[error("Route id must not be empty")]
    EmptyRouteId,
    #[error("Route {0} is listed more than once")]
    DuplicateRoute(String),
    #[error("Route {0} has no stations")]
    EmptyRoute(String),
    #[error("Route {route} has a station without a name")]
    EmptyStationName { route: String },
    #[error("Station `{station}` appears more than once on route {route}; circular routes are not supported")]
    RepeatedStation { route: String, station: String },
    #[error("Station `{station}` on route {route} has invalid coordinates")]
    InvalidCoordinate { route: String, station: String },
}

/// Read-only lookup of every line and its stations.
///
/// Built once from the catalog document; a reload builds a fresh catalog and
/// swaps it in through [`SharedCatalog`].
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: Box<[Route]>,
    route_lookup: HashMap<Arc<str>, u32>,
    // Per route: normalized station name -> index in `Route::stations`
    station_lookup: Box<[HashMap<Arc<str>, u32>]>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Default::default()
    }

    /// Validates and indexes the records of a catalog document.
    pub fn from_records(records: Vec<RouteRecord>) -> Result<Self, self::Error> {
        debug!("Loading routes...");
        let now = Instant::now();
        let mut routes: Vec<Route> = Vec::with_capacity(records.len());
        let mut route_lookup: HashMap<Arc<str>, u32> = HashMap::new();
        let mut station_lookup: Vec<HashMap<Arc<str>, u32>> = Vec::with_capacity(records.len());

        for (i, record) in records.into_iter().enumerate() {
            let id = record.route_number.trim();
            if id.is_empty() {
                return Err(self::Error::EmptyRouteId);
            }
            let key: Arc<str> = normalize(id).into();
            if route_lookup.contains_key(&key) {
                return Err(self::Error::DuplicateRoute(id.to_string()));
            }
            if record.stations.is_empty() {
                return Err(self::Error::EmptyRoute(id.to_string()));
            }

            let mut lookup: HashMap<Arc<str>, u32> = HashMap::new();
            let mut stations: Vec<Station> = Vec::with_capacity(record.stations.len());
            for (j, station) in record.stations.into_iter().enumerate() {
                let name = station.name.trim();
                if name.is_empty() {
                    return Err(self::Error::EmptyStationName {
                        route: id.to_string(),
                    });
                }
                if !station.coords.is_valid() {
                    return Err(self::Error::InvalidCoordinate {
                        route: id.to_string(),
                        station: name.to_string(),
                    });
                }
                let normalized_name: Arc<str> = normalize(name).into();
                if lookup.insert(normalized_name.clone(), j as u32).is_some() {
                    return Err(self::Error::RepeatedStation {
                        route: id.to_string(),
                        station: name.to_string(),
                    });
                }
                stations.push(Station {
                    index: j as u32,
                    name: name.into(),
                    normalized_name,
                    coordinate: station.coords,
                });
            }

            route_lookup.insert(key, i as u32);
            station_lookup.push(lookup);
            routes.push(Route {
                index: i as u32,
                id: id.into(),
                name: record.name.trim().into(),
                stations: stations.into(),
            });
        }

        debug!("Loading {} routes took {:?}", routes.len(), now.elapsed());
        Ok(Self {
            routes: routes.into(),
            route_lookup,
            station_lookup: station_lookup.into(),
        })
    }

    /// Looks up a route by line id, ignoring case and surrounding whitespace.
    pub fn route(&self, id: &str) -> Result<&Route, self::Error> {
        self.route_lookup
            .get(normalize(id).as_str())
            .map(|index| &self.routes[*index as usize])
            .ok_or_else(|| self::Error::RouteNotFound(id.trim().to_string()))
    }

    pub fn contains_route(&self, id: &str) -> bool {
        self.route_lookup.contains_key(normalize(id).as_str())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Summaries of every route in document order.
    pub fn list_routes(&self) -> Vec<RouteSummary> {
        self.routes.iter().map(Route::summary).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Case-insensitive exact match of a station name on the given route.
    pub fn station_index(&self, route: &Route, station_name: &str) -> Result<usize, self::Error> {
        self.station_lookup
            .get(route.index as usize)
            .and_then(|lookup| lookup.get(normalize(station_name).as_str()))
            .map(|index| *index as usize)
            .ok_or_else(|| self::Error::StationNotFound {
                route: route.id.to_string(),
                station: station_name.trim().to_string(),
            })
    }

    /// Fuzzy search over the stations of one route, best match first.
    pub fn search_stations<'a>(&self, route: &'a Route, needle: &str) -> Vec<&'a Station> {
        shared::search(needle, &route.stations)
    }

    /// Ids of routes in `ids` that are not in the catalog, deduplicated in input order.
    pub fn unknown_routes<'a, I>(&self, ids: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| !self.contains_route(id) && seen.insert(*id))
            .collect()
    }
}

/// Hands out consistent catalog snapshots and lets a reload swap in a new one.
///
/// Readers clone the inner `Arc` and keep using that version for the whole
/// request, so they see either the old or the new catalog, never a mix.
#[derive(Debug, Default)]
pub struct SharedCatalog {
    current: RwLock<Arc<RouteCatalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: RouteCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<RouteCatalog> {
        // The guarded value is a single pointer, a poisoned lock still holds a whole catalog
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `catalog` and returns the previous one.
    pub fn replace(&self, catalog: RouteCatalog) -> Arc<RouteCatalog> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(catalog))
    }
}

impl From<RouteCatalog> for SharedCatalog {
    fn from(value: RouteCatalog) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        { "route_number": "31", "name": "Hauptbahnhof - Neuenheim", "stations": [
            { "name": "Hauptbahnhof", "coords": [49.4037, 8.6756] },
            { "name": "Bismarckplatz", "coords": [49.4093, 8.6937] },
            { "name": "Neuenheim", "coords": [49.4150, 8.6950] }
        ]},
        { "route_number": "32", "name": "Universitätsplatz - Emmertsgrund", "stations": [
            { "name": "Universitätsplatz", "coords": [49.4106, 8.7059] },
            { "name": "Emmertsgrund", "coords": [49.3636, 8.7005] }
        ]}
    ]"#;

    #[test]
    fn loads_routes_in_document_order() {
        let catalog = RouteCatalog::from_json_str(CATALOG).unwrap();
        let summaries = catalog.list_routes();
        assert_eq!(summaries.len(), 2);
        assert_eq!(&*summaries[0].id, "31");
        assert_eq!(summaries[0].station_count, 3);
        assert_eq!(&*summaries[1].name, "Universitätsplatz - Emmertsgrund");
    }

    #[test]
    fn station_lookup_ignores_case() {
        let catalog = RouteCatalog::from_json_str(CATALOG).unwrap();
        let route = catalog.route("31").unwrap();
        assert_eq!(catalog.station_index(route, "bismarckPLATZ").unwrap(), 1);
        assert_eq!(catalog.station_index(route, " Neuenheim ").unwrap(), 2);
    }

    #[test]
    fn unknown_station_names_route_and_station() {
        let catalog = RouteCatalog::from_json_str(CATALOG).unwrap();
        let route = catalog.route("32").unwrap();
        match catalog.station_index(route, "Bismarckplatz") {
            Err(Error::StationNotFound { route, station }) => {
                assert_eq!(route, "32");
                assert_eq!(station, "Bismarckplatz");
            }
            other => panic!("expected StationNotFound, got {other:?}"),
        }
    }

    #[test]
    fn unknown_route_is_not_found() {
        let catalog = RouteCatalog::from_json_str(CATALOG).unwrap();
        assert!(matches!(catalog.route("99"), Err(Error::RouteNotFound(id)) if id == "99"));
        assert!(!catalog.contains_route("99"));
    }

    #[test]
    fn repeated_station_is_rejected_as_circular() {
        let json = r#"[{ "route_number": "R1", "name": "Ring", "stations": [
            { "name": "Bismarckplatz", "coords": [49.4093, 8.6937] },
            { "name": "Römerkreis", "coords": [49.4040, 8.6880] },
            { "name": "bismarckplatz", "coords": [49.4093, 8.6937] }
        ]}]"#;
        assert!(matches!(
            RouteCatalog::from_json_str(json),
            Err(Error::RepeatedStation { .. })
        ));
    }

    #[test]
    fn duplicate_and_empty_routes_are_rejected() {
        let duplicate = r#"[
            { "route_number": "31", "name": "a", "stations": [{ "name": "A", "coords": [49.0, 8.0] }] },
            { "route_number": "31", "name": "b", "stations": [{ "name": "B", "coords": [49.0, 8.0] }] }
        ]"#;
        assert!(matches!(
            RouteCatalog::from_json_str(duplicate),
            Err(Error::DuplicateRoute(_))
        ));

        let empty = r#"[{ "route_number": "31", "name": "a", "stations": [] }]"#;
        assert!(matches!(
            RouteCatalog::from_json_str(empty),
            Err(Error::EmptyRoute(_))
        ));
    }

    #[test]
    fn invalid_coordinates_are_rejected() {
        let json = r#"[{ "route_number": "31", "name": "a", "stations": [
            { "name": "Nowhere", "coords": [120.0, 8.0] }
        ]}]"#;
        assert!(matches!(
            RouteCatalog::from_json_str(json),
            Err(Error::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn search_suggests_close_station_names() {
        let catalog = RouteCatalog::from_json_str(CATALOG).unwrap();
        let route = catalog.route("31").unwrap();
        let hits = catalog.search_stations(route, "Bismark");
        assert_eq!(hits.first().map(|s| &*s.name), Some("Bismarckplatz"));
    }

    #[test]
    fn unknown_routes_are_deduplicated() {
        let catalog = RouteCatalog::from_json_str(CATALOG).unwrap();
        let unknown = catalog.unknown_routes(["31", "40", "40", "32", "41"]);
        assert_eq!(unknown, vec!["40", "41"]);
    }

    #[test]
    fn replace_swaps_whole_catalog() {
        let shared = SharedCatalog::new(RouteCatalog::from_json_str(CATALOG).unwrap());
        let before = shared.snapshot();
        let previous = shared.replace(RouteCatalog::new());
        assert_eq!(previous.len(), 2);
        assert_eq!(before.len(), 2);
        assert!(shared.snapshot().is_empty());
    }
}
