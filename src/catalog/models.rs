use std::sync::Arc;

use serde::Serialize;

use crate::shared::{Identifiable, geo::Coordinate};

/// A stop served by a route.
#[derive(Debug, Default, Clone)]
pub struct Station {
    /// Zero-based position of the station in the route's canonical direction.
    pub index: u32,
    /// Display name as provisioned (e.g. "Bismarckplatz").
    pub name: Arc<str>,
    /// Lowercase, whitespace-collapsed name used for lookups and search.
    pub normalized_name: Arc<str>,
    pub coordinate: Coordinate,
}

impl Identifiable for Station {
    fn name(&self) -> &str {
        &self.name
    }

    fn normalized_name(&self) -> &str {
        &self.normalized_name
    }
}

/// A bus line with its stations in physical travel order.
///
/// The order encodes one canonical direction; travelling the other way is the
/// same sequence read backwards. Names are unique within a route.
#[derive(Debug, Default, Clone)]
pub struct Route {
    /// Position of the route in the catalog document.
    pub index: u32,
    /// Line identifier as printed on the bus (e.g. "31").
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub stations: Arc<[Station]>,
}

impl Route {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            station_count: self.stations.len(),
        }
    }

    /// Every pair of consecutive stations in canonical order.
    pub fn hops(&self) -> impl Iterator<Item = (&Station, &Station)> {
        self.stations.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    pub fn first_station(&self) -> Option<&Station> {
        self.stations.first()
    }

    pub fn last_station(&self) -> Option<&Station> {
        self.stations.last()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub station_count: usize,
}
