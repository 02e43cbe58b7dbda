pub mod itinerary;

pub use itinerary::*;

use crate::catalog::{self, Route, RouteCatalog, Station};
use std::fmt::Display;
use thiserror::Error;
use tracing::debug;

const MAX_SUGGESTIONS: usize = 3;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route `{0}` does not match any entry")]
    RouteNotFound(String),
    #[error("{endpoint} station `{name}` is not served by route {route}")]
    StationNotFound {
        route: String,
        endpoint: Endpoint,
        name: String,
        /// Closest station names on the route, best first.
        suggestions: Vec<String>,
    },
    #[error("`{0}` is both the start and the destination")]
    SameStation(String),
}

/// Which end of a navigation request a station name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    From,
    To,
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::From => f.write_str("Start"),
            Endpoint::To => f.write_str("Destination"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base of the directions links; two `lat,lon` path segments are appended.
    pub map_link_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_link_base: "https://www.google.com/maps/dir".into(),
        }
    }
}

/// Resolves "from A to B on line L" into an ordered itinerary.
pub struct Resolver<'a> {
    catalog: &'a RouteCatalog,
    config: Config,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a RouteCatalog) -> Self {
        Self {
            catalog,
            config: Default::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn navigate(&self, line: &str, from: &str, to: &str) -> Result<Itinerary, self::Error> {
        let route = self.catalog.route(line).map_err(|err| match err {
            catalog::Error::RouteNotFound(id) => self::Error::RouteNotFound(id),
            _ => self::Error::RouteNotFound(line.trim().to_string()),
        })?;
        let from_idx = self.station_index(route, from, Endpoint::From)?;
        let to_idx = self.station_index(route, to, Endpoint::To)?;

        let stations: Vec<Station> = match from_idx.cmp(&to_idx) {
            std::cmp::Ordering::Equal => {
                return Err(self::Error::SameStation(
                    route.stations[from_idx].name.to_string(),
                ));
            }
            std::cmp::Ordering::Less => route.stations[from_idx..=to_idx].to_vec(),
            std::cmp::Ordering::Greater => route.stations[to_idx..=from_idx]
                .iter()
                .rev()
                .cloned()
                .collect(),
        };
        let direction = if from_idx < to_idx {
            Direction::Forward
        } else {
            Direction::Backward
        };
        let heading = match direction {
            Direction::Forward => route.last_station(),
            Direction::Backward => route.first_station(),
        }
        .map(|station| station.name.clone())
        .unwrap_or_else(|| route.name.clone());

        debug!(
            "Line {}: {} stations from {} to {}",
            route.id,
            stations.len(),
            route.stations[from_idx].name,
            route.stations[to_idx].name
        );
        Ok(Itinerary::new(
            route.id.clone(),
            route.name.clone(),
            direction,
            heading,
            stations,
            &self.config,
        ))
    }

    fn station_index(&self, route: &Route, name: &str, endpoint: Endpoint) -> Result<usize, self::Error> {
        self.catalog
            .station_index(route, name)
            .map_err(|_| self::Error::StationNotFound {
                route: route.id.to_string(),
                endpoint,
                name: name.trim().to_string(),
                suggestions: self
                    .catalog
                    .search_stations(route, name)
                    .into_iter()
                    .take(MAX_SUGGESTIONS)
                    .map(|station| station.name.to_string())
                    .collect(),
            })
    }
}
