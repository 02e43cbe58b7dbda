use std::{fmt::Display, sync::Arc};

use serde::Serialize;

use crate::{
    catalog::Station,
    navigation::Config,
    shared::geo::{Coordinate, Distance},
};

/// Travel direction relative to the route's canonical station order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Forward,
    Backward,
}

/// One hop between consecutive stations.
#[derive(Debug, Clone)]
pub struct Leg {
    pub from: Station,
    pub to: Station,
    pub distance: Distance,
}

impl Leg {
    pub fn instruction(&self) -> String {
        format!("Continue from {} to {}", self.from.name, self.to.name)
    }

    pub fn map_link(&self, config: &Config) -> String {
        map_link(config, &self.from.coordinate, &self.to.coordinate)
    }
}

/// Stations to pass on one line, in travel order, with a direction line and
/// a map link per hop.
#[derive(Debug, Clone)]
pub struct Itinerary {
    pub route_id: Arc<str>,
    pub route_name: Arc<str>,
    pub direction: Direction,
    /// Last station of the line in the travel direction, as shown on the bus.
    pub heading: Arc<str>,
    pub stations: Vec<Station>,
    pub legs: Vec<Leg>,
    /// `stations.len() - 1` lines of the form "Continue from A to B".
    pub directions: Vec<String>,
    pub map_links: Vec<String>,
    pub total_distance: Distance,
}

impl Itinerary {
    pub(crate) fn new(
        route_id: Arc<str>,
        route_name: Arc<str>,
        direction: Direction,
        heading: Arc<str>,
        stations: Vec<Station>,
        config: &Config,
    ) -> Self {
        let legs: Vec<Leg> = stations
            .windows(2)
            .map(|pair| Leg {
                from: pair[0].clone(),
                to: pair[1].clone(),
                distance: pair[0].coordinate.euclidean_distance(&pair[1].coordinate),
            })
            .collect();
        let directions = legs.iter().map(Leg::instruction).collect();
        let map_links = legs.iter().map(|leg| leg.map_link(config)).collect();
        let total_distance = legs.iter().map(|leg| leg.distance).sum();
        Self {
            route_id,
            route_name,
            direction,
            heading,
            stations,
            legs,
            directions,
            map_links,
            total_distance,
        }
    }

    pub fn from_station(&self) -> Option<&Station> {
        self.stations.first()
    }

    pub fn to_station(&self) -> Option<&Station> {
        self.stations.last()
    }

    /// Number of stops after the boarding station.
    pub fn stop_count(&self) -> usize {
        self.legs.len()
    }

    /// Link covering the whole trip from the first to the last station.
    pub fn overview_link(&self, config: &Config) -> Option<String> {
        let from = self.from_station()?;
        let to = self.to_station()?;
        Some(map_link(config, &from.coordinate, &to.coordinate))
    }
}

impl Display for Itinerary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Line {} towards {} ({} stops, {})",
            self.route_id,
            self.heading,
            self.stop_count(),
            self.total_distance
        )?;
        for line in self.directions.iter() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn map_link(config: &Config, from: &Coordinate, to: &Coordinate) -> String {
    format!(
        "{}/{}/{}",
        config.map_link_base.trim_end_matches('/'),
        from,
        to
    )
}
