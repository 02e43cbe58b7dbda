use dutyroute::navigation::{Direction, Itinerary, Leg};
use serde::Serialize;

use crate::dto::StationDto;

#[derive(Debug, Clone, Serialize)]
pub struct LegDto {
    pub from: String,
    pub to: String,
    pub distance_meters: f64,
    pub direction: String,
    pub map_link: String,
}

impl LegDto {
    pub fn from(leg: &Leg, direction: &str, map_link: &str) -> Self {
        Self {
            from: leg.from.name.to_string(),
            to: leg.to.name.to_string(),
            distance_meters: leg.distance.as_meters().round(),
            direction: direction.to_string(),
            map_link: map_link.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItineraryDto {
    pub route_id: String,
    pub route_name: String,
    pub direction: Direction,
    pub heading: String,
    pub stations: Vec<StationDto>,
    pub legs: Vec<LegDto>,
    pub total_distance: String,
    /// Link covering the whole trip, from the first to the last station.
    pub overview_link: Option<String>,
    /// Plain-text rendering for chat clients.
    pub text: String,
}

impl ItineraryDto {
    pub fn from(itinerary: &Itinerary, overview_link: Option<String>) -> Self {
        let legs = itinerary
            .legs
            .iter()
            .zip(&itinerary.directions)
            .zip(&itinerary.map_links)
            .map(|((leg, direction), link)| LegDto::from(leg, direction, link))
            .collect();
        Self {
            route_id: itinerary.route_id.to_string(),
            route_name: itinerary.route_name.to_string(),
            direction: itinerary.direction,
            heading: itinerary.heading.to_string(),
            stations: itinerary.stations.iter().map(StationDto::from).collect(),
            legs,
            total_distance: itinerary.total_distance.to_string(),
            overview_link,
            text: itinerary.to_string(),
        }
    }
}
