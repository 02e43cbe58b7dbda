use dutyroute::{catalog::Route, catalog::Station, shared::geo::Coordinate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDto {
    pub index: u32,
    pub name: String,
    pub coordinate: Coordinate,
}

impl StationDto {
    pub fn from(station: &Station) -> Self {
        Self {
            index: station.index,
            name: station.name.to_string(),
            coordinate: station.coordinate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDto {
    pub id: String,
    pub name: String,
    pub stations: Vec<StationDto>,
}

impl RouteDto {
    pub fn from(route: &Route) -> Self {
        Self {
            id: route.id.to_string(),
            name: route.name.to_string(),
            stations: route.stations.iter().map(StationDto::from).collect(),
        }
    }
}
