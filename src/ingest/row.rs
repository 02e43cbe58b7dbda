use std::{fmt::Display, sync::Arc};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    catalog::RouteCatalog,
    schedule::{DriverId, ShiftEntry},
    shared::time::ClockTime,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields of one schedule line before validation, as written by the uploader.
#[derive(Debug, Clone)]
pub(crate) struct RawRow<'a> {
    pub date: &'a str,
    pub umlauf: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub routes: Vec<&'a str>,
}

/// Why a line was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// Fewer fields than `date, umlauf, start_time, end_time, routes`.
    MissingFields { found: usize },
    /// The line could not be read at all.
    Malformed { detail: String },
    /// A plan-text shift line that appears before any `Date:` line.
    MissingDate,
    InvalidDate { value: String },
    InvalidTime { field: &'static str, value: String },
    TimeOrder { start: String, end: String },
    EmptyUmlauf,
    NoRoutes,
    UnknownRoute { ids: Vec<String> },
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields { found } => write!(
                f,
                "expected date, umlauf, start_time, end_time and routes, found {found} fields"
            ),
            Self::Malformed { detail } => write!(f, "malformed line: {detail}"),
            Self::MissingDate => write!(f, "shift listed before any date"),
            Self::InvalidDate { value } => write!(f, "invalid date `{value}`, expected YYYY-MM-DD"),
            Self::InvalidTime { field, value } => {
                write!(f, "invalid {field} `{value}`, expected HH:MM")
            }
            Self::TimeOrder { start, end } => {
                write!(f, "start time {start} is not before end time {end}")
            }
            Self::EmptyUmlauf => write!(f, "umlauf is empty"),
            Self::NoRoutes => write!(f, "no routes listed"),
            Self::UnknownRoute { ids } => write!(f, "unknown route: {}", ids.join(", ")),
        }
    }
}

/// Route ids from one or more route fields; each field may itself hold a comma separated list.
pub(crate) fn split_routes<'a, I>(fields: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut routes: Vec<&str> = Vec::new();
    fields
        .into_iter()
        .flat_map(|field| field.split(','))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .for_each(|id| {
            if !routes.contains(&id) {
                routes.push(id);
            }
        });
    routes
}

impl RawRow<'_> {
    /// Checks one row on its own; no other row influences the outcome.
    pub(crate) fn validate(
        &self,
        driver: &DriverId,
        catalog: &RouteCatalog,
    ) -> Result<ShiftEntry, RejectReason> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|_| {
            RejectReason::InvalidDate {
                value: self.date.trim().to_string(),
            }
        })?;

        let umlauf = self.umlauf.trim();
        if umlauf.is_empty() {
            return Err(RejectReason::EmptyUmlauf);
        }

        let start_time = parse_time("start_time", self.start_time)?;
        let end_time = parse_time("end_time", self.end_time)?;
        if start_time >= end_time {
            return Err(RejectReason::TimeOrder {
                start: start_time.to_hm_string(),
                end: end_time.to_hm_string(),
            });
        }

        if self.routes.is_empty() {
            return Err(RejectReason::NoRoutes);
        }
        let unknown = catalog.unknown_routes(self.routes.iter().copied());
        if !unknown.is_empty() {
            return Err(RejectReason::UnknownRoute {
                ids: unknown.into_iter().map(String::from).collect(),
            });
        }
        // Store the catalog's spelling of each id
        let route_ids: Vec<Arc<str>> = self
            .routes
            .iter()
            .filter_map(|id| catalog.route(id).ok().map(|route| route.id.clone()))
            .collect();

        Ok(ShiftEntry {
            driver_id: driver.clone(),
            date,
            umlauf: umlauf.into(),
            start_time,
            end_time,
            route_ids: route_ids.into(),
        })
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<ClockTime, RejectReason> {
    ClockTime::from_hm(value).ok_or_else(|| RejectReason::InvalidTime {
        field,
        value: value.trim().to_string(),
    })
}
