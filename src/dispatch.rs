use crate::{
    catalog::{self, Route, RouteCatalog, RouteSummary, SharedCatalog},
    ingest::{self, IngestResult, Ingester},
    navigation::{self, Itinerary, Resolver},
    schedule::{self, DriverId, ScheduleStore, ShiftEntry},
    shared::time::{ClockTime, Duration},
};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] catalog::Error),
    #[error(transparent)]
    Navigation(#[from] navigation::Error),
    #[error(transparent)]
    Schedule(#[from] schedule::Error),
    #[error(transparent)]
    Ingest(#[from] ingest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    PlanText,
}

/// Everything the chat front end can ask for.
#[derive(Debug, Clone)]
pub enum Request {
    /// Shifts of a driver; `None` means today in the configured time zone.
    Schedule {
        driver: DriverId,
        date: Option<NaiveDate>,
    },
    Routes,
    Route {
        id: String,
    },
    Navigate {
        line: String,
        from: String,
        to: String,
    },
    Upload {
        driver: DriverId,
        format: UploadFormat,
        body: String,
    },
}

#[derive(Debug, Clone)]
pub enum Response {
    Schedule(ScheduleView),
    Routes(Vec<RouteSummary>),
    Route(Route),
    Navigate(Itinerary),
    Upload(IngestResult),
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteRef {
    pub id: Arc<str>,
    /// Display name, absent when the catalog no longer knows the line.
    pub name: Option<Arc<str>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftView {
    pub umlauf: Arc<str>,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub duration: Duration,
    pub routes: Vec<RouteRef>,
}

impl ShiftView {
    fn from(shift: ShiftEntry, catalog: &RouteCatalog) -> Self {
        let routes = shift
            .route_ids
            .iter()
            .map(|id| RouteRef {
                id: id.clone(),
                name: catalog.route(id).ok().map(|route| route.name.clone()),
            })
            .collect();
        Self {
            umlauf: shift.umlauf.clone(),
            start_time: shift.start_time,
            end_time: shift.end_time,
            duration: shift.duration(),
            routes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub driver: DriverId,
    pub date: NaiveDate,
    pub shifts: Vec<ShiftView>,
}

impl ScheduleView {
    pub fn total_duration(&self) -> Duration {
        self.shifts
            .iter()
            .fold(Duration::default(), |acc, shift| acc + shift.duration)
    }
}

/// Owns the catalog and the schedules and answers [`Request`]s.
///
/// Holds no domain logic of its own: each request maps to exactly one call
/// into the catalog, the store, the ingester or the resolver.
pub struct Service {
    catalog: SharedCatalog,
    store: ScheduleStore,
    time_zone: Tz,
    navigation: navigation::Config,
}

impl Service {
    pub fn new(catalog: RouteCatalog, store: ScheduleStore) -> Self {
        Self {
            catalog: catalog.into(),
            store,
            time_zone: chrono_tz::Europe::Berlin,
            navigation: Default::default(),
        }
    }

    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_navigation(mut self, config: navigation::Config) -> Self {
        self.navigation = config;
        self
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn navigation(&self) -> &navigation::Config {
        &self.navigation
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    pub fn catalog(&self) -> Arc<RouteCatalog> {
        self.catalog.snapshot()
    }

    /// Swaps in a freshly loaded catalog. Requests already running keep their snapshot.
    pub fn reload_catalog(&self, catalog: RouteCatalog) {
        let routes = catalog.len();
        let previous = self.catalog.replace(catalog);
        info!("Catalog reloaded: {} routes (was {})", routes, previous.len());
    }

    /// Today's date in the configured time zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.time_zone).date_naive()
    }

    pub fn handle(&self, request: Request) -> Result<Response, self::Error> {
        let catalog = self.catalog.snapshot();
        match request {
            Request::Schedule { driver, date } => {
                let date = date.unwrap_or_else(|| self.today());
                debug!("Schedule for driver {driver} on {date}");
                let shifts = self
                    .store
                    .shifts(&driver, date)?
                    .into_iter()
                    .map(|shift| ShiftView::from(shift, &catalog))
                    .collect();
                Ok(Response::Schedule(ScheduleView {
                    driver,
                    date,
                    shifts,
                }))
            }
            Request::Routes => Ok(Response::Routes(catalog.list_routes())),
            Request::Route { id } => Ok(Response::Route(catalog.route(&id)?.clone())),
            Request::Navigate { line, from, to } => {
                let itinerary = Resolver::new(&catalog)
                    .with_config(self.navigation.clone())
                    .navigate(&line, &from, &to)?;
                Ok(Response::Navigate(itinerary))
            }
            Request::Upload {
                driver,
                format,
                body,
            } => {
                let ingester = Ingester::new(&catalog, &self.store);
                let result = match format {
                    UploadFormat::Csv => ingester.ingest_csv(&driver, &body)?,
                    UploadFormat::PlanText => ingester.ingest_plan_text(&driver, &body)?,
                };
                Ok(Response::Upload(result))
            }
        }
    }
}
