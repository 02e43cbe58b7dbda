//! Route catalog, driver duty schedules and line navigation hints for a bus
//! driver assistant.
//!
//! The crate keeps everything in memory: a [`catalog::RouteCatalog`] loaded
//! from a JSON document, a [`schedule::ScheduleStore`] filled by uploads
//! through [`ingest::Ingester`], and a [`navigation::Resolver`] that turns two
//! station names on a line into an [`navigation::Itinerary`].
//! [`dispatch::Service`] ties them together behind a closed set of requests.

pub mod catalog;
pub mod dispatch;
pub mod ingest;
pub mod navigation;
pub mod schedule;
pub mod shared;

pub mod prelude {
    pub use crate::catalog::{Route, RouteCatalog, RouteSummary, SharedCatalog, Station};
    pub use crate::dispatch::{Request, Response, Service, UploadFormat};
    pub use crate::ingest::{IngestResult, Ingester, RejectReason, RejectedRow};
    pub use crate::navigation::{Direction, Itinerary, Leg, Resolver};
    pub use crate::schedule::{DriverId, ScheduleStore, ShiftEntry};
    pub use crate::shared::{ClockTime, Coordinate, Distance};
}
