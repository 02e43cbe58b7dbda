mod row;
mod source;

pub use row::{DATE_FORMAT, RejectReason};

use crate::{
    catalog::RouteCatalog,
    schedule::{self, DriverId, ScheduleStore, ShiftEntry},
};
use rayon::prelude::*;
use row::RawRow;
use serde::Serialize;
use source::{csv_text, plan_text};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] schedule::Error),
}

pub struct Config {
    /// Strip whitespace around every CSV field.
    pub trim: bool,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trim: true,
            comment: Some(b'#'),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub line_number: u64,
    pub reason: RejectReason,
}

/// Outcome of one upload: how many rows were applied and why the others were not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestResult {
    pub accepted: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Turns uploaded duty plans into shift entries for one driver.
///
/// Every row is validated on its own against the route catalog; rows that
/// pass are written to the store as one batch.
pub struct Ingester<'a> {
    catalog: &'a RouteCatalog,
    store: &'a ScheduleStore,
    config: Config,
}

impl<'a> Ingester<'a> {
    pub fn new(catalog: &'a RouteCatalog, store: &'a ScheduleStore) -> Self {
        Self {
            catalog,
            store,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Ingests header-less CSV: `date,umlauf,start_time,end_time,routes`.
    pub fn ingest_csv(&self, driver: &DriverId, raw: &str) -> Result<IngestResult, self::Error> {
        debug!("Reading csv upload for driver {driver}...");
        let now = Instant::now();
        let records = csv_text::read_records(strip_bom(raw), &self.config)?;
        let rows: Vec<(u64, Result<RawRow<'_>, RejectReason>)> = records
            .iter()
            .map(|(line, record)| {
                let row = record
                    .as_ref()
                    .map_err(Clone::clone)
                    .and_then(csv_text::to_raw_row);
                (*line, row)
            })
            .collect();
        debug!("Reading csv upload took {:?}", now.elapsed());
        self.apply(driver, rows)
    }

    /// Ingests a labelled plan (`Date:` lines followed by `Umlauf: .. Time: .. Routes: ..`).
    pub fn ingest_plan_text(&self, driver: &DriverId, raw: &str) -> Result<IngestResult, self::Error> {
        let rows = plan_text::read_rows(strip_bom(raw));
        self.apply(driver, rows)
    }

    fn apply(
        &self,
        driver: &DriverId,
        rows: Vec<(u64, Result<RawRow<'_>, RejectReason>)>,
    ) -> Result<IngestResult, self::Error> {
        let now = Instant::now();
        let validated: Vec<(u64, Result<ShiftEntry, RejectReason>)> = rows
            .into_par_iter()
            .map(|(line, row)| (line, row.and_then(|row| row.validate(driver, self.catalog))))
            .collect();

        let mut entries = Vec::with_capacity(validated.len());
        let mut rejected = Vec::new();
        for (line_number, outcome) in validated {
            match outcome {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    warn!("Driver {driver}: rejected line {line_number}: {reason}");
                    rejected.push(RejectedRow {
                        line_number,
                        reason,
                    });
                }
            }
        }
        debug!("Validating {} rows took {:?}", entries.len() + rejected.len(), now.elapsed());

        let accepted = entries.len();
        self.store.upsert_batch(driver, entries)?;
        info!(
            "Driver {driver}: ingested {accepted} rows, rejected {}",
            rejected.len()
        );
        Ok(IngestResult { accepted, rejected })
    }
}

fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix('\u{feff}').unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn catalog() -> RouteCatalog {
        RouteCatalog::from_json_str(
            r#"[
            { "route_number": "31", "name": "a", "stations": [{ "name": "A", "coords": [49.40, 8.67] }] },
            { "route_number": "32", "name": "b", "stations": [{ "name": "B", "coords": [49.41, 8.69] }] }
        ]"#,
        )
        .unwrap()
    }

    fn date(value: &str) -> NaiveDate {
        value.parse().unwrap()
    }

    #[test]
    fn quoted_route_list_is_accepted() {
        let catalog = catalog();
        let store = ScheduleStore::new();
        let driver: DriverId = "7".into();
        let result = Ingester::new(&catalog, &store)
            .ingest_csv(&driver, "2025-04-17,U1,08:00,12:00,\"31,32\"\n")
            .unwrap();
        assert_eq!(result.accepted, 1);
        assert!(result.rejected.is_empty());

        let shifts = store.shifts(&driver, date("2025-04-17")).unwrap();
        assert_eq!(shifts.len(), 1);
        let ids: Vec<&str> = shifts[0].route_ids.iter().map(|id| id.as_ref()).collect();
        assert_eq!(ids, vec!["31", "32"]);
    }

    #[test]
    fn reversed_times_are_rejected_with_line_number() {
        let catalog = catalog();
        let store = ScheduleStore::new();
        let driver: DriverId = "7".into();
        let raw = "2025-04-17,U1,08:00,12:00,31\n2025-04-17,U2,12:00,08:00,31\n";
        let result = Ingester::new(&catalog, &store).ingest_csv(&driver, raw).unwrap();
        assert_eq!(result.accepted, 1);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].line_number, 2);
        assert!(matches!(result.rejected[0].reason, RejectReason::TimeOrder { .. }));
    }

    #[test]
    fn all_rows_rejected_leaves_store_untouched() {
        let catalog = catalog();
        let store = ScheduleStore::new();
        let driver: DriverId = "7".into();
        let result = Ingester::new(&catalog, &store)
            .ingest_csv(&driver, "2025-04-17,U1,08:00,12:00,99\n")
            .unwrap();
        assert_eq!(result.accepted, 0);
        assert_eq!(
            result.rejected[0].reason.to_string(),
            "unknown route: 99"
        );
        assert_eq!(store.driver_count(), 0);
    }

    #[test]
    fn bom_is_ignored() {
        let catalog = catalog();
        let store = ScheduleStore::new();
        let result = Ingester::new(&catalog, &store)
            .ingest_csv(&"7".into(), "\u{feff}2025-04-17,U1,08:00,12:00,31")
            .unwrap();
        assert_eq!(result.accepted, 1);
    }

    #[test]
    fn plan_text_goes_through_same_validation() {
        let catalog = catalog();
        let store = ScheduleStore::new();
        let driver: DriverId = "7".into();
        let plan = "Date: 2025-04-17\n\
            Umlauf: U1 Time: 08:00-12:00 Routes: 31,32\n\
            Umlauf: U2 Time: 14:00-13:00 Routes: 31\n";
        let result = Ingester::new(&catalog, &store)
            .ingest_plan_text(&driver, plan)
            .unwrap();
        assert_eq!(result.accepted, 1);
        assert_eq!(result.rejected[0].line_number, 3);
        assert_eq!(store.shift_count(&driver).unwrap(), 1);
    }

    #[test]
    fn comments_can_be_disabled() {
        let catalog = catalog();
        let store = ScheduleStore::new();
        let config = Config {
            trim: true,
            comment: None,
        };
        let result = Ingester::new(&catalog, &store)
            .with_config(config)
            .ingest_csv(&"7".into(), "#2025-04-17,U1,08:00,12:00,31")
            .unwrap();
        assert_eq!(result.accepted, 0);
        assert!(matches!(result.rejected[0].reason, RejectReason::InvalidDate { .. }));
    }
}
