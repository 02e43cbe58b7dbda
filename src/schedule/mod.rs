mod models;
pub use models::*;

use chrono::NaiveDate;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, PoisonError, RwLock},
    time::Instant,
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schedule storage for driver {0} is unusable after a failed update")]
    Poisoned(DriverId),
    #[error("Shift {umlauf} belongs to driver {found}, expected {expected}")]
    DriverMismatch {
        expected: DriverId,
        found: DriverId,
        umlauf: String,
    },
    #[error("Shift {umlauf} on {date} is invalid: {reason}")]
    InvalidEntry {
        date: NaiveDate,
        umlauf: String,
        reason: &'static str,
    },
}

impl<T> From<(DriverId, PoisonError<T>)> for Error {
    fn from((driver, _): (DriverId, PoisonError<T>)) -> Self {
        Self::Poisoned(driver)
    }
}

/// Counts of what a batch did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub replaced: usize,
}

#[derive(Debug, Default)]
struct DriverSchedule {
    days: BTreeMap<NaiveDate, Vec<ShiftEntry>>,
}

type Partition = Arc<RwLock<DriverSchedule>>;

/// In-memory duty schedules, partitioned by driver.
///
/// Each driver has its own lock, so an upload for one driver never waits on
/// another. Within a driver, writers hold the lock for the whole batch and
/// readers never see it half applied.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    drivers: RwLock<HashMap<DriverId, Partition>>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Shifts of `driver` on `date` ordered by start time. Empty when none are known.
    pub fn shifts(&self, driver: &DriverId, date: NaiveDate) -> Result<Vec<ShiftEntry>, self::Error> {
        let Some(partition) = self.partition(driver) else {
            return Ok(Vec::new());
        };
        let schedule = partition
            .read()
            .map_err(|err| (driver.clone(), err))?;
        Ok(schedule.days.get(&date).cloned().unwrap_or_default())
    }

    /// Dates on which `driver` has at least one shift, ascending.
    pub fn dates(&self, driver: &DriverId) -> Result<Vec<NaiveDate>, self::Error> {
        let Some(partition) = self.partition(driver) else {
            return Ok(Vec::new());
        };
        let schedule = partition
            .read()
            .map_err(|err| (driver.clone(), err))?;
        Ok(schedule.days.keys().copied().collect())
    }

    /// Inserts `entry` or replaces the entry with the same driver, date and duty code.
    pub fn upsert(&self, entry: ShiftEntry) -> Result<UpsertSummary, self::Error> {
        let driver = entry.driver_id.clone();
        self.upsert_batch(&driver, vec![entry])
    }

    /// Applies every entry for `driver` as one unit.
    ///
    /// All entries are checked before the store is touched; if any of them is
    /// unusable nothing is applied. Later entries win over earlier ones with
    /// the same key.
    pub fn upsert_batch(
        &self,
        driver: &DriverId,
        entries: Vec<ShiftEntry>,
    ) -> Result<UpsertSummary, self::Error> {
        let now = Instant::now();
        for entry in entries.iter() {
            check_entry(driver, entry)?;
        }
        if entries.is_empty() {
            return Ok(UpsertSummary::default());
        }

        let partition = self.partition_or_insert(driver);
        let mut schedule = partition
            .write()
            .map_err(|err| (driver.clone(), err))?;

        // Stage the touched days on copies, then swap them in at once
        let mut staged: BTreeMap<NaiveDate, Vec<ShiftEntry>> = BTreeMap::new();
        let mut summary = UpsertSummary::default();
        for entry in entries {
            let day = staged
                .entry(entry.date)
                .or_insert_with(|| schedule.days.get(&entry.date).cloned().unwrap_or_default());
            if upsert_into(day, entry) {
                summary.replaced += 1;
            } else {
                summary.inserted += 1;
            }
        }
        schedule.days.extend(staged);

        debug!("Upserting shifts for driver {driver} took {:?}", now.elapsed());
        info!(
            "Driver {driver}: {} shifts inserted, {} replaced",
            summary.inserted, summary.replaced
        );
        Ok(summary)
    }

    pub fn driver_count(&self) -> usize {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn shift_count(&self, driver: &DriverId) -> Result<usize, self::Error> {
        let Some(partition) = self.partition(driver) else {
            return Ok(0);
        };
        let schedule = partition
            .read()
            .map_err(|err| (driver.clone(), err))?;
        Ok(schedule.days.values().map(Vec::len).sum())
    }

    fn partition(&self, driver: &DriverId) -> Option<Partition> {
        // The outer map only ever gains whole partitions, so a poisoned guard is still consistent
        let drivers = self.drivers.read().unwrap_or_else(PoisonError::into_inner);
        drivers.get(driver).cloned()
    }

    fn partition_or_insert(&self, driver: &DriverId) -> Partition {
        if let Some(partition) = self.partition(driver) {
            return partition;
        }
        let mut drivers = self.drivers.write().unwrap_or_else(PoisonError::into_inner);
        drivers.entry(driver.clone()).or_default().clone()
    }
}

fn check_entry(driver: &DriverId, entry: &ShiftEntry) -> Result<(), self::Error> {
    if &entry.driver_id != driver {
        return Err(self::Error::DriverMismatch {
            expected: driver.clone(),
            found: entry.driver_id.clone(),
            umlauf: entry.umlauf.to_string(),
        });
    }
    let reason = if entry.umlauf.trim().is_empty() {
        Some("empty duty code")
    } else if entry.start_time >= entry.end_time {
        Some("start time is not before end time")
    } else if entry.route_ids.is_empty() {
        Some("no routes")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(self::Error::InvalidEntry {
            date: entry.date,
            umlauf: entry.umlauf.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Returns true when an entry with the same duty code was replaced.
fn upsert_into(day: &mut Vec<ShiftEntry>, entry: ShiftEntry) -> bool {
    let key = entry.key();
    let replaced = match day.iter().position(|e| e.key() == key) {
        Some(position) => {
            day.remove(position);
            true
        }
        None => false,
    };
    let position = day.partition_point(|e| e.sort_key() < entry.sort_key());
    day.insert(position, entry);
    replaced
}
