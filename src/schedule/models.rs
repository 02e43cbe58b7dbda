use std::{fmt::Display, sync::Arc};

use chrono::NaiveDate;
use serde::Serialize;

use crate::shared::time::{ClockTime, Duration};

/// Identity of a driver as handed to us by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DriverId(Arc<str>);

impl DriverId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DriverId {
    fn from(value: &str) -> Self {
        Self(value.trim().into())
    }
}

impl From<String> for DriverId {
    fn from(value: String) -> Self {
        value.as_str().into()
    }
}

impl Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One duty (Umlauf) of a driver on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftEntry {
    pub driver_id: DriverId,
    pub date: NaiveDate,
    /// Duty identifier, unique per driver and date.
    pub umlauf: Arc<str>,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// Lines driven during the duty, in the order they were listed.
    pub route_ids: Arc<[Arc<str>]>,
}

/// Identity used for upserts: one entry per driver, date and duty code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShiftKey {
    pub driver_id: DriverId,
    pub date: NaiveDate,
    pub umlauf: Arc<str>,
}

impl ShiftEntry {
    pub fn key(&self) -> ShiftKey {
        ShiftKey {
            driver_id: self.driver_id.clone(),
            date: self.date,
            umlauf: self.umlauf.clone(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Shifts on the same day are ordered by start time, then by duty code.
    pub(crate) fn sort_key(&self) -> (ClockTime, &str) {
        (self.start_time, &self.umlauf)
    }
}
