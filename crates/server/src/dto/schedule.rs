use chrono::NaiveDate;
use dutyroute::dispatch::{ScheduleView, ShiftView};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDto {
    pub driver: String,
    pub date: NaiveDate,
    pub total_duration: String,
    pub shifts: Vec<ShiftView>,
}

impl ScheduleDto {
    pub fn from(view: ScheduleView) -> Self {
        Self {
            driver: view.driver.to_string(),
            date: view.date,
            total_duration: view.total_duration().to_string(),
            shifts: view.shifts,
        }
    }
}
