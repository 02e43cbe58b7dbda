use crate::ingest::row::{RawRow, RejectReason, split_routes};

const DATE_LABEL: &str = "Date:";
const UMLAUF_LABEL: &str = "Umlauf:";
const TIME_LABEL: &str = "Time:";
const ROUTES_LABEL: &str = "Routes:";

/// Reads a duty plan written as labelled text blocks:
///
/// ```text
/// Date: 2025-04-17
/// Umlauf: U1 Time: 08:00-12:00 Routes: 31,32
/// Umlauf: U2 Time: 13:00-17:30 Routes: 33
/// ```
///
/// A shift line belongs to the closest `Date:` line above it. Lines carrying
/// neither label are ignored, which keeps headings and page footers of an
/// exported plan out of the report.
pub(crate) fn read_rows(raw: &str) -> Vec<(u64, Result<RawRow<'_>, RejectReason>)> {
    let mut rows = Vec::new();
    let mut current_date: Option<&str> = None;
    for (i, line) in raw.lines().enumerate() {
        let line_number = i as u64 + 1;
        let line = line.trim();

        if let Some(date) = line.strip_prefix(DATE_LABEL) {
            current_date = Some(date.trim());
            continue;
        }
        let Some(rest) = line.strip_prefix(UMLAUF_LABEL) else {
            continue;
        };

        let row = match current_date {
            Some(date) => parse_shift(date, rest),
            None => Err(RejectReason::MissingDate),
        };
        rows.push((line_number, row));
    }
    rows
}

fn parse_shift<'a>(date: &'a str, rest: &'a str) -> Result<RawRow<'a>, RejectReason> {
    let malformed = || RejectReason::Malformed {
        detail: format!("expected `{UMLAUF_LABEL} <code> {TIME_LABEL} HH:MM-HH:MM {ROUTES_LABEL} <ids>`"),
    };
    let (umlauf, rest) = rest.split_once(TIME_LABEL).ok_or_else(malformed)?;
    let (times, routes) = rest.split_once(ROUTES_LABEL).ok_or_else(malformed)?;
    let (start_time, end_time) = times.trim().split_once('-').ok_or_else(malformed)?;
    Ok(RawRow {
        date,
        umlauf: umlauf.trim(),
        start_time: start_time.trim(),
        end_time: end_time.trim(),
        routes: split_routes([routes]),
    })
}
