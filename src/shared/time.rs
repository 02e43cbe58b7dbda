use std::{
    fmt::Display,
    ops::{Add, Sub},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

const MINUTES_PER_HOUR: u16 = 60;
const MINUTES_PER_DAY: u16 = 24 * MINUTES_PER_HOUR;

/// Time of day with minute resolution, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl Sub<ClockTime> for ClockTime {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(u32::from(self.0.saturating_sub(rhs.0)))
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}",
            self.0 / MINUTES_PER_HOUR,
            self.0 % MINUTES_PER_HOUR
        )
    }
}

impl ClockTime {
    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes < MINUTES_PER_DAY {
            Some(Self(minutes))
        } else {
            None
        }
    }

    pub const fn as_minutes(&self) -> u16 {
        self.0
    }

    pub fn to_hm_string(&self) -> String {
        self.to_string()
    }

    /// Parses `HH:MM` (the hour may be a single digit). Seconds are not accepted.
    pub fn from_hm(time: &str) -> Option<Self> {
        let (hours, minutes) = time.trim().split_once(':')?;
        if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
            return None;
        }
        if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hours: u16 = hours.parse().ok()?;
        let minutes: u16 = minutes.parse().ok()?;
        if hours >= 24 || minutes >= MINUTES_PER_HOUR {
            return None;
        }
        Some(Self(hours * MINUTES_PER_HOUR + minutes))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hm(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid time of day `{raw}`")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Duration(u32);

impl Duration {
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub const fn as_minutes(&self) -> u32 {
        self.0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hour = u32::from(MINUTES_PER_HOUR);
        write!(f, "{}h{:02}", self.0 / hour, self.0 % hour)
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00";
    let stime = ClockTime::from_hm(time).unwrap();
    assert_eq!(time, stime.to_hm_string())
}

#[test]
fn parse_unparse_2() {
    let time = "12:30";
    let stime = ClockTime::from_hm(time).unwrap();
    assert_eq!(time, stime.to_hm_string())
}

#[test]
fn parse_single_digit_hour() {
    let stime = ClockTime::from_hm("8:05").unwrap();
    assert_eq!(stime.as_minutes(), 485);
    assert_eq!(stime.to_hm_string(), "08:05");
}

#[test]
fn valid_time_test() {
    assert_eq!(ClockTime::from_hm("23:59").unwrap().as_minutes(), 1439);
}

#[test]
fn invalid_time_test_1() {
    assert!(ClockTime::from_hm("24:00").is_none())
}

#[test]
fn invalid_time_test_2() {
    assert!(ClockTime::from_hm("12:60").is_none())
}

#[test]
fn invalid_time_test_3() {
    assert!(ClockTime::from_hm("12:00:00").is_none())
}

#[test]
fn invalid_time_test_4() {
    assert!(ClockTime::from_hm("1a:00").is_none());
    assert!(ClockTime::from_hm("-1:00").is_none());
    assert!(ClockTime::from_hm("").is_none());
}

#[test]
fn shift_length() {
    let start = ClockTime::from_hm("08:00").unwrap();
    let end = ClockTime::from_hm("12:30").unwrap();
    assert_eq!((end - start).as_minutes(), 270);
    assert_eq!((end - start).to_string(), "4h30");
    assert_eq!(end - start, Duration::from_minutes(270));
    assert_eq!(ClockTime::from_minutes(570), Some(ClockTime::from_hm("9:30").unwrap()));
    assert!(ClockTime::from_minutes(MINUTES_PER_DAY).is_none());
}

#[test]
fn durations_add_past_one_day() {
    let day = ClockTime::from_hm("23:59").unwrap() - ClockTime::from_hm("00:00").unwrap();
    let total = (0..50).fold(Duration::default(), |acc, _| acc + day);
    assert_eq!(total.as_minutes(), 50 * 1439);
    assert_eq!(total.to_string(), "1199h10");
    assert_eq!(
        Duration::from_minutes(u32::MAX) + Duration::from_minutes(1),
        Duration::from_minutes(u32::MAX)
    );
}
