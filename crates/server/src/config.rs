use chrono_tz::Tz;
use serde::Deserialize;
use std::{fs, io, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unknown time zone `{0}`")]
    TimeZone(String),
}

/// Server settings, read from a TOML file. Every field has a default.
///
/// ```toml
/// listen_port = 3000
/// catalog_path = "routes.json"
/// time_zone = "Europe/Berlin"
///
/// [directions]
/// url = "http://localhost:8080/directions"
/// timeout_ms = 1500
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listen_port: u16,
    pub catalog_path: PathBuf,
    pub time_zone: String,
    pub map_link_base: String,
    pub directions: DirectionsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: 3000,
            catalog_path: "routes.json".into(),
            time_zone: "Europe/Berlin".into(),
            map_link_base: dutyroute::navigation::Config::default().map_link_base,
            directions: Default::default(),
        }
    }
}

/// External turn-by-turn provider. Disabled when `url` is unset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectionsConfig {
    pub url: Option<String>,
    /// Deadline for all legs of one itinerary together.
    pub timeout_ms: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 1500,
        }
    }
}

impl DirectionsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, self::Error> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, self::Error> {
        Ok(toml::from_str(raw)?)
    }

    pub fn time_zone(&self) -> Result<Tz, self::Error> {
        self.time_zone
            .parse()
            .map_err(|_| self::Error::TimeZone(self.time_zone.clone()))
    }
}
