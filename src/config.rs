//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-config.toml file.
//! It provides a centralized way to configure the NOAA station, the prediction request,
//! the favorability rule, and the chart output. Every section is optional in the file;
//! missing values take the defaults below (Montauk, NY for the next 7 days).
//!
//! Three environment variables override the file: `TIDE_STATION_ID`,
//! `TIDE_STATION_NAME` and `TIDE_OUTPUT`.

use crate::request::{self, DateRange};
use crate::Station;
use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Default configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "tide-config.toml";

/// NOAA CO-OPS data retrieval endpoint.
pub const NOAA_DATAGETTER_URL: &str = "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter";

/// Longest window the service will serve high/low predictions for in one request.
const MAX_DAYS: u32 = 3650;

/// Widest highlight band either side of a favorable tide, in minutes.
pub const MAX_HIGHLIGHT_MINUTES: i64 = 24 * 60;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file exists but could not be read or written
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML or has wrongly typed values
    #[error("invalid config file format: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Station identifier missing or not a NOAA station code
    #[error("invalid station identifier {0:?}")]
    InvalidStation(String),

    #[error("invalid date range: begin {begin} is after end {end}")]
    InvalidDateRange { begin: NaiveDate, end: NaiveDate },

    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Application configuration loaded from tide-config.toml
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// NOAA station configuration
    pub station: Station,
    /// Prediction request parameters
    pub request: RequestConfig,
    /// Rule deciding which tides are favorable
    pub favorability: FavorabilityConfig,
    /// Chart output settings
    pub output: OutputConfig,
}

/// Unit system for heights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    English,
    Metric,
}

impl Units {
    /// Value of the `units` query parameter.
    pub fn query_value(self) -> &'static str {
        match self {
            Units::English => "english",
            Units::Metric => "metric",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Units::English => "ft",
            Units::Metric => "m",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Units::English => "feet",
            Units::Metric => "meters",
        }
    }
}

/// Time zone the service reports timestamps in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeZone {
    /// Greenwich Mean Time
    Gmt,
    /// Local standard time, ignoring daylight saving
    Lst,
    /// Local time including daylight saving
    LstLdt,
}

impl TimeZone {
    /// Value of the `time_zone` query parameter.
    pub fn query_value(self) -> &'static str {
        match self {
            TimeZone::Gmt => "gmt",
            TimeZone::Lst => "lst",
            TimeZone::LstLdt => "lst_ldt",
        }
    }

    /// Axis label fragment.
    pub fn label(self) -> &'static str {
        match self {
            TimeZone::Gmt => "GMT",
            TimeZone::Lst => "Local Standard",
            TimeZone::LstLdt => "Local",
        }
    }
}

/// Prediction request parameters
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Data retrieval endpoint (override for testing against a mock server)
    pub base_url: String,
    /// First day of the window; today when absent. TOML string, e.g. "2025-07-24"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_date: Option<NaiveDate>,
    /// Days after `begin_date` to include (the end date is inclusive)
    pub days: u32,
    /// Tidal datum heights are measured from, e.g. "MLLW"
    pub datum: String,
    pub units: Units,
    pub time_zone: TimeZone,
    /// Application name reported to NOAA
    pub application: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        RequestConfig {
            base_url: NOAA_DATAGETTER_URL.to_string(),
            begin_date: None,
            days: 7,
            datum: "MLLW".to_string(), // Mean Lower Low Water
            units: Units::English,
            time_zone: TimeZone::LstLdt,
            application: "tide-windows".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Favorability rule thresholds.
///
/// An event is favorable when its height is strictly below `max_height` and its
/// time of day falls within `daylight_start..=daylight_end`. With `low_tide_only`
/// set, high tides are never favorable.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FavorabilityConfig {
    /// Height threshold in the configured units
    pub max_height: f64,
    /// TOML string, e.g. "06:00:00"
    pub daylight_start: NaiveTime,
    pub daylight_end: NaiveTime,
    pub low_tide_only: bool,
}

impl Default for FavorabilityConfig {
    fn default() -> Self {
        FavorabilityConfig {
            max_height: 1.0,
            daylight_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            daylight_end: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default(),
            low_tide_only: true,
        }
    }
}

/// Chart output settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// SVG file the chart is written to
    pub path: PathBuf,
    /// Chart width in pixels
    pub width: u32,
    /// Chart height in pixels
    pub height: u32,
    /// Half-width of the highlight band drawn around each favorable tide
    pub highlight_minutes: i64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            path: PathBuf::from("tide_chart.svg"),
            width: 1400,
            height: 800,
            highlight_minutes: 60,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            station: Station {
                id: "8510560".to_string(),
                name: "Montauk, NY".to_string(),
            },
            request: RequestConfig::default(),
            favorability: FavorabilityConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path` and apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_path(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from specified path.
    /// Falls back to the default configuration if the file doesn't exist;
    /// an unreadable or malformed file is an error.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = toml::from_str::<Config>(&contents)?;
                info!(
                    "Loaded configuration for station: {} ({})",
                    config.station.name, config.station.id
                );
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "No config file at {}, using default configuration (Montauk, NY)",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Overwrite fields from `TIDE_STATION_ID`, `TIDE_STATION_NAME` and `TIDE_OUTPUT`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("TIDE_STATION_ID") {
            self.station.id = id;
        }
        if let Some(name) = lookup("TIDE_STATION_NAME") {
            self.station.name = name;
        }
        if let Some(path) = lookup("TIDE_OUTPUT") {
            self.output.path = PathBuf::from(path);
        }
    }

    /// Save current configuration to the given path.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check every value before any stage uses it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        request::validate_station_id(&self.station.id)?;
        if self.station.name.trim().is_empty() {
            return Err(invalid("station.name", "must not be empty"));
        }

        let req = &self.request;
        if req.base_url.trim().is_empty() {
            return Err(invalid("request.base_url", "must not be empty"));
        }
        if req.datum.trim().is_empty() {
            return Err(invalid("request.datum", "must not be empty"));
        }
        if req.days > MAX_DAYS {
            return Err(invalid(
                "request.days",
                format!("{} exceeds the {} day limit", req.days, MAX_DAYS),
            ));
        }
        if req.timeout_secs == 0 {
            return Err(invalid("request.timeout_secs", "must be positive"));
        }

        let fav = &self.favorability;
        if !fav.max_height.is_finite() {
            return Err(invalid("favorability.max_height", "must be a finite number"));
        }
        if fav.daylight_start > fav.daylight_end {
            return Err(invalid(
                "favorability.daylight_start",
                format!(
                    "{} is after daylight_end {}",
                    fav.daylight_start, fav.daylight_end
                ),
            ));
        }

        let out = &self.output;
        if out.path.as_os_str().is_empty() {
            return Err(invalid("output.path", "must not be empty"));
        }
        if out.width < 200 || out.height < 150 {
            return Err(invalid(
                "output.width/height",
                format!("{}x{} is too small for a chart", out.width, out.height),
            ));
        }
        if out.highlight_minutes < 0 {
            return Err(invalid("output.highlight_minutes", "must not be negative"));
        }
        if out.highlight_minutes > MAX_HIGHLIGHT_MINUTES {
            return Err(invalid(
                "output.highlight_minutes",
                format!(
                    "{} exceeds the {} minute limit",
                    out.highlight_minutes, MAX_HIGHLIGHT_MINUTES
                ),
            ));
        }
        Ok(())
    }

    /// Prediction window: `begin_date` (or `today`) through `days` days later.
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange, ConfigError> {
        let begin = self.request.begin_date.unwrap_or(today);
        let end = begin
            .checked_add_days(Days::new(u64::from(self.request.days)))
            .ok_or_else(|| invalid("request.days", "end date out of range"))?;
        DateRange::new(begin, end)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidField {
        field,
        reason: reason.into(),
    }
}
