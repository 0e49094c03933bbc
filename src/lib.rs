//! # Tide Windows Core Library
//!
//! This library provides the data structures and pipeline stages for charting
//! NOAA high/low tide predictions and highlighting the tides that suit an
//! activity such as swimming at low water in daylight.
//!
//! ## Data Flow
//! 1. **Request**: [`request::TideQuery`] built from the station and date range
//! 2. **Fetch**: one HTTP GET to the NOAA CO-OPS datagetter ([`tide_data`])
//! 3. **Tabulate**: raw JSON mapped onto typed [`TideEvent`]s ([`tabulate`])
//! 4. **Classify**: favorability label per event ([`classify`])
//! 5. **Render**: SVG chart or terminal chart ([`renderer`])
//!
//! Each stage owns its error type; [`TideError`] wraps them and names the
//! stage that failed.
//!
//! ## Core Types
//! - [`Station`]: NOAA station code and display name
//! - [`TideEvent`]: a single predicted high or low water
//! - [`TideSeries`]: chronologically ordered events for one station

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod classify;
pub mod config;
pub mod pipeline;
pub mod renderer;
pub mod request;
pub mod tabulate;
pub mod tide_data;

#[cfg(test)]
pub(crate) mod fixtures;

/// NOAA tide station.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// NOAA station ID (e.g., "8510560" for Montauk, NY)
    pub id: String,
    /// Human-readable station name used in the chart title
    pub name: String,
}

/// High or low water.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    /// Short marker used by the terminal chart.
    pub fn marker(self) -> char {
        match self {
            TideKind::High => 'H',
            TideKind::Low => 'L',
        }
    }
}

/// A single predicted high or low tide.
///
/// The timestamp carries no offset: it is in whatever time zone the query
/// asked the service for (station local time by default).
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tide_windows_lib::{TideEvent, TideKind};
///
/// let event = TideEvent {
///     timestamp: NaiveDate::from_ymd_opt(2025, 7, 24)
///         .unwrap()
///         .and_hms_opt(9, 15, 0)
///         .unwrap(),
///     height: 0.4,
///     kind: TideKind::Low,
/// };
/// assert!(event.height < 0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    pub timestamp: NaiveDateTime,
    /// Predicted height above the configured datum, in the configured units
    pub height: f64,
    pub kind: TideKind,
}

/// Chronologically ordered tide events for one station.
///
/// Construct through [`tabulate::tabulate`] to get the ordering guarantee;
/// timestamps are strictly increasing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TideSeries {
    pub events: Vec<TideEvent>,
}

impl TideSeries {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// First and last timestamps, or `None` for an empty series.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Lowest and highest predicted heights, or `None` for an empty series.
    pub fn height_bounds(&self) -> Option<(f64, f64)> {
        if self.events.is_empty() {
            return None;
        }
        Some(
            self.events
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), e| {
                    (min.min(e.height), max.max(e.height))
                }),
        )
    }
}

/// Failure of one pipeline stage.
///
/// The message names the stage so the operator knows whether to fix the
/// configuration, retry later, or report a service change.
#[derive(Error, Debug)]
pub enum TideError {
    #[error("configuration stage failed: {0}")]
    Config(#[from] config::ConfigError),

    #[error("fetch stage failed: {0}")]
    Fetch(#[from] tide_data::FetchError),

    #[error("parse stage failed: {0}")]
    Parse(#[from] tabulate::ParseError),

    #[error("render stage failed: {0}")]
    Render(#[from] renderer::RenderError),
}

impl TideError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            TideError::Config(_) => "configuration",
            TideError::Fetch(_) => "fetch",
            TideError::Parse(_) => "parse",
            TideError::Render(_) => "render",
        }
    }
}
