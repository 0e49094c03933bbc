//! # Prediction Tabulation
//!
//! Maps the loosely-typed service payload onto [`TideEvent`]s. The payload is
//! checked against an explicit schema record by record; the first record that
//! does not conform fails the whole operation, because the chart assumes a
//! complete series.

use crate::tide_data::RawPayload;
use crate::{TideEvent, TideKind, TideSeries};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// Timestamp format of the `t` field.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Errors raised while turning a payload into a [`TideSeries`].
#[derive(Error, Debug)]
pub enum ParseError {
    /// Payload is not an object with a `predictions` array
    #[error("unexpected payload shape: {0}")]
    Envelope(#[source] serde_json::Error),

    /// Record is missing a field or has a field of the wrong JSON type
    #[error("prediction {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("prediction {index}: invalid timestamp {value:?}")]
    Timestamp { index: usize, value: String },

    #[error("prediction {index}: non-numeric height {value:?}")]
    Height { index: usize, value: String },

    #[error("prediction {index}: unknown tide type {value:?}")]
    Kind { index: usize, value: String },

    /// Timestamp not strictly after the previous record's
    #[error("prediction {index}: {timestamp} does not follow {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },
}

/// Top-level payload. A missing `predictions` key is an empty series.
#[derive(Debug, Deserialize)]
struct PredictionsEnvelope {
    #[serde(default)]
    predictions: Vec<Value>,
}

/// One high/low record as the service sends it.
#[derive(Debug, Deserialize)]
struct RawPrediction {
    t: String,
    v: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Convert a raw payload into a chronologically ordered [`TideSeries`].
///
/// # Example
/// ```
/// use serde_json::json;
/// use tide_windows_lib::tabulate::tabulate;
/// use tide_windows_lib::tide_data::RawPayload;
/// use tide_windows_lib::TideKind;
///
/// let payload = RawPayload(json!({
///     "predictions": [
///         { "t": "2025-07-24 03:12", "v": "3.104", "type": "H" },
///         { "t": "2025-07-24 09:24", "v": "0.387", "type": "L" }
///     ]
/// }));
///
/// let series = tabulate(&payload).unwrap();
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.events[1].kind, TideKind::Low);
/// ```
pub fn tabulate(payload: &RawPayload) -> Result<TideSeries, ParseError> {
    let envelope =
        PredictionsEnvelope::deserialize(payload.as_value()).map_err(ParseError::Envelope)?;

    let mut events: Vec<TideEvent> = Vec::with_capacity(envelope.predictions.len());
    for (index, record) in envelope.predictions.iter().enumerate() {
        let raw = RawPrediction::deserialize(record)
            .map_err(|source| ParseError::Record { index, source })?;
        let event = parse_record(index, &raw)?;

        if let Some(previous) = events.last() {
            if event.timestamp <= previous.timestamp {
                return Err(ParseError::OutOfOrder {
                    index,
                    timestamp: event.timestamp,
                    previous: previous.timestamp,
                });
            }
            if event.kind == previous.kind {
                debug!(
                    "Consecutive {:?} tides at {} and {}",
                    event.kind, previous.timestamp, event.timestamp
                );
            }
        }
        events.push(event);
    }

    info!("Parsed {} tide predictions", events.len());
    Ok(TideSeries { events })
}

fn parse_record(index: usize, raw: &RawPrediction) -> Result<TideEvent, ParseError> {
    let timestamp = NaiveDateTime::parse_from_str(raw.t.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        ParseError::Timestamp {
            index,
            value: raw.t.clone(),
        }
    })?;

    let height = raw
        .v
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite())
        .ok_or_else(|| ParseError::Height {
            index,
            value: raw.v.clone(),
        })?;

    let kind = match raw.kind.trim() {
        "H" | "HH" => TideKind::High,
        "L" | "LL" => TideKind::Low,
        _ => {
            return Err(ParseError::Kind {
                index,
                value: raw.kind.clone(),
            })
        }
    };

    Ok(TideEvent {
        timestamp,
        height,
        kind,
    })
}
