//! Test fixtures: representative JSON payloads from the NOAA datagetter.
//!
//! They mirror the envelope returned by
//!   https://api.tidesandcurrents.noaa.gov/api/prod/datagetter?product=predictions&interval=hilo&format=json
//!
//! Response shape:
//!   predictions[]
//!     .t   : local timestamp "YYYY-MM-DD HH:MM" (string)
//!     .v   : height as a STRING, e.g. "3.104"
//!     .type: "H" or "L"
//!
//! Note: heights are always JSON strings in this API, never numbers.

/// Two days at Montauk with alternating highs and lows; both lows fall in daylight.
pub(crate) fn two_day_hilo_json() -> &'static str {
    r#"{
      "predictions": [
        { "t": "2025-07-24 03:12", "v": "3.100", "type": "H" },
        { "t": "2025-07-24 09:24", "v": "0.400", "type": "L" },
        { "t": "2025-07-24 21:40", "v": "3.300", "type": "H" },
        { "t": "2025-07-25 10:06", "v": "0.200", "type": "L" }
      ]
    }"#
}

/// A low before sunrise and one in the afternoon.
pub(crate) fn night_low_json() -> &'static str {
    r#"{
      "predictions": [
        { "t": "2025-07-24 02:05", "v": "-0.150", "type": "L" },
        { "t": "2025-07-24 08:20", "v": "2.950", "type": "H" },
        { "t": "2025-07-24 14:31", "v": "0.310", "type": "L" },
        { "t": "2025-07-24 20:44", "v": "3.420", "type": "H" }
      ]
    }"#
}

/// Valid envelope, one record with a non-numeric height.
pub(crate) fn bad_height_json() -> &'static str {
    r#"{
      "predictions": [
        { "t": "2025-07-24 03:12", "v": "3.100", "type": "H" },
        { "t": "2025-07-24 09:24", "v": "n/a", "type": "L" }
      ]
    }"#
}

/// Valid envelope with no predictions.
pub(crate) fn empty_predictions_json() -> &'static str {
    r#"{ "predictions": [] }"#
}

/// What NOAA answers for an unknown station or empty window.
pub(crate) fn service_error_json() -> &'static str {
    r#"{
      "error": {
        "message": "No Predictions data was found. Please make sure the Datum input is valid."
      }
    }"#
}
