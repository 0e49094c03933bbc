//! # NOAA Tide Data Fetching
//!
//! This module handles the single network operation of the program: one HTTP GET
//! against NOAA's CO-OPS data retrieval API for the query built by
//! [`crate::request`].
//!
//! ## Data Source
//!
//! ### NOAA Tides and Currents
//! - **URL**: https://api.tidesandcurrents.noaa.gov/api/prod/datagetter
//! - **Format**: JSON, `{"predictions": [{"t": "2025-07-24 03:12", "v": "3.104", "type": "H"}, ...]}`
//! - **Errors**: the service answers HTTP 200 with `{"error": {"message": "..."}}` for
//!   bad stations, datums or date ranges
//!
//! ## Error Handling
//!
//! Each failure mode surfaces as its own [`FetchError`] variant:
//! - **Network**: connection refused, DNS failure, timeout
//! - **Status**: the server answered with a non-success status code
//! - **Malformed**: the body is not JSON at all
//! - **Service**: the body is NOAA's error object
//!
//! There is no retry and no cache; a failed run is simply rerun.

use crate::request::TideQuery;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Longest body excerpt kept in a [`FetchError::Status`].
const BODY_EXCERPT_LEN: usize = 200;

/// Errors that can occur while fetching tide predictions.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed (network, timeout, or protocol error)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body is not valid JSON
    #[error("malformed response payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// NOAA reported an error for the query
    #[error("tide service error: {0}")]
    Service(String),
}

/// Response body as returned by the service, before any schema is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPayload(pub Value);

impl RawPayload {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Fetch the predictions described by `query` with a single GET request.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use chrono::NaiveDate;
/// use tide_windows_lib::config::Config;
/// use tide_windows_lib::request::{DateRange, TideQuery};
/// use tide_windows_lib::tide_data::fetch;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let day = NaiveDate::from_ymd_opt(2025, 7, 24).unwrap();
/// let query = TideQuery::build(&config.station, DateRange::new(day, day)?, &config.request)?;
/// let payload = fetch(&query, Duration::from_secs(15)).await?;
/// println!("{}", payload.as_value());
/// # Ok(())
/// # }
/// ```
pub async fn fetch(query: &TideQuery, timeout: Duration) -> Result<RawPayload, FetchError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    info!(
        "Fetching data for station ID: {} from {} to {}...",
        query.param("station").unwrap_or("?"),
        query.param("begin_date").unwrap_or("?"),
        query.param("end_date").unwrap_or("?"),
    );

    let response = client.get(&query.url).query(&query.params).send().await?;
    let status = response.status();
    let body = response.text().await?;
    debug!("Received HTTP {} with {} bytes", status, body.len());

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: excerpt(&body),
        });
    }

    parse_body(&body)
}

/// Decode a response body, separating NOAA's error object from data.
pub fn parse_body(body: &str) -> Result<RawPayload, FetchError> {
    let value: Value = serde_json::from_str(body)?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(FetchError::Service(message));
    }

    Ok(RawPayload(value))
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RequestConfig;
    use crate::fixtures;
    use crate::request::DateRange;
    use crate::Station;
    use chrono::NaiveDate;
    use httpmock::prelude::*;

    fn query_for(server: &MockServer) -> TideQuery {
        let settings = RequestConfig {
            base_url: server.url("/api/prod/datagetter"),
            ..RequestConfig::default()
        };
        let station = Station {
            id: "8510560".to_string(),
            name: "Montauk, NY".to_string(),
        };
        let day = NaiveDate::from_ymd_opt(2025, 7, 24).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 7, 25).unwrap();
        TideQuery::build(&station, DateRange::new(day, end).unwrap(), &settings).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_returns_payload() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/prod/datagetter")
                    .query_param("product", "predictions")
                    .query_param("interval", "hilo")
                    .query_param("station", "8510560")
                    .query_param("begin_date", "20250724")
                    .query_param("end_date", "20250725")
                    .query_param("format", "json");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(fixtures::two_day_hilo_json());
            })
            .await;

        let payload = fetch(&query_for(&server), Duration::from_secs(5))
            .await
            .unwrap();

        mock.assert_async().await;
        let predictions = payload.as_value()["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 4);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/prod/datagetter");
                then.status(503).body("Service Unavailable");
            })
            .await;

        let err = fetch(&query_for(&server), Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "Service Unavailable");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_service_error_object() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/prod/datagetter");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(fixtures::service_error_json());
            })
            .await;

        let err = fetch(&query_for(&server), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, FetchError::Service(msg) if msg.contains("No Predictions data was found")),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/prod/datagetter");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let err = fetch(&query_for(&server), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/prod/datagetter");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .body(fixtures::two_day_hilo_json());
            })
            .await;

        let err = fetch(&query_for(&server), Duration::from_millis(50))
            .await
            .unwrap_err();
        match err {
            FetchError::Network(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_body_error_without_message() {
        let err = parse_body(r#"{"error": "bad station"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Service(msg) if msg.contains("bad station")));
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let body = "x".repeat(500);
        let short = excerpt(&body);
        assert_eq!(short.len(), BODY_EXCERPT_LEN + 3);
        assert!(short.ends_with("..."));
    }
}
