//! # Prediction Request Builder
//!
//! Turns a station, a date range and the request settings into the exact query
//! sent to the NOAA CO-OPS datagetter. Nothing here touches the network.
//!
//! The query always asks for `product=predictions` with `interval=hilo`, so the
//! service answers with one record per high or low water instead of a
//! six-minute curve.

use crate::config::{ConfigError, RequestConfig};
use crate::Station;
use chrono::NaiveDate;

/// Date format the service expects for `begin_date` / `end_date`.
const DATE_FORMAT: &str = "%Y%m%d";

/// Inclusive range of calendar days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    begin: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(begin: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if begin > end {
            return Err(ConfigError::InvalidDateRange { begin, end });
        }
        Ok(DateRange { begin, end })
    }

    pub fn begin(&self) -> NaiveDate {
        self.begin
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// True when `date` lies within the range, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.begin <= date && date <= self.end
    }
}

/// Reject station identifiers that cannot be a NOAA station code.
pub fn validate_station_id(id: &str) -> Result<(), ConfigError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidStation(id.to_string()));
    }
    Ok(())
}

/// A fully formed request: endpoint plus ordered query parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TideQuery {
    pub url: String,
    pub params: Vec<(&'static str, String)>,
}

impl TideQuery {
    /// Build the high/low prediction query for `station` over `range`.
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use tide_windows_lib::config::RequestConfig;
    /// use tide_windows_lib::request::{DateRange, TideQuery};
    /// use tide_windows_lib::Station;
    ///
    /// let station = Station { id: "8510560".into(), name: "Montauk, NY".into() };
    /// let range = DateRange::new(
    ///     NaiveDate::from_ymd_opt(2025, 7, 24).unwrap(),
    ///     NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
    /// )
    /// .unwrap();
    ///
    /// let query = TideQuery::build(&station, range, &RequestConfig::default()).unwrap();
    /// assert_eq!(query.param("begin_date"), Some("20250724"));
    /// assert_eq!(query.param("interval"), Some("hilo"));
    /// ```
    pub fn build(
        station: &Station,
        range: DateRange,
        settings: &RequestConfig,
    ) -> Result<Self, ConfigError> {
        validate_station_id(&station.id)?;
        if settings.datum.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "request.datum",
                reason: "must not be empty".to_string(),
            });
        }

        let params = vec![
            ("product", "predictions".to_string()),
            ("interval", "hilo".to_string()),
            ("station", station.id.clone()),
            ("begin_date", range.begin().format(DATE_FORMAT).to_string()),
            ("end_date", range.end().format(DATE_FORMAT).to_string()),
            ("datum", settings.datum.trim().to_uppercase()),
            ("units", settings.units.query_value().to_string()),
            ("time_zone", settings.time_zone.query_value().to_string()),
            ("format", "json".to_string()),
            ("application", settings.application.clone()),
        ];

        Ok(TideQuery {
            url: settings.base_url.clone(),
            params,
        })
    }

    /// Value of a query parameter, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TimeZone, Units};

    fn montauk() -> Station {
        Station {
            id: "8510560".to_string(),
            name: "Montauk, NY".to_string(),
        }
    }

    fn july(begin: u32, end: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 7, begin).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, end).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_query_parameters() {
        let mut settings = RequestConfig::default();
        settings.units = Units::Metric;
        settings.time_zone = TimeZone::Gmt;
        settings.datum = "mllw".to_string();

        let query = TideQuery::build(&montauk(), july(24, 26), &settings).unwrap();

        assert_eq!(query.url, crate::config::NOAA_DATAGETTER_URL);
        assert_eq!(query.param("product"), Some("predictions"));
        assert_eq!(query.param("station"), Some("8510560"));
        assert_eq!(query.param("begin_date"), Some("20250724"));
        assert_eq!(query.param("end_date"), Some("20250726"));
        assert_eq!(query.param("datum"), Some("MLLW"));
        assert_eq!(query.param("units"), Some("metric"));
        assert_eq!(query.param("time_zone"), Some("gmt"));
        assert_eq!(query.param("format"), Some("json"));
        assert_eq!(query.param("application"), Some("tide-windows"));
        assert_eq!(query.param("missing"), None);
    }

    #[test]
    fn test_invalid_station_rejected() {
        let mut station = montauk();
        station.id = "".to_string();
        let err = TideQuery::build(&station, july(24, 25), &RequestConfig::default());
        assert!(matches!(err, Err(ConfigError::InvalidStation(_))));

        station.id = "8510560&units=metric".to_string();
        let err = TideQuery::build(&station, july(24, 25), &RequestConfig::default());
        assert!(matches!(err, Err(ConfigError::InvalidStation(_))));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let begin = NaiveDate::from_ymd_opt(2025, 7, 25).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 7, 24).unwrap();
        assert!(matches!(
            DateRange::new(begin, end),
            Err(ConfigError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_single_day_range() {
        let range = july(24, 24);
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 7, 24).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 7, 25).unwrap()));
    }
}
