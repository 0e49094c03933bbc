//! Fetch → tabulate → classify → render, in order, failing fast on the first
//! stage error.

use crate::classify::{FavorabilityRule, LabeledSeries};
use crate::config::Config;
use crate::renderer::{self, Destination, RenderOutcome};
use crate::request::TideQuery;
use crate::{tabulate, tide_data, TideError};
use chrono::NaiveDate;
use std::time::Duration;

/// Result of a complete run.
#[derive(Debug)]
pub struct Report {
    pub series: LabeledSeries,
    pub outcome: RenderOutcome,
}

/// Run every stage for the configured station.
///
/// `today` anchors the date window when the configuration has no explicit
/// begin date.
pub async fn run(
    config: &Config,
    today: NaiveDate,
    destination: &Destination,
) -> Result<Report, TideError> {
    config.validate()?;
    let range = config.date_range(today)?;
    let query = TideQuery::build(&config.station, range, &config.request)?;

    let payload = tide_data::fetch(&query, Duration::from_secs(config.request.timeout_secs)).await?;
    let series = tabulate::tabulate(&payload)?;
    let labeled = FavorabilityRule::new(&config.favorability).classify(&series);
    let outcome = renderer::render(&labeled, config, destination)?;

    Ok(Report {
        series: labeled,
        outcome,
    })
}
