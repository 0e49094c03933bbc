//! # Favorability Classification
//!
//! Labels each tide event by a pure rule over its kind, height and time of day.
//! The default rule picks low tides under a height threshold in daylight, which
//! is what matters for a swim at low water; every threshold comes from
//! [`FavorabilityConfig`].

use crate::config::FavorabilityConfig;
use crate::{TideEvent, TideKind, TideSeries};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FavorabilityLabel {
    Favorable,
    Unfavorable,
}

impl FavorabilityLabel {
    pub fn is_favorable(self) -> bool {
        self == FavorabilityLabel::Favorable
    }
}

/// A tide event with its label attached.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledEvent {
    pub event: TideEvent,
    pub label: FavorabilityLabel,
}

/// A [`TideSeries`] after classification, same order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries {
    pub events: Vec<LabeledEvent>,
}

impl LabeledSeries {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events labeled favorable, in order.
    pub fn favorable(&self) -> impl Iterator<Item = &TideEvent> {
        self.events
            .iter()
            .filter(|e| e.label.is_favorable())
            .map(|e| &e.event)
    }

    /// Events of one kind, in order.
    pub fn of_kind(&self, kind: TideKind) -> impl Iterator<Item = &LabeledEvent> {
        self.events.iter().filter(move |e| e.event.kind == kind)
    }

    /// The underlying series with labels dropped.
    pub fn to_series(&self) -> TideSeries {
        TideSeries {
            events: self.events.iter().map(|e| e.event).collect(),
        }
    }
}

/// Threshold and time-of-day rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FavorabilityRule {
    max_height: f64,
    daylight_start: NaiveTime,
    daylight_end: NaiveTime,
    low_tide_only: bool,
}

impl FavorabilityRule {
    pub fn new(config: &FavorabilityConfig) -> Self {
        FavorabilityRule {
            max_height: config.max_height,
            daylight_start: config.daylight_start,
            daylight_end: config.daylight_end,
            low_tide_only: config.low_tide_only,
        }
    }

    /// Label a single event. Both daylight bounds are inclusive.
    pub fn label(&self, event: &TideEvent) -> FavorabilityLabel {
        let time = event.timestamp.time();
        let kind_ok = !self.low_tide_only || event.kind == TideKind::Low;
        let depth_ok = event.height < self.max_height;
        let daylight = self.daylight_start <= time && time <= self.daylight_end;

        if kind_ok && depth_ok && daylight {
            FavorabilityLabel::Favorable
        } else {
            FavorabilityLabel::Unfavorable
        }
    }

    pub fn classify(&self, series: &TideSeries) -> LabeledSeries {
        let labeled = self.label_all(series.events.iter());
        info!(
            "{} of {} tides are favorable (below {} during {}-{})",
            labeled.favorable().count(),
            labeled.len(),
            self.max_height,
            self.daylight_start.format("%H:%M"),
            self.daylight_end.format("%H:%M"),
        );
        labeled
    }

    /// Recompute labels for an already-labeled series, ignoring the old labels.
    pub fn reclassify(&self, series: &LabeledSeries) -> LabeledSeries {
        self.label_all(series.events.iter().map(|e| &e.event))
    }

    fn label_all<'a, I>(&self, events: I) -> LabeledSeries
    where
        I: Iterator<Item = &'a TideEvent>,
    {
        LabeledSeries {
            events: events
                .map(|event| LabeledEvent {
                    event: *event,
                    label: self.label(event),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn event(timestamp: NaiveDateTime, height: f64, kind: TideKind) -> TideEvent {
        TideEvent {
            timestamp,
            height,
            kind,
        }
    }

    fn swim_rule() -> FavorabilityRule {
        FavorabilityRule::new(&FavorabilityConfig {
            max_height: 0.5,
            daylight_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            daylight_end: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            low_tide_only: true,
        })
    }

    fn two_day_series() -> TideSeries {
        TideSeries {
            events: vec![
                event(at(24, 3, 12), 3.1, TideKind::High),
                event(at(24, 9, 24), 0.4, TideKind::Low),
                event(at(24, 21, 40), 3.3, TideKind::High),
                event(at(25, 10, 6), 0.2, TideKind::Low),
            ],
        }
    }

    #[test]
    fn test_daylight_lows_below_threshold_are_favorable() {
        let labeled = swim_rule().classify(&two_day_series());
        let labels: Vec<bool> = labeled
            .events
            .iter()
            .map(|e| e.label.is_favorable())
            .collect();
        assert_eq!(labels, vec![false, true, false, true]);
        assert!(labeled.favorable().all(|e| e.kind == TideKind::Low));
    }

    #[test]
    fn test_night_low_is_not_favorable() {
        let rule = swim_rule();
        assert_eq!(
            rule.label(&event(at(24, 2, 5), -0.15, TideKind::Low)),
            FavorabilityLabel::Unfavorable
        );
        assert_eq!(
            rule.label(&event(at(24, 20, 1), 0.1, TideKind::Low)),
            FavorabilityLabel::Unfavorable
        );
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let rule = swim_rule();
        assert!(rule
            .label(&event(at(24, 6, 0), 0.1, TideKind::Low))
            .is_favorable());
        assert!(rule
            .label(&event(at(24, 20, 0), 0.1, TideKind::Low))
            .is_favorable());
    }

    #[test]
    fn test_threshold_is_strict() {
        let rule = swim_rule();
        assert!(!rule
            .label(&event(at(24, 12, 0), 0.5, TideKind::Low))
            .is_favorable());
    }

    #[test]
    fn test_high_tides_allowed_when_not_low_only() {
        let rule = FavorabilityRule::new(&FavorabilityConfig {
            max_height: 4.0,
            low_tide_only: false,
            ..FavorabilityConfig::default()
        });
        assert!(rule
            .label(&event(at(24, 12, 0), 3.3, TideKind::High))
            .is_favorable());
    }

    #[test]
    fn test_classification_is_deterministic_and_idempotent() {
        let rule = swim_rule();
        let series = two_day_series();

        let first = rule.classify(&series);
        let second = rule.classify(&series);
        assert_eq!(first, second);

        let again = rule.reclassify(&first);
        assert_eq!(first, again);
        assert_eq!(again.to_series(), series);
    }

    #[test]
    fn test_reclassify_replaces_stale_labels() {
        let rule = swim_rule();
        let mut labeled = rule.classify(&two_day_series());
        for e in &mut labeled.events {
            e.label = FavorabilityLabel::Favorable;
        }
        let fixed = rule.reclassify(&labeled);
        assert_eq!(fixed.favorable().count(), 2);
    }

    #[test]
    fn test_of_kind_filters() {
        let labeled = swim_rule().classify(&two_day_series());
        assert_eq!(labeled.of_kind(TideKind::High).count(), 2);
        assert_eq!(labeled.of_kind(TideKind::Low).count(), 2);
    }
}
