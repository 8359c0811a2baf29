//! Per-day statistic rollups.
//!
//! A day's statistics come from the events whose end time falls on that
//! day, resolved with the first interval reaching back to local midnight.
//! Each interval is weighted by its actual duration in minutes:
//!
//! - `avg_happiness`, `avg_health`: weighted mean over every interval.
//! - `avg_wakefulness_awake`: weighted mean over non-sleep intervals only.
//! - `sleep_hours`: total duration of sleep intervals.
//! - `notes`: trimmed non-blank notes in chronological order.
//!
//! A day with no events reports `None` for every aggregate so consumers can
//! tell "nothing logged" apart from "logged zero".
//!
//! # Events ending at midnight
//!
//! An event ending exactly at local midnight belongs to the day that midnight
//! starts, because days are keyed by end time. Being first on that day, its
//! inferred start equals its end, so it is clamped to the hour before
//! midnight and counted here at that length. The grid places the same
//! interval on the earlier day's row (see [`crate::interval::Interval::end_date`]),
//! and the earlier day's statistics do not include it.

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::calendar::{Calendar, DayKey, dates_between};
use crate::interval::{Interval, resolve_day};
use crate::model::{Event, EventLog};

// ---------------------------------------------------------------------------
// WeightedMean
// ---------------------------------------------------------------------------

/// Running duration-weighted mean.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMean {
    sum: f64,
    weight: f64,
}

impl WeightedMean {
    /// Add `value` with `weight`. Non-positive weights are ignored.
    pub fn add(&mut self, value: f64, weight: f64) {
        if weight > 0.0 {
            self.sum += value * weight;
            self.weight += weight;
        }
    }

    /// The mean, or `None` when nothing has been added.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        (self.weight > 0.0).then(|| self.sum / self.weight)
    }

    /// Total weight added so far.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }
}

// ---------------------------------------------------------------------------
// DayStats
// ---------------------------------------------------------------------------

/// Aggregated mood, sleep, and notes for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub day: DayKey,
    pub event_count: usize,
    pub avg_happiness: Option<f64>,
    pub avg_health: Option<f64>,
    /// Wakefulness averaged over non-sleep intervals only.
    pub avg_wakefulness_awake: Option<f64>,
    /// `None` when the day has no events; `Some(0.0)` when none were sleep.
    pub sleep_hours: Option<f64>,
    pub notes: Vec<String>,
}

impl DayStats {
    /// Stats for a day with no events.
    #[must_use]
    pub const fn empty(day: DayKey) -> Self {
        Self {
            day,
            event_count: 0,
            avg_happiness: None,
            avg_health: None,
            avg_wakefulness_awake: None,
            sleep_hours: None,
            notes: Vec::new(),
        }
    }

    /// Whether anything was logged on this day.
    #[must_use]
    pub const fn has_events(&self) -> bool {
        self.event_count > 0
    }
}

/// Roll up already-resolved intervals of one day.
#[must_use]
pub fn day_stats_from_intervals(day: DayKey, intervals: &[Interval<'_>]) -> DayStats {
    if intervals.is_empty() {
        return DayStats::empty(day);
    }

    let mut happiness = WeightedMean::default();
    let mut health = WeightedMean::default();
    let mut wakefulness_awake = WeightedMean::default();
    let mut sleep_minutes = 0.0;
    let mut notes = Vec::new();

    for interval in intervals {
        let event = interval.event;
        let weight = interval.duration_minutes();

        happiness.add(event.happiness, weight);
        health.add(event.health, weight);

        if event.is_sleep() {
            sleep_minutes += weight;
        } else {
            wakefulness_awake.add(event.wakefulness, weight);
        }

        if let Some(text) = event.notes.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            notes.push(text.to_string());
        }
    }

    DayStats {
        day,
        event_count: intervals.len(),
        avg_happiness: happiness.mean(),
        avg_health: health.mean(),
        avg_wakefulness_awake: wakefulness_awake.mean(),
        sleep_hours: Some(sleep_minutes / 60.0),
        notes,
    }
}

/// Stats for `date` from the events ending on that day.
///
/// `events_on_day` must be sorted by end time; the first one is taken to
/// start at local midnight.
pub fn day_stats<Tz: TimeZone>(
    events_on_day: &[Event],
    date: NaiveDate,
    cal: &Calendar<Tz>,
) -> DayStats {
    let intervals = resolve_day(events_on_day, cal);
    day_stats_from_intervals(DayKey(date), &intervals)
}

/// One [`DayStats`] per date in `from..=to`, empty days included.
#[instrument(skip_all, fields(from = %from, to = %to, events = log.len()))]
pub fn summarize_days<Tz: TimeZone>(
    log: &EventLog,
    from: NaiveDate,
    to: NaiveDate,
    cal: &Calendar<Tz>,
) -> Vec<DayStats> {
    let days: Vec<DayStats> = dates_between(from, to)
        .map(|date| day_stats(log.events_on(date, cal), date, cal))
        .collect();
    debug!(
        days = days.len(),
        active = days.iter().filter(|d| d.has_events()).count(),
        "day summaries computed"
    );
    days
}
