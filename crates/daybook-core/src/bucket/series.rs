//! Category hours per bucket.
//!
//! Every resolved interval contributes its overlap with each bucket, in
//! hours, to the bucket's entry for the interval's category. Categories
//! outside the selection go to the bucket's `other` total when the rollup is
//! enabled and are dropped otherwise; a selected category's total never
//! includes another category's time.
//!
//! # Complexity
//!
//! Buckets are contiguous and sorted, so the first bucket an interval touches
//! is found by binary search over bucket ends. The total cost is
//! `O(E log B + overlaps)` for `E` intervals and `B` buckets instead of the
//! naive `O(E * B)`.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use tracing::{debug, instrument};

use super::{Bucket, Granularity, generate_buckets};
use crate::HOUR_MS;
use crate::calendar::Calendar;
use crate::category::{category_summaries, grouping_key};
use crate::error::EngineError;
use crate::interval::{Interval, resolve_timeline};
use crate::model::{Event, EventLog};

/// Intervals processed between progress callbacks.
const PROGRESS_STRIDE: usize = 4096;

// ---------------------------------------------------------------------------
// CategorySelection
// ---------------------------------------------------------------------------

/// Which categories get their own series, and whether the rest are rolled
/// into `other`.
///
/// Names match events by [`grouping_key`], so `"work"` selects events
/// stored as `" Work"`. Each selected category is reported under the first
/// spelling it was selected with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection {
    names: Vec<String>,
    slots: HashMap<String, usize>,
    include_other: bool,
}

impl CategorySelection {
    pub fn new<I, S>(names: I, include_other: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self {
            names: Vec::new(),
            slots: HashMap::new(),
            include_other,
        };
        for name in names {
            let name = name.into();
            let key = grouping_key(&name);
            if !selection.slots.contains_key(&key) {
                selection.slots.insert(key, selection.names.len());
                selection.names.push(name);
            }
        }
        selection
    }

    /// Select every category present in `events`, under its canonical name.
    #[must_use]
    pub fn all_in(events: &[Event], include_other: bool) -> Self {
        Self::new(
            category_summaries(events).into_iter().map(|group| group.canonical),
            include_other,
        )
    }

    /// Selected display names, in selection order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub const fn include_other(&self) -> bool {
        self.include_other
    }

    /// Series slot of a raw category, if selected.
    #[must_use]
    pub fn slot(&self, raw_category: &str) -> Option<usize> {
        self.slots.get(&grouping_key(raw_category)).copied()
    }
}

// ---------------------------------------------------------------------------
// BucketPoint
// ---------------------------------------------------------------------------

/// Hours per selected category attributed to one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketPoint {
    pub bucket: Bucket,
    /// Every selected category, zero when it has no time in the bucket.
    pub hours: BTreeMap<String, f64>,
    /// Hours of unselected categories; `None` when the rollup is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_hours: Option<f64>,
}

impl BucketPoint {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.bucket.label
    }

    /// Hours across every selected category and `other`.
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.hours.values().sum::<f64>() + self.other_hours.unwrap_or(0.0)
    }
}

/// Progress of a long series build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesProgress {
    pub processed: usize,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Attribute interval hours to buckets.
///
/// `buckets` must be sorted and contiguous, as produced by
/// [`generate_buckets`]; `intervals` must be sorted by end time.
#[must_use]
pub fn build_category_series(
    intervals: &[Interval<'_>],
    buckets: &[Bucket],
    selection: &CategorySelection,
) -> Vec<BucketPoint> {
    build_category_series_with_progress(intervals, buckets, selection, &mut |_| {})
}

/// [`build_category_series`] with a progress callback.
///
/// The callback runs every few thousand intervals and once at the end. It
/// exists for UI responsiveness only; results do not depend on it.
pub fn build_category_series_with_progress(
    intervals: &[Interval<'_>],
    buckets: &[Bucket],
    selection: &CategorySelection,
    progress: &mut dyn FnMut(SeriesProgress),
) -> Vec<BucketPoint> {
    let slot_count = selection.names().len();
    let mut hours = vec![vec![0.0_f64; slot_count]; buckets.len()];
    let mut other = vec![0.0_f64; buckets.len()];
    let total = intervals.len();

    for (processed, interval) in intervals.iter().enumerate() {
        if processed > 0 && processed % PROGRESS_STRIDE == 0 {
            progress(SeriesProgress { processed, total });
        }

        let slot = selection.slot(&interval.event.category);
        if slot.is_none() && !selection.include_other() {
            continue;
        }

        let first = buckets.partition_point(|b| b.end_ms <= interval.start_ms);
        for (offset, bucket) in buckets[first..].iter().enumerate() {
            if bucket.start_ms >= interval.end_ms {
                break;
            }
            let overlap = interval.overlap_ms(bucket.start_ms, bucket.end_ms) as f64 / HOUR_MS as f64;
            match slot {
                Some(slot) => hours[first + offset][slot] += overlap,
                None => other[first + offset] += overlap,
            }
        }
    }
    progress(SeriesProgress {
        processed: total,
        total,
    });

    buckets
        .iter()
        .zip(hours)
        .zip(other)
        .map(|((bucket, slot_hours), other_hours)| BucketPoint {
            bucket: bucket.clone(),
            hours: selection
                .names()
                .iter()
                .cloned()
                .zip(slot_hours)
                .collect(),
            other_hours: selection.include_other().then_some(other_hours),
        })
        .collect()
}

/// Category series for a window of the whole journal.
///
/// # Errors
///
/// Propagates bucket generation errors (zero `count`, dates out of range).
#[instrument(skip_all, fields(anchor = %anchor, granularity = %granularity, count = count, selected = selection.names().len()))]
pub fn category_trend<Tz: TimeZone>(
    log: &EventLog,
    anchor: NaiveDate,
    granularity: Granularity,
    count: usize,
    selection: &CategorySelection,
    cal: &Calendar<Tz>,
) -> Result<Vec<BucketPoint>, EngineError> {
    let buckets = generate_buckets(anchor, granularity, count, cal)?;
    let intervals = resolve_timeline(log, cal);
    let points = build_category_series(&intervals, &buckets, selection);
    debug!(
        buckets = points.len(),
        intervals = intervals.len(),
        "category series built"
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EpochMs;
    use crate::interval::resolve_intervals;

    const DAY1: EpochMs = 1_704_067_200_000; // 2024-01-01T00:00:00Z

    fn at(hours: i64) -> EpochMs {
        DAY1 + hours * HOUR_MS
    }

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).expect("date")
    }

    fn sample_events() -> Vec<Event> {
        vec![
            Event::new("s1", at(8), "Sleep"),
            Event::new("w1", at(16), "Work"),
            Event::new("g1", at(18), "Gym"),
            Event::new("s2", at(24 + 7), "sleep"),
            Event::new("w2", at(24 + 12), " work"),
        ]
    }

    fn hours_of(point: &BucketPoint, name: &str) -> f64 {
        point.hours.get(name).copied().unwrap_or(f64::NAN)
    }

    #[test]
    fn selected_categories_get_overlap_hours() {
        let cal = Calendar::utc();
        let events = sample_events();
        let intervals = resolve_intervals(&events, None, &cal);
        let buckets = generate_buckets(jan(1), Granularity::Daily, 2, &cal).expect("ok");
        let selection = CategorySelection::new(["Sleep", "Work"], true);

        let points = build_category_series(&intervals, &buckets, &selection);
        assert_eq!(points.len(), 2);

        // Day 1: sleep 0-8, work 8-16, gym 16-18, sleep 18-24 (of 18-31).
        assert!((hours_of(&points[0], "Sleep") - 14.0).abs() < 1e-9);
        assert!((hours_of(&points[0], "Work") - 8.0).abs() < 1e-9);
        assert_eq!(points[0].other_hours, Some(2.0));

        // Day 2: sleep 0-7, work 7-12.
        assert!((hours_of(&points[1], "Sleep") - 7.0).abs() < 1e-9);
        assert!((hours_of(&points[1], "Work") - 5.0).abs() < 1e-9);
        assert_eq!(points[1].other_hours, Some(0.0));
    }

    #[test]
    fn unselected_time_is_dropped_without_rollup() {
        let cal = Calendar::utc();
        let events = sample_events();
        let intervals = resolve_intervals(&events, None, &cal);
        let buckets = generate_buckets(jan(1), Granularity::Weekly, 1, &cal).expect("ok");
        let selection = CategorySelection::new(["Work"], false);

        let points = build_category_series(&intervals, &buckets, &selection);
        assert_eq!(points[0].other_hours, None);
        assert_eq!(points[0].hours.len(), 1);
        assert!((points[0].total_hours() - 13.0).abs() < 1e-9);
    }

    #[test]
    fn empty_selection_with_rollup_puts_everything_in_other() {
        let cal = Calendar::utc();
        let events = sample_events();
        let intervals = resolve_intervals(&events, None, &cal);
        let buckets = generate_buckets(jan(1), Granularity::Monthly, 1, &cal).expect("ok");
        let selection = CategorySelection::new(Vec::<String>::new(), true);

        let points = build_category_series(&intervals, &buckets, &selection);
        assert!(points[0].hours.is_empty());
        assert_eq!(points[0].other_hours, Some(36.0));
    }

    #[test]
    fn selection_matches_case_insensitively_and_dedupes() {
        let selection = CategorySelection::new(["Work", " WORK", "Sleep"], false);
        assert_eq!(selection.names(), ["Work".to_string(), "Sleep".to_string()]);
        assert_eq!(selection.slot("work "), Some(0));
        assert_eq!(selection.slot("Gym"), None);
    }

    #[test]
    fn all_in_selects_canonical_names() {
        let selection = CategorySelection::all_in(&sample_events(), false);
        assert_eq!(
            selection.names(),
            ["Gym".to_string(), "Sleep".to_string(), "Work".to_string()]
        );
    }

    #[test]
    fn intervals_outside_the_window_contribute_nothing() {
        let cal = Calendar::utc();
        let events = sample_events();
        let intervals = resolve_intervals(&events, None, &cal);
        let buckets = generate_buckets(jan(10), Granularity::Daily, 3, &cal).expect("ok");
        let selection = CategorySelection::new(["Sleep", "Work", "Gym"], true);

        let points = build_category_series(&intervals, &buckets, &selection);
        assert!(points.iter().all(|p| p.total_hours() == 0.0));
    }

    #[test]
    fn progress_reports_completion() {
        let cal = Calendar::utc();
        let events = sample_events();
        let intervals = resolve_intervals(&events, None, &cal);
        let buckets = generate_buckets(jan(1), Granularity::Daily, 2, &cal).expect("ok");
        let selection = CategorySelection::new(["Work"], true);

        let mut seen = Vec::new();
        let _ = build_category_series_with_progress(&intervals, &buckets, &selection, &mut |p| {
            seen.push(p);
        });
        assert_eq!(
            seen,
            vec![SeriesProgress {
                processed: 5,
                total: 5
            }]
        );
    }

    #[test]
    fn category_trend_resolves_the_timeline() {
        let cal = Calendar::utc();
        let log = EventLog::new(sample_events()).expect("valid");
        let selection = CategorySelection::new(["Sleep"], false);
        let points =
            category_trend(&log, jan(1), Granularity::Daily, 2, &selection, &cal).expect("ok");
        let total: f64 = points.iter().map(|p| hours_of(p, "Sleep")).sum();
        assert!((total - 21.0).abs() < 1e-9);
    }
}
