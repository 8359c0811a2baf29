//! Start-time inference for end-time-only events.
//!
//! An event records only when it ended. Its interval starts where the
//! previous event ended, so a run of sorted events resolves into contiguous,
//! non-overlapping half-open spans `[start, end)`. The first event of a run
//! starts at the caller-supplied predecessor end when one is known, and at
//! local midnight of its own day otherwise.
//!
//! Input must already be sorted by `end_time` (see [`crate::EventLog`]).
//! The resolver never re-sorts: unsorted input produces clamped, visibly
//! wrong intervals rather than silently corrected ones.

use chrono::{NaiveDate, TimeZone};
use tracing::{instrument, trace};

use crate::calendar::Calendar;
use crate::model::{Event, EventLog};
use crate::{EpochMs, HOUR_MS, MINUTE_MS};

/// Length given to an interval whose inferred start is not before its end.
pub const DEGENERATE_DURATION_MS: EpochMs = HOUR_MS;

/// Derived `[start_ms, end_ms)` span attributed to one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval<'a> {
    pub start_ms: EpochMs,
    pub end_ms: EpochMs,
    pub event: &'a Event,
}

impl<'a> Interval<'a> {
    #[must_use]
    pub const fn duration_ms(&self) -> EpochMs {
        self.end_ms - self.start_ms
    }

    #[must_use]
    pub fn duration_minutes(&self) -> f64 {
        self.duration_ms() as f64 / MINUTE_MS as f64
    }

    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        self.duration_ms() as f64 / HOUR_MS as f64
    }

    /// Whether `ms` lies inside `[start_ms, end_ms)`.
    #[must_use]
    pub const fn contains(&self, ms: EpochMs) -> bool {
        self.start_ms <= ms && ms < self.end_ms
    }

    /// Length of the intersection with `[start_ms, end_ms)`, zero if disjoint.
    #[must_use]
    pub fn overlap_ms(&self, start_ms: EpochMs, end_ms: EpochMs) -> EpochMs {
        (self.end_ms.min(end_ms) - self.start_ms.max(start_ms)).max(0)
    }

    /// Local date on which the interval starts.
    pub fn start_date<Tz: TimeZone>(&self, cal: &Calendar<Tz>) -> NaiveDate {
        cal.date_of(self.start_ms)
    }

    /// Local date of the interval's last instant.
    ///
    /// An interval ending exactly at midnight belongs to the earlier day.
    pub fn end_date<Tz: TimeZone>(&self, cal: &Calendar<Tz>) -> NaiveDate {
        cal.date_of((self.end_ms - 1).max(self.start_ms))
    }

    /// The event this interval was derived from.
    #[must_use]
    pub const fn event(&self) -> &'a Event {
        self.event
    }
}

/// Resolve a sorted run of events into intervals.
///
/// The first interval starts at `predecessor_end` when given, otherwise at
/// local midnight of the first event's day; every later interval starts at
/// the previous event's end. An interval that would not have positive length
/// is clamped to [`DEGENERATE_DURATION_MS`] ending at the event's end time.
pub fn resolve_intervals<'a, Tz: TimeZone>(
    events: &'a [Event],
    predecessor_end: Option<EpochMs>,
    cal: &Calendar<Tz>,
) -> Vec<Interval<'a>> {
    let Some(first) = events.first() else {
        return Vec::new();
    };

    let mut start = predecessor_end
        .unwrap_or_else(|| cal.start_of_day(cal.date_of(first.end_time)));
    let mut intervals = Vec::with_capacity(events.len());

    for event in events {
        let end = event.end_time;
        let start_ms = if end > start {
            start
        } else {
            trace!(id = %event.id, start, end, "degenerate interval clamped");
            end - DEGENERATE_DURATION_MS
        };
        intervals.push(Interval {
            start_ms,
            end_ms: end,
            event,
        });
        start = end;
    }

    intervals
}

/// Resolve one day's events; the first interval reaches back to midnight.
pub fn resolve_day<'a, Tz: TimeZone>(events: &'a [Event], cal: &Calendar<Tz>) -> Vec<Interval<'a>> {
    resolve_intervals(events, None, cal)
}

/// Resolve the whole journal as one continuous run.
///
/// Intervals cross day boundaries: an event logged at 07:00 after one logged
/// at 23:00 the night before covers the eight hours between them.
#[instrument(skip_all, fields(events = log.len()))]
pub fn resolve_timeline<'a, Tz: TimeZone>(
    log: &'a EventLog,
    cal: &Calendar<Tz>,
) -> Vec<Interval<'a>> {
    resolve_intervals(log.events(), None, cal)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY1: EpochMs = 1_704_067_200_000; // 2024-01-01T00:00:00Z

    fn at(hours: i64) -> EpochMs {
        DAY1 + hours * HOUR_MS
    }

    fn spans(intervals: &[Interval<'_>]) -> Vec<(EpochMs, EpochMs)> {
        intervals.iter().map(|i| (i.start_ms, i.end_ms)).collect()
    }

    #[test]
    fn empty_input_resolves_to_nothing() {
        let cal = Calendar::utc();
        assert!(resolve_intervals(&[], Some(5), &cal).is_empty());
    }

    #[test]
    fn sleep_then_work_resolves_from_midnight() {
        let cal = Calendar::utc();
        let events = vec![Event::new("s", at(9), "Sleep"), Event::new("w", at(17), "Work")];
        let intervals = resolve_day(&events, &cal);
        assert_eq!(spans(&intervals), vec![(at(0), at(9)), (at(9), at(17))]);
        assert_eq!(intervals[0].event.id, "s");
        assert!((intervals[0].duration_hours() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn predecessor_end_replaces_midnight() {
        let cal = Calendar::utc();
        let events = vec![Event::new("a", at(7), "Sleep")];
        let intervals = resolve_intervals(&events, Some(at(-1)), &cal);
        assert_eq!(spans(&intervals), vec![(at(-1), at(7))]);
    }

    #[test]
    fn timeline_crosses_midnight() {
        let cal = Calendar::utc();
        let log = EventLog::new(vec![
            Event::new("a", at(23), "Work"),
            Event::new("b", at(31), "Sleep"),
        ])
        .expect("valid");
        let intervals = resolve_timeline(&log, &cal);
        assert_eq!(spans(&intervals), vec![(at(0), at(23)), (at(23), at(31))]);
        assert_eq!(intervals[1].start_date(&cal), cal.date_of(at(23)));
        assert_eq!(intervals[1].end_date(&cal), cal.date_of(at(31)));
    }

    #[test]
    fn equal_end_times_clamp_to_one_hour() {
        let cal = Calendar::utc();
        let events = vec![Event::new("a", at(5), "Work"), Event::new("b", at(5), "Gym")];
        let intervals = resolve_day(&events, &cal);
        assert_eq!(spans(&intervals), vec![(at(0), at(5)), (at(4), at(5))]);
    }

    #[test]
    fn event_exactly_at_midnight_gets_fallback_hour() {
        let cal = Calendar::utc();
        let events = vec![Event::new("a", at(0), "Sleep")];
        let intervals = resolve_day(&events, &cal);
        assert_eq!(spans(&intervals), vec![(at(-1), at(0))]);
    }

    #[test]
    fn overlap_and_contains_are_half_open() {
        let event = Event::new("a", at(10), "Work");
        let interval = Interval {
            start_ms: at(8),
            end_ms: at(10),
            event: &event,
        };
        assert!(interval.contains(at(8)));
        assert!(!interval.contains(at(10)));
        assert_eq!(interval.overlap_ms(at(9), at(12)), HOUR_MS);
        assert_eq!(interval.overlap_ms(at(10), at(12)), 0);
        assert_eq!(interval.overlap_ms(at(0), at(24)), 2 * HOUR_MS);
    }

    #[test]
    fn interval_ending_at_midnight_belongs_to_earlier_day() {
        let cal = Calendar::utc();
        let event = Event::new("a", at(24), "Work");
        let interval = Interval {
            start_ms: at(22),
            end_ms: at(24),
            event: &event,
        };
        assert_eq!(interval.end_date(&cal), cal.date_of(at(0)));
    }
}
