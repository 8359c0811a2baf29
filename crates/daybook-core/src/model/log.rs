use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::debug;

use super::Event;
use crate::EpochMs;
use crate::calendar::Calendar;
use crate::error::ValidationError;

/// Events that passed boundary validation, ordered by `end_time`.
///
/// Equal end times keep the order the caller supplied; nothing here
/// re-sorts or derives a tie-break from ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Validate `events` and wrap them.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found: a mood value that is not
    /// a finite number in `[0, 1]`, an end time outside the calendar range,
    /// a repeated id, or an event ending before its predecessor.
    pub fn new(events: Vec<Event>) -> Result<Self, ValidationError> {
        let mut seen_ids = HashSet::with_capacity(events.len());
        let mut previous_end: Option<EpochMs> = None;

        for (index, event) in events.iter().enumerate() {
            for (field, value) in event.mood_fields() {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(ValidationError::MoodOutOfRange {
                        id: event.id.clone(),
                        field,
                        value,
                    });
                }
            }

            if DateTime::<Utc>::from_timestamp_millis(event.end_time).is_none() {
                return Err(ValidationError::TimestampOutOfRange {
                    id: event.id.clone(),
                    end_ms: event.end_time,
                });
            }

            if !seen_ids.insert(event.id.as_str()) {
                return Err(ValidationError::DuplicateId {
                    id: event.id.clone(),
                });
            }

            match previous_end {
                Some(previous_end_ms) if event.end_time < previous_end_ms => {
                    return Err(ValidationError::Unsorted {
                        index,
                        id: event.id.clone(),
                        end_ms: event.end_time,
                        previous_end_ms,
                    });
                }
                _ => {}
            }
            previous_end = Some(event.end_time);
        }

        debug!(count = events.len(), "event log validated");
        Ok(Self { events })
    }

    /// All events in order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events whose `end_time` lies in `[start_ms, end_ms)`.
    #[must_use]
    pub fn events_between(&self, start_ms: EpochMs, end_ms: EpochMs) -> &[Event] {
        let lo = self.events.partition_point(|e| e.end_time < start_ms);
        let hi = self.events.partition_point(|e| e.end_time < end_ms);
        &self.events[lo..hi.max(lo)]
    }

    /// Events whose end time falls on the local calendar day `date`.
    pub fn events_on<Tz: TimeZone>(&self, date: NaiveDate, cal: &Calendar<Tz>) -> &[Event] {
        let (start, end) = cal.day_span(date);
        self.events_between(start, end)
    }

    /// Events ending strictly before `ms`.
    #[must_use]
    pub fn events_before(&self, ms: EpochMs) -> &[Event] {
        let hi = self.events.partition_point(|e| e.end_time < ms);
        &self.events[..hi]
    }

    /// Consume the log, returning the events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HOUR_MS;

    const DAY0: EpochMs = 1_704_067_200_000; // 2024-01-01T00:00:00Z

    fn ev(id: &str, end: EpochMs) -> Event {
        Event::new(id, end, "Work")
    }

    #[test]
    fn accepts_sorted_events_with_ties() {
        let log = EventLog::new(vec![ev("a", 10), ev("b", 10), ev("c", 20)]).expect("valid");
        let ids: Vec<_> = log.events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn rejects_unsorted_events() {
        let err = EventLog::new(vec![ev("a", 20), ev("b", 10)]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Unsorted {
                index: 1,
                id: "b".into(),
                end_ms: 10,
                previous_end_ms: 20,
            }
        );
    }

    #[test]
    fn rejects_mood_outside_unit_range() {
        let bad = ev("a", 1).with_mood(0.5, 1.2, 0.5);
        let err = EventLog::new(vec![bad]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MoodOutOfRange { field: "wakefulness", .. }
        ));
    }

    #[test]
    fn rejects_nan_mood() {
        let bad = ev("a", 1).with_mood(f64::NAN, 0.5, 0.5);
        assert!(matches!(
            EventLog::new(vec![bad]),
            Err(ValidationError::MoodOutOfRange { field: "happiness", .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = EventLog::new(vec![ev("a", 1), ev("a", 2)]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateId { id: "a".into() });
    }

    #[test]
    fn rejects_unrepresentable_timestamps() {
        let err = EventLog::new(vec![ev("a", EpochMs::MAX)]).unwrap_err();
        assert!(matches!(err, ValidationError::TimestampOutOfRange { .. }));
    }

    #[test]
    fn empty_log_is_valid() {
        let log = EventLog::new(Vec::new()).expect("valid");
        assert!(log.is_empty());
        assert!(log.events_between(0, 100).is_empty());
    }

    #[test]
    fn events_on_selects_by_local_day() {
        let log = EventLog::new(vec![
            ev("late", DAY0 - 1),
            ev("first", DAY0),
            ev("mid", DAY0 + 12 * HOUR_MS),
            ev("next", DAY0 + 24 * HOUR_MS),
        ])
        .expect("valid");
        let cal = Calendar::utc();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
        let ids: Vec<_> = log
            .events_on(day, &cal)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, ["first", "mid"]);
        assert_eq!(log.events_before(DAY0).len(), 1);
    }

    #[test]
    fn inverted_range_is_empty() {
        let log = EventLog::new(vec![ev("a", 5), ev("b", 15)]).expect("valid");
        assert!(log.events_between(20, 0).is_empty());
    }
}
