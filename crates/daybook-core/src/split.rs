//! Day-boundary splitting for the 24-hour grid.
//!
//! The grid draws one row per calendar day. An interval that spans several
//! days is drawn as one segment per row it touches; [`split_for_day`]
//! computes the segment for a given row and classifies it:
//!
//! | kind     | row is...                               | segment                  |
//! |----------|-----------------------------------------|--------------------------|
//! | `full`   | both the start and the end date         | the whole interval       |
//! | `start`  | the start date only                     | start .. end of row      |
//! | `middle` | strictly between start and end dates    | the whole row            |
//! | `end`    | the end date only                       | start of row .. end      |
//!
//! Splitting is presentation only. Statistics always use the unsplit
//! interval durations.

use std::fmt;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;
use crate::interval::Interval;
use crate::model::Event;
use crate::{EpochMs, MINUTE_MS};

/// How much of an interval falls on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortionKind {
    Full,
    Start,
    Middle,
    End,
}

impl PortionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

impl fmt::Display for PortionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of an interval drawn on one day row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayPortion {
    pub start_ms: EpochMs,
    pub end_ms: EpochMs,
    pub kind: PortionKind,
}

impl DayPortion {
    #[must_use]
    pub const fn duration_ms(&self) -> EpochMs {
        self.end_ms - self.start_ms
    }
}

/// Segment of `[start_ms, end_ms)` that falls on `date`, if any.
///
/// The end date is the date of the interval's last instant, so an interval
/// ending exactly at midnight does not produce an empty `end` segment on the
/// following day.
pub fn split_for_day<Tz: TimeZone>(
    start_ms: EpochMs,
    end_ms: EpochMs,
    date: NaiveDate,
    cal: &Calendar<Tz>,
) -> Option<DayPortion> {
    let start_date = cal.date_of(start_ms);
    let end_date = cal.date_of((end_ms - 1).max(start_ms));
    if date < start_date || date > end_date {
        return None;
    }

    let (day_start, day_end) = cal.day_span(date);
    let (start_ms, end_ms, kind) = match (date == start_date, date == end_date) {
        (true, true) => (start_ms, end_ms, PortionKind::Full),
        (true, false) => (start_ms, day_end, PortionKind::Start),
        (false, true) => (day_start, end_ms, PortionKind::End),
        (false, false) => (day_start, day_end, PortionKind::Middle),
    };

    Some(DayPortion {
        start_ms,
        end_ms,
        kind,
    })
}

/// [`split_for_day`] for a resolved interval.
pub fn portion_of<Tz: TimeZone>(
    interval: &Interval<'_>,
    date: NaiveDate,
    cal: &Calendar<Tz>,
) -> Option<DayPortion> {
    split_for_day(interval.start_ms, interval.end_ms, date, cal)
}

/// One drawable block in a day row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSegment<'a> {
    #[serde(flatten)]
    pub portion: DayPortion,
    pub event: &'a Event,
    /// Drawn length: the real length, raised to the display floor.
    pub display_minutes: f64,
}

/// Every segment of `date`'s row, in time order.
///
/// `min_display_minutes` keeps very short events visible; it never feeds
/// back into any statistic.
pub fn grid_row<'a, Tz: TimeZone>(
    intervals: &[Interval<'a>],
    date: NaiveDate,
    cal: &Calendar<Tz>,
    min_display_minutes: u32,
) -> Vec<GridSegment<'a>> {
    let day_start = cal.start_of_day(date);
    let first = intervals.partition_point(|iv| iv.end_ms <= day_start);
    let floor = f64::from(min_display_minutes);

    intervals[first..]
        .iter()
        .filter_map(|iv| {
            portion_of(iv, date, cal).map(|portion| GridSegment {
                portion,
                event: iv.event,
                display_minutes: (portion.duration_ms() as f64 / MINUTE_MS as f64).max(floor),
            })
        })
        .collect()
}
