//! Explicit calendar context for day-boundary math.
//!
//! Every "which day is this?" question goes through a [`Calendar`], which
//! owns the timezone used to turn epoch milliseconds into local calendar
//! dates and back. Callers pick the zone (usually the viewer's local zone)
//! and pass the calendar down; nothing in the engine reads the process
//! timezone on its own.
//!
//! # DST
//!
//! Local midnight does not always exist or may exist twice:
//!
//! - When midnight falls inside a DST gap, the day starts at the first valid
//!   local instant after the gap.
//! - When midnight is ambiguous, the earlier instant wins.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::EpochMs;
use crate::error::EngineError;

/// Probe step used to walk out of a DST gap.
const GAP_PROBE_MINUTES: i64 = 15;

/// Upper bound on gap probes (one full day).
const MAX_GAP_PROBES: usize = 96;

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Timezone-aware calendar used for all day and bucket boundaries.
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    tz: Tz,
}

impl Calendar<Utc> {
    /// Calendar in UTC.
    #[must_use]
    pub const fn utc() -> Self {
        Self { tz: Utc }
    }
}

impl Calendar<chrono::Local> {
    /// Calendar in the process-local zone. Only call sites should use this.
    #[must_use]
    pub const fn local() -> Self {
        Self { tz: chrono::Local }
    }
}

impl Calendar<chrono_tz::Tz> {
    /// Calendar for an IANA zone name such as `"America/New_York"`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTimezone`] if the name is not in the
    /// bundled IANA database.
    pub fn named(name: &str) -> Result<Self, EngineError> {
        let tz = name
            .trim()
            .parse::<chrono_tz::Tz>()
            .map_err(|_| EngineError::UnknownTimezone(name.to_string()))?;
        Ok(Self { tz })
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    /// Wrap an arbitrary chrono timezone.
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The wrapped timezone.
    pub const fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Local date-time for an epoch millisecond.
    ///
    /// Out-of-range values map to the Unix epoch; [`crate::EventLog`]
    /// rejects them before they get here.
    pub fn instant(&self, ms: EpochMs) -> DateTime<Tz> {
        DateTime::<Utc>::from_timestamp_millis(ms)
            .unwrap_or_default()
            .with_timezone(&self.tz)
    }

    /// Local calendar date containing `ms`.
    pub fn date_of(&self, ms: EpochMs) -> NaiveDate {
        self.instant(ms).date_naive()
    }

    /// `YYYY-MM-DD` key of the local date containing `ms`.
    pub fn day_key(&self, ms: EpochMs) -> DayKey {
        DayKey(self.date_of(ms))
    }

    /// First instant of `date` in this calendar.
    pub fn start_of_day(&self, date: NaiveDate) -> EpochMs {
        self.resolve_local(date.and_time(NaiveTime::MIN))
    }

    /// Exclusive end of `date`: the start of the following day.
    pub fn end_of_day(&self, date: NaiveDate) -> EpochMs {
        date.succ_opt()
            .map_or(EpochMs::MAX, |next| self.start_of_day(next))
    }

    /// Half-open `[start, end)` span of `date`.
    pub fn day_span(&self, date: NaiveDate) -> (EpochMs, EpochMs) {
        (self.start_of_day(date), self.end_of_day(date))
    }

    /// Epoch milliseconds of a local wall-clock time.
    fn resolve_local(&self, naive: NaiveDateTime) -> EpochMs {
        let mut probe = naive;
        for _ in 0..=MAX_GAP_PROBES {
            match self.tz.from_local_datetime(&probe) {
                LocalResult::Single(dt) => return dt.timestamp_millis(),
                LocalResult::Ambiguous(earliest, _) => return earliest.timestamp_millis(),
                LocalResult::None => probe += Duration::minutes(GAP_PROBE_MINUTES),
            }
        }
        self.tz.from_utc_datetime(&naive).timestamp_millis()
    }
}

/// Inclusive iterator over the dates `from..=to`.
pub fn dates_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |date| *date <= to)
}

// ---------------------------------------------------------------------------
// DayKey
// ---------------------------------------------------------------------------

/// Canonical `YYYY-MM-DD` identity of a local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(pub NaiveDate);

impl DayKey {
    /// The underlying date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Self)
    }
}

impl Serialize for DayKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
