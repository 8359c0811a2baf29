//! Calendar buckets for trend charts.
//!
//! A bucket is a half-open `[start, end)` span of whole local days sized by
//! a [`Granularity`]. Bucket `i` of a window anchored at date `A` spans
//! `A + i` to `A + i + 1` granularity steps:
//!
//! - **daily**: one calendar day.
//! - **weekly**: seven consecutive days starting on the anchor's weekday.
//! - **monthly**: anchor day-of-month to the same day one month later.
//! - **yearly**: anchor date to the same date one year later.
//!
//! Month and year steps are always computed from the anchor, never from the
//! previous bucket, and land on the last day of shorter months instead of
//! spilling into the next one: a window anchored on January 31st yields
//! buckets starting Jan 31, Feb 29 (or 28), Mar 31, Apr 30, ...
//!
//! Series built on top of the buckets live in [`series`] (category hours)
//! and [`mood`] (mood samples and per-bucket mood averages).

pub mod mood;
pub mod series;

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::EpochMs;
use crate::calendar::Calendar;
use crate::error::EngineError;

/// Upper bound on the up-front reservation for a bucket window.
const MAX_PREALLOCATED_BUCKETS: usize = 4096;

pub use mood::{
    BucketMood, MoodSample, build_mood_buckets, mood_samples_for_dates, mood_trend, sample_mood,
};
pub use series::{
    BucketPoint, CategorySelection, SeriesProgress, build_category_series,
    build_category_series_with_progress, category_trend,
};

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

/// Calendar size of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Error returned when parsing an unknown granularity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGranularity {
    pub raw: String,
}

impl fmt::Display for UnknownGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown granularity '{}': expected one of daily, weekly, monthly, yearly",
            self.raw
        )
    }
}

impl std::error::Error for UnknownGranularity {}

impl Granularity {
    pub const ALL: [Self; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Move `date` by `steps` buckets (negative steps go back in time).
    ///
    /// Returns `None` when the result leaves chrono's date range.
    #[must_use]
    pub fn advance(self, date: NaiveDate, steps: i64) -> Option<NaiveDate> {
        match self {
            Self::Daily => date.checked_add_signed(Duration::try_days(steps)?),
            Self::Weekly => date.checked_add_signed(Duration::try_days(steps.checked_mul(7)?)?),
            Self::Monthly => add_months(date, steps),
            Self::Yearly => add_months(date, steps.checked_mul(12)?),
        }
    }

    /// Human-readable label for a bucket starting on `start`.
    #[must_use]
    pub fn label(self, start: NaiveDate) -> String {
        let pattern = match self {
            Self::Daily => "%Y-%m-%d",
            Self::Weekly => "%d %b",
            Self::Monthly => "%b %Y",
            Self::Yearly => "%Y",
        };
        start.format(pattern).to_string()
    }
}

fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" => Ok(Self::Yearly),
            _ => Err(UnknownGranularity { raw: s.to_string() }),
        }
    }
}

// ---------------------------------------------------------------------------
// Bucket
// ---------------------------------------------------------------------------

/// One calendar span of a trend window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub index: usize,
    pub start_date: NaiveDate,
    /// First date after the bucket.
    pub end_date: NaiveDate,
    pub start_ms: EpochMs,
    /// Exclusive; the bucket's last instant is `end_ms - 1`.
    pub end_ms: EpochMs,
    pub label: String,
}

impl Bucket {
    #[must_use]
    pub const fn duration_ms(&self) -> EpochMs {
        self.end_ms - self.start_ms
    }

    #[must_use]
    pub const fn contains(&self, ms: EpochMs) -> bool {
        self.start_ms <= ms && ms < self.end_ms
    }

    /// Inclusive last millisecond of the bucket.
    #[must_use]
    pub const fn last_ms(&self) -> EpochMs {
        self.end_ms - 1
    }
}

/// `count` consecutive buckets starting at `anchor`, in ascending order.
///
/// # Errors
///
/// [`EngineError::InvalidBucketCount`] when `count` is zero, and
/// [`EngineError::DateOutOfRange`] when a bucket boundary leaves the
/// calendar range.
pub fn generate_buckets<Tz: TimeZone>(
    anchor: NaiveDate,
    granularity: Granularity,
    count: usize,
    cal: &Calendar<Tz>,
) -> Result<Vec<Bucket>, EngineError> {
    if count == 0 {
        return Err(EngineError::InvalidBucketCount);
    }

    let boundary = |step: usize| -> Result<NaiveDate, EngineError> {
        i64::try_from(step)
            .ok()
            .and_then(|step| granularity.advance(anchor, step))
            .ok_or(EngineError::DateOutOfRange { anchor })
    };

    // The far edge must exist before anything is allocated.
    boundary(count)?;

    let mut buckets = Vec::with_capacity(count.min(MAX_PREALLOCATED_BUCKETS));
    let mut start_date = boundary(0)?;
    for index in 0..count {
        let end_date = boundary(index + 1)?;
        buckets.push(Bucket {
            index,
            start_date,
            end_date,
            start_ms: cal.start_of_day(start_date),
            end_ms: cal.start_of_day(end_date),
            label: granularity.label(start_date),
        });
        start_date = end_date;
    }
    Ok(buckets)
}

/// Anchor of the window `pages` pages away, one page being `count` buckets.
///
/// # Errors
///
/// [`EngineError::DateOutOfRange`] when the shifted anchor is not a valid
/// date.
pub fn shift_anchor(
    anchor: NaiveDate,
    granularity: Granularity,
    count: usize,
    pages: i64,
) -> Result<NaiveDate, EngineError> {
    i64::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(pages))
        .and_then(|steps| granularity.advance(anchor, steps))
        .ok_or(EngineError::DateOutOfRange { anchor })
}

/// Anchor of the `count`-bucket window whose last bucket contains `today`.
///
/// # Errors
///
/// [`EngineError::InvalidBucketCount`] when `count` is zero, and
/// [`EngineError::DateOutOfRange`] when the anchor is not a valid date.
pub fn window_ending_at(
    today: NaiveDate,
    granularity: Granularity,
    count: usize,
) -> Result<NaiveDate, EngineError> {
    if count == 0 {
        return Err(EngineError::InvalidBucketCount);
    }
    i64::try_from(count - 1)
        .ok()
        .and_then(|back| granularity.advance(today, -back))
        .ok_or(EngineError::DateOutOfRange { anchor: today })
}
