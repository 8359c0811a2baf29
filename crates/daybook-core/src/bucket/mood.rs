//! Mood trend series.
//!
//! Two views of mood over time, both built from the resolved timeline:
//!
//! - [`sample_mood`]: fixed-cadence samples. Each sample takes the mood of
//!   the interval containing the sample instant (the event's mood holds from
//!   the previous event's end until its own end). Instants no interval
//!   covers, such as those before the first event's inferred start, yield
//!   `None` values; they are never interpolated.
//! - [`build_mood_buckets`]: duration-weighted mood averages per calendar
//!   bucket.

use std::num::NonZeroU32;

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use tracing::{debug, instrument};

use super::{Bucket, Granularity, generate_buckets};
use crate::calendar::Calendar;
use crate::error::EngineError;
use crate::interval::{DEGENERATE_DURATION_MS, Interval, resolve_timeline};
use crate::model::EventLog;
use crate::stats::WeightedMean;
use crate::{EpochMs, HOUR_MS, MINUTE_MS};

/// Mood at one sample instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodSample {
    pub at_ms: EpochMs,
    pub happiness: Option<f64>,
    pub wakefulness: Option<f64>,
    pub health: Option<f64>,
}

impl MoodSample {
    const fn gap(at_ms: EpochMs) -> Self {
        Self {
            at_ms,
            happiness: None,
            wakefulness: None,
            health: None,
        }
    }

    /// Whether no interval covered this instant.
    #[must_use]
    pub const fn is_gap(&self) -> bool {
        self.happiness.is_none()
    }
}

/// Weighted mood averages for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketMood {
    pub bucket: Bucket,
    pub avg_happiness: Option<f64>,
    pub avg_wakefulness: Option<f64>,
    pub avg_health: Option<f64>,
    /// Hours of the bucket covered by some interval.
    pub covered_hours: f64,
}

/// Sample the interval timeline every `width_minutes` over `[start_ms, end_ms)`.
///
/// `intervals` must be sorted by end time.
#[must_use]
pub fn sample_mood(
    intervals: &[Interval<'_>],
    start_ms: EpochMs,
    end_ms: EpochMs,
    width_minutes: NonZeroU32,
) -> Vec<MoodSample> {
    let width_ms = EpochMs::from(width_minutes.get()) * MINUTE_MS;
    let mut samples = Vec::new();
    let mut cursor = intervals.partition_point(|iv| iv.end_ms <= start_ms);
    let mut at = start_ms;

    while at < end_ms {
        while cursor < intervals.len() && intervals[cursor].end_ms <= at {
            cursor += 1;
        }
        // Clamped intervals can reach back past their predecessors' starts,
        // but never by more than the clamp length.
        let horizon = at.saturating_add(DEGENERATE_DURATION_MS);
        let covering = intervals
            .get(cursor)
            .into_iter()
            .chain(intervals.iter().skip(cursor + 1).take_while(|iv| iv.end_ms <= horizon))
            .find(|iv| iv.contains(at));
        let sample = match covering {
            Some(iv) => MoodSample {
                at_ms: at,
                happiness: Some(iv.event.happiness),
                wakefulness: Some(iv.event.wakefulness),
                health: Some(iv.event.health),
            },
            None => MoodSample::gap(at),
        };
        samples.push(sample);
        at = at.saturating_add(width_ms);
    }

    samples
}

/// Fixed-cadence mood samples over the local dates `from..=to`.
#[instrument(skip_all, fields(from = %from, to = %to, width = width_minutes.get()))]
pub fn mood_samples_for_dates<Tz: TimeZone>(
    log: &EventLog,
    from: NaiveDate,
    to: NaiveDate,
    width_minutes: NonZeroU32,
    cal: &Calendar<Tz>,
) -> Vec<MoodSample> {
    let intervals = resolve_timeline(log, cal);
    let samples = sample_mood(
        &intervals,
        cal.start_of_day(from),
        cal.end_of_day(to),
        width_minutes,
    );
    debug!(
        samples = samples.len(),
        gaps = samples.iter().filter(|s| s.is_gap()).count(),
        "mood samples built"
    );
    samples
}

/// Duration-weighted mood per bucket.
///
/// `buckets` must be sorted and contiguous; `intervals` sorted by end time.
#[must_use]
pub fn build_mood_buckets(intervals: &[Interval<'_>], buckets: &[Bucket]) -> Vec<BucketMood> {
    let mut acc = vec![[WeightedMean::default(); 3]; buckets.len()];

    for interval in intervals {
        let first = buckets.partition_point(|b| b.end_ms <= interval.start_ms);
        for (offset, bucket) in buckets[first..].iter().enumerate() {
            if bucket.start_ms >= interval.end_ms {
                break;
            }
            let weight = interval.overlap_ms(bucket.start_ms, bucket.end_ms) as f64;
            let [happiness, wakefulness, health] = &mut acc[first + offset];
            happiness.add(interval.event.happiness, weight);
            wakefulness.add(interval.event.wakefulness, weight);
            health.add(interval.event.health, weight);
        }
    }

    buckets
        .iter()
        .zip(acc)
        .map(|(bucket, [happiness, wakefulness, health])| BucketMood {
            bucket: bucket.clone(),
            avg_happiness: happiness.mean(),
            avg_wakefulness: wakefulness.mean(),
            avg_health: health.mean(),
            covered_hours: happiness.weight() / HOUR_MS as f64,
        })
        .collect()
}

/// Weighted mood per bucket for a window of the whole journal.
///
/// # Errors
///
/// Propagates bucket generation errors (zero `count`, dates out of range).
#[instrument(skip_all, fields(anchor = %anchor, granularity = %granularity, count = count))]
pub fn mood_trend<Tz: TimeZone>(
    log: &EventLog,
    anchor: NaiveDate,
    granularity: Granularity,
    count: usize,
    cal: &Calendar<Tz>,
) -> Result<Vec<BucketMood>, EngineError> {
    let buckets = generate_buckets(anchor, granularity, count, cal)?;
    let intervals = resolve_timeline(log, cal);
    Ok(build_mood_buckets(&intervals, &buckets))
}
