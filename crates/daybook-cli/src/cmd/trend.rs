//! `daybook trend`: category hours and mood over calendar buckets.

use std::io::Write;
use std::num::NonZeroU32;

use anyhow::ensure;
use chrono::{NaiveDate, TimeZone};
use clap::{Args, Subcommand};
use daybook_core::bucket::{
    BucketMood, BucketPoint, CategorySelection, Granularity, MoodSample, category_trend,
    mood_samples_for_dates, mood_trend, shift_anchor, window_ending_at,
};
use daybook_core::{Calendar, DayKey, EventLog};
use serde::Serialize;
use tracing::debug;

use super::{Context, stamp, today};
use crate::output::{fmt_opt, pretty_section, render_mode};

#[derive(Subcommand, Debug)]
pub enum TrendCommand {
    /// Hours per category in each bucket.
    Categories(CategoriesTrendArgs),
    /// Mood sampled at a fixed cadence.
    Mood(MoodArgs),
    /// Duration-weighted mood per bucket.
    MoodBuckets(WindowArgs),
}

/// Bucket window selection shared by the bucketed trends.
#[derive(Args, Debug, Default)]
pub struct WindowArgs {
    /// daily, weekly, monthly, or yearly. Defaults to the config value.
    #[arg(long)]
    pub granularity: Option<Granularity>,

    /// Number of buckets. Defaults to the config value.
    #[arg(long)]
    pub count: Option<usize>,

    /// First day of the first bucket. Defaults to the window ending today.
    #[arg(long)]
    pub anchor: Option<NaiveDate>,

    /// Pages to move the window; one page is `count` buckets.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub page: i64,
}

/// Arguments for `daybook trend categories`.
#[derive(Args, Debug)]
pub struct CategoriesTrendArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Category to chart; repeat for several. Defaults to every category.
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Drop unselected time instead of rolling it into `other`.
    #[arg(long)]
    pub no_other: bool,
}

/// Arguments for `daybook trend mood`.
#[derive(Args, Debug)]
pub struct MoodArgs {
    /// First day (YYYY-MM-DD).
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day, inclusive.
    #[arg(long)]
    pub to: NaiveDate,

    /// Minutes between samples. Defaults to the config value.
    #[arg(long)]
    pub sample_minutes: Option<NonZeroU32>,
}

/// Resolved bucket window.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Window {
    pub granularity: Granularity,
    pub count: usize,
    pub anchor: DayKey,
}

#[derive(Debug, Serialize)]
pub struct CategoryTrendReport {
    pub window: Window,
    pub categories: Vec<String>,
    pub points: Vec<BucketPoint>,
}

#[derive(Debug, Serialize)]
pub struct MoodReport {
    pub from: DayKey,
    pub to: DayKey,
    pub sample_minutes: u32,
    pub samples: Vec<MoodSample>,
}

#[derive(Debug, Serialize)]
pub struct MoodBucketReport {
    pub window: Window,
    pub buckets: Vec<BucketMood>,
}

/// Execute a `daybook trend` subcommand.
pub fn run_trend<Tz: TimeZone>(
    command: &TrendCommand,
    ctx: &Context,
    cal: &Calendar<Tz>,
) -> anyhow::Result<()> {
    let log = ctx.load_log()?;
    match command {
        TrendCommand::Categories(args) => run_categories(args, &log, ctx, cal),
        TrendCommand::Mood(args) => run_mood(args, &log, ctx, cal),
        TrendCommand::MoodBuckets(args) => run_mood_buckets(args, &log, ctx, cal),
    }
}

/// Fill window defaults from config and today's date, then apply paging.
fn resolve_window<Tz: TimeZone>(
    args: &WindowArgs,
    ctx: &Context,
    cal: &Calendar<Tz>,
) -> anyhow::Result<Window> {
    let granularity = args.granularity.unwrap_or(ctx.config.trend.granularity);
    let count = args.count.unwrap_or(ctx.config.trend.bucket_count);
    let anchor = match args.anchor {
        Some(anchor) => anchor,
        None => window_ending_at(today(cal), granularity, count)?,
    };
    let anchor = shift_anchor(anchor, granularity, count, args.page)?;
    debug!(%anchor, %granularity, count, page = args.page, "trend window resolved");
    Ok(Window {
        granularity,
        count,
        anchor: DayKey(anchor),
    })
}

fn run_categories<Tz: TimeZone>(
    args: &CategoriesTrendArgs,
    log: &EventLog,
    ctx: &Context,
    cal: &Calendar<Tz>,
) -> anyhow::Result<()> {
    let window = resolve_window(&args.window, ctx, cal)?;
    let include_other = ctx.config.trend.include_other && !args.no_other;
    let selection = if args.categories.is_empty() {
        CategorySelection::all_in(log.events(), include_other)
    } else {
        CategorySelection::new(args.categories.iter().map(String::as_str), include_other)
    };

    let points = category_trend(
        log,
        window.anchor.date(),
        window.granularity,
        window.count,
        &selection,
        cal,
    )?;
    let report = CategoryTrendReport {
        window,
        categories: selection.names().to_vec(),
        points,
    };
    render_mode(ctx.output, &report, render_categories_text, |report, w| {
        pretty_section(
            w,
            &format!("Category hours, {} from {}", report.window.granularity, report.window.anchor),
        )?;
        render_categories_text(report, w)
    })
}

fn render_categories_text(report: &CategoryTrendReport, w: &mut dyn Write) -> std::io::Result<()> {
    let with_other = report.points.iter().any(|p| p.other_hours.is_some());
    write!(w, "{:<12}", "bucket")?;
    for name in &report.categories {
        write!(w, "  {name:>10}")?;
    }
    if with_other {
        write!(w, "  {:>10}", "other")?;
    }
    writeln!(w)?;

    for point in &report.points {
        write!(w, "{:<12}", point.label())?;
        for name in &report.categories {
            let hours = point.hours.get(name).copied().unwrap_or_default();
            write!(w, "  {hours:>10.1}")?;
        }
        if let Some(other) = point.other_hours {
            write!(w, "  {other:>10.1}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn run_mood<Tz: TimeZone>(
    args: &MoodArgs,
    log: &EventLog,
    ctx: &Context,
    cal: &Calendar<Tz>,
) -> anyhow::Result<()> {
    ensure!(args.from <= args.to, "--to {} is before --from {}", args.to, args.from);
    let width = args.sample_minutes.unwrap_or(ctx.config.trend.sample_minutes);
    let samples = mood_samples_for_dates(log, args.from, args.to, width, cal);

    let report = MoodReport {
        from: DayKey(args.from),
        to: DayKey(args.to),
        sample_minutes: width.get(),
        samples,
    };
    let text = |report: &MoodReport, w: &mut dyn Write| render_mood_text(report, w, cal);
    let pretty = |report: &MoodReport, w: &mut dyn Write| {
        pretty_section(w, &format!("Mood every {} min", report.sample_minutes))?;
        render_mood_text(report, w, cal)
    };
    render_mode(ctx.output, &report, text, pretty)
}

fn render_mood_text<Tz: TimeZone>(
    report: &MoodReport,
    w: &mut dyn Write,
    cal: &Calendar<Tz>,
) -> std::io::Result<()> {
    writeln!(w, "time  happiness  wakefulness  health")?;
    for sample in &report.samples {
        writeln!(
            w,
            "{}  {}  {}  {}",
            stamp(cal, sample.at_ms),
            fmt_opt(sample.happiness, 2),
            fmt_opt(sample.wakefulness, 2),
            fmt_opt(sample.health, 2),
        )?;
    }
    Ok(())
}

fn run_mood_buckets<Tz: TimeZone>(
    args: &WindowArgs,
    log: &EventLog,
    ctx: &Context,
    cal: &Calendar<Tz>,
) -> anyhow::Result<()> {
    let window = resolve_window(args, ctx, cal)?;
    let buckets = mood_trend(log, window.anchor.date(), window.granularity, window.count, cal)?;
    let report = MoodBucketReport { window, buckets };
    render_mode(ctx.output, &report, render_mood_buckets_text, |report, w| {
        pretty_section(
            w,
            &format!("Mood, {} from {}", report.window.granularity, report.window.anchor),
        )?;
        render_mood_buckets_text(report, w)
    })
}

fn render_mood_buckets_text(report: &MoodBucketReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "bucket  happiness  wakefulness  health  covered_h")?;
    for mood in &report.buckets {
        writeln!(
            w,
            "{}  {}  {}  {}  {:.1}",
            mood.bucket.label,
            fmt_opt(mood.avg_happiness, 2),
            fmt_opt(mood.avg_wakefulness, 2),
            fmt_opt(mood.avg_health, 2),
            mood.covered_hours,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputMode;
    use daybook_core::config::DaybookConfig;

    fn context() -> Context {
        Context {
            config: DaybookConfig::default(),
            output: OutputMode::Json,
            zone: "UTC".to_string(),
            events: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn explicit_anchor_is_paged() {
        let args = WindowArgs {
            granularity: Some(Granularity::Daily),
            count: Some(7),
            anchor: Some(date(2024, 3, 15)),
            page: -1,
        };
        let window = resolve_window(&args, &context(), &Calendar::utc()).expect("window");
        assert_eq!(window.anchor.date(), date(2024, 3, 8));
        assert_eq!(window.count, 7);
    }

    #[test]
    fn defaults_come_from_config() {
        let cal = Calendar::utc();
        let window = resolve_window(&WindowArgs::default(), &context(), &cal).expect("window");
        assert_eq!(window.granularity, Granularity::Weekly);
        assert_eq!(window.count, 8);
        let last_start = Granularity::Weekly
            .advance(window.anchor.date(), 7)
            .expect("in range");
        let last_end = Granularity::Weekly.advance(last_start, 1).expect("in range");
        let now = today(&cal);
        assert!(last_start <= now && now < last_end);
    }

    #[test]
    fn zero_count_is_rejected() {
        let args = WindowArgs {
            count: Some(0),
            ..WindowArgs::default()
        };
        let err = resolve_window(&args, &context(), &Calendar::utc()).expect_err("zero");
        assert!(err.downcast_ref::<daybook_core::EngineError>().is_some());
    }
}
