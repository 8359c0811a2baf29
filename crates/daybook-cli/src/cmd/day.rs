//! `daybook day`: per-day mood, sleep, and notes summary.

use std::io::Write;

use anyhow::ensure;
use chrono::{NaiveDate, TimeZone};
use clap::Args;
use daybook_core::Calendar;
use daybook_core::stats::{DayStats, summarize_days};

use super::{Context, today};
use crate::output::{fmt_opt, pretty_kv, pretty_section, render_mode};

/// Arguments for `daybook day`.
#[derive(Args, Debug)]
pub struct DayArgs {
    /// First day (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Last day of the range, inclusive. Defaults to `--date`.
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

/// Execute `daybook day`.
pub fn run_day<Tz: TimeZone>(
    args: &DayArgs,
    ctx: &Context,
    cal: &Calendar<Tz>,
) -> anyhow::Result<()> {
    let log = ctx.load_log()?;
    let from = args.date.unwrap_or_else(|| today(cal));
    let to = args.to.unwrap_or(from);
    ensure!(from <= to, "--to {to} is before --date {from}");

    let days = summarize_days(&log, from, to, cal);
    render_mode(
        ctx.output,
        &days,
        |days, w| render_days_text(days, w),
        |days, w| render_days_pretty(days, w),
    )
}

fn render_days_text(days: &[DayStats], w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "day  events  happiness  health  wakefulness  sleep_h")?;
    for day in days {
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}",
            day.day,
            day.event_count,
            fmt_opt(day.avg_happiness, 2),
            fmt_opt(day.avg_health, 2),
            fmt_opt(day.avg_wakefulness_awake, 2),
            fmt_opt(day.sleep_hours, 1),
        )?;
    }
    Ok(())
}

fn render_days_pretty(days: &[DayStats], w: &mut dyn Write) -> std::io::Result<()> {
    for (idx, day) in days.iter().enumerate() {
        if idx > 0 {
            writeln!(w)?;
        }
        pretty_section(w, &day.day.to_string())?;
        if !day.has_events() {
            writeln!(w, "Nothing logged.")?;
            continue;
        }
        pretty_kv(w, "Events", day.event_count.to_string())?;
        pretty_kv(w, "Happiness", fmt_opt(day.avg_happiness, 2))?;
        pretty_kv(w, "Health", fmt_opt(day.avg_health, 2))?;
        pretty_kv(w, "Wakefulness", fmt_opt(day.avg_wakefulness_awake, 2))?;
        pretty_kv(w, "Sleep (h)", fmt_opt(day.sleep_hours, 1))?;
        if !day.notes.is_empty() {
            writeln!(w, "Notes:")?;
            for note in &day.notes {
                writeln!(w, "  - {note}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::DayKey;

    #[test]
    fn empty_days_render_as_dashes() {
        let day = DayStats::empty(DayKey(NaiveDate::from_ymd_opt(2024, 1, 2).expect("date")));
        let mut buf = Vec::new();
        render_days_text(&[day], &mut buf).expect("render");
        let out = String::from_utf8(buf).expect("utf8");
        assert!(out.ends_with("2024-01-02  0  -  -  -  -\n"));
    }
}
