//! `daybook grid`: one day's row of the 24-hour grid.

use std::io::Write;

use chrono::{NaiveDate, TimeZone};
use clap::Args;
use daybook_core::interval::resolve_timeline;
use daybook_core::split::{PortionKind, grid_row};
use daybook_core::{Calendar, DayKey, MINUTE_MS};
use serde::Serialize;

use super::{Context, clock, today};
use crate::output::{pretty_rule, pretty_section, render_mode};

/// Arguments for `daybook grid`.
#[derive(Args, Debug)]
pub struct GridArgs {
    /// Day to draw (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// One drawn block of the row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub start: String,
    pub end: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub kind: PortionKind,
    pub event_id: String,
    pub category: String,
    pub minutes: f64,
    pub display_minutes: f64,
}

/// Report payload for `daybook grid`.
#[derive(Debug, Serialize)]
pub struct GridReport {
    pub day: DayKey,
    pub timezone: String,
    pub cells: Vec<GridCell>,
}

/// Execute `daybook grid`.
pub fn run_grid<Tz: TimeZone>(
    args: &GridArgs,
    ctx: &Context,
    cal: &Calendar<Tz>,
) -> anyhow::Result<()> {
    let log = ctx.load_log()?;
    let date = args.date.unwrap_or_else(|| today(cal));
    let intervals = resolve_timeline(&log, cal);

    let cells = grid_row(&intervals, date, cal, ctx.config.grid.min_display_minutes)
        .into_iter()
        .map(|segment| GridCell {
            start: clock(cal, segment.portion.start_ms),
            end: clock(cal, segment.portion.end_ms),
            start_ms: segment.portion.start_ms,
            end_ms: segment.portion.end_ms,
            kind: segment.portion.kind,
            event_id: segment.event.id.clone(),
            category: ctx.category_label(&segment.event.category).to_string(),
            minutes: segment.portion.duration_ms() as f64 / MINUTE_MS as f64,
            display_minutes: segment.display_minutes,
        })
        .collect();

    let report = GridReport {
        day: DayKey(date),
        timezone: ctx.zone.clone(),
        cells,
    };
    render_mode(ctx.output, &report, render_grid_text, render_grid_pretty)
}

fn render_grid_text(report: &GridReport, w: &mut dyn Write) -> std::io::Result<()> {
    for cell in &report.cells {
        writeln!(
            w,
            "{}  {}  {:<6}  {:>7.1}  {}",
            cell.start,
            cell.end,
            cell.kind.as_str(),
            cell.minutes,
            cell.category
        )?;
    }
    Ok(())
}

fn render_grid_pretty(report: &GridReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Grid for {} ({})", report.day, report.timezone))?;
    if report.cells.is_empty() {
        writeln!(w, "No events on this day.")?;
        return Ok(());
    }
    for cell in &report.cells {
        let marker = match cell.kind {
            PortionKind::Full => "",
            PortionKind::Start => " →",
            PortionKind::Middle => " ↔",
            PortionKind::End => " ←",
        };
        writeln!(
            w,
            "{}–{}  {:<24} {}{marker}",
            cell.start,
            cell.end,
            cell.category,
            bar(cell.display_minutes)
        )?;
    }
    pretty_rule(w)
}

/// One block per quarter hour, at least one.
fn bar(display_minutes: f64) -> String {
    let blocks = (display_minutes / 15.0).round().max(1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let blocks = blocks as usize;
    "█".repeat(blocks)
}
