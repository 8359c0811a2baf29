//! `daybook validate`: check an event file against the engine's input contract.

use std::io::Write;

use chrono::TimeZone;
use clap::Args;
use daybook_core::category::category_summaries;
use daybook_core::{Calendar, DayKey};
use serde::Serialize;
use tracing::info;

use super::{Context, stamp};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `daybook validate`.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {}

/// Report payload for `daybook validate`.
#[derive(Debug, Serialize)]
pub struct ValidateReport {
    pub ok: bool,
    pub events: usize,
    pub categories: usize,
    pub first_day: Option<DayKey>,
    pub last_day: Option<DayKey>,
    pub first_event: Option<String>,
    pub last_event: Option<String>,
    pub timezone: String,
}

/// Execute `daybook validate`.
pub fn run_validate<Tz: TimeZone>(
    _args: &ValidateArgs,
    ctx: &Context,
    cal: &Calendar<Tz>,
) -> anyhow::Result<()> {
    let log = ctx.load_log()?;
    let first = log.events().first();
    let last = log.events().last();

    let report = ValidateReport {
        ok: true,
        events: log.len(),
        categories: category_summaries(log.events()).len(),
        first_day: first.map(|e| cal.day_key(e.end_time)),
        last_day: last.map(|e| cal.day_key(e.end_time)),
        first_event: first.map(|e| stamp(cal, e.end_time)),
        last_event: last.map(|e| stamp(cal, e.end_time)),
        timezone: ctx.zone.clone(),
    };
    info!(events = report.events, "event file validated");

    render_mode(ctx.output, &report, render_validate_text, render_validate_pretty)
}

fn render_validate_text(report: &ValidateReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "ok events={} categories={} first={} last={}",
        report.events,
        report.categories,
        report.first_event.as_deref().unwrap_or("-"),
        report.last_event.as_deref().unwrap_or("-"),
    )
}

fn render_validate_pretty(report: &ValidateReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Event file is valid")?;
    pretty_kv(w, "Events", report.events.to_string())?;
    pretty_kv(w, "Categories", report.categories.to_string())?;
    pretty_kv(w, "First event", report.first_event.as_deref().unwrap_or("-"))?;
    pretty_kv(w, "Last event", report.last_event.as_deref().unwrap_or("-"))?;
    pretty_kv(w, "Timezone", &report.timezone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_line_for_empty_file() {
        let report = ValidateReport {
            ok: true,
            events: 0,
            categories: 0,
            first_day: None,
            last_day: None,
            first_event: None,
            last_event: None,
            timezone: "UTC".to_string(),
        };
        let mut buf = Vec::new();
        render_validate_text(&report, &mut buf).expect("render");
        assert_eq!(
            String::from_utf8(buf).expect("utf8"),
            "ok events=0 categories=0 first=- last=-\n"
        );
    }
}
