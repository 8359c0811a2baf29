pub mod categories;
pub mod completions;
pub mod day;
pub mod grid;
pub mod trend;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use daybook_core::config::DaybookConfig;
use daybook_core::store::{EventStore, load_events_file};
use daybook_core::{Calendar, EpochMs, EventLog};

use crate::output::OutputMode;

/// Settings shared by every data command.
#[derive(Debug)]
pub struct Context {
    pub config: DaybookConfig,
    pub output: OutputMode,
    /// Zone name for reports; `local` when none was configured.
    pub zone: String,
    pub events: Option<PathBuf>,
}

impl Context {
    /// Load and validate the event file given with `--events`.
    pub fn load_log(&self) -> Result<EventLog> {
        let path = self
            .events
            .as_deref()
            .context("no event file given; pass --events <FILE>")?;
        let store = load_events_file(path)?;
        Ok(store.load_log()?)
    }

    /// Display label for a raw category.
    pub fn category_label<'a>(&'a self, raw: &'a str) -> &'a str {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            &self.config.categories.blank_category
        } else {
            trimmed
        }
    }
}

/// Today in the calendar's zone.
pub fn today<Tz: TimeZone>(cal: &Calendar<Tz>) -> NaiveDate {
    cal.date_of(Utc::now().timestamp_millis())
}

/// Local wall-clock `HH:MM` of an instant.
pub fn clock<Tz: TimeZone>(cal: &Calendar<Tz>, ms: EpochMs) -> String {
    cal.instant(ms).naive_local().format("%H:%M").to_string()
}

/// Local `YYYY-MM-DD HH:MM` of an instant.
pub fn stamp<Tz: TimeZone>(cal: &Calendar<Tz>, ms: EpochMs) -> String {
    cal.instant(ms).naive_local().format("%Y-%m-%d %H:%M").to_string()
}
