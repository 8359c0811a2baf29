#![forbid(unsafe_code)]
//! daybook-core library.
//!
//! Journal events carry only an end timestamp. Everything here derives from
//! inferring when each event started: interval resolution, day-boundary
//! splitting for the grid, weighted day statistics, and calendar bucket
//! series for trend charts.
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::EngineError`] / [`error::ValidationError`] at
//!   the engine boundary; `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Time**: epoch milliseconds everywhere; calendar questions are answered
//!   by an explicit [`calendar::Calendar`], never by a hidden local zone.

pub mod bucket;
pub mod calendar;
pub mod category;
pub mod config;
pub mod error;
pub mod interval;
pub mod model;
pub mod split;
pub mod stats;
pub mod store;

pub use calendar::{Calendar, DayKey};
pub use error::{EngineError, ErrorCode, ValidationError};
pub use interval::Interval;
pub use model::{Event, EventLog, RawEvent};

/// Milliseconds since the Unix epoch.
pub type EpochMs = i64;

/// Milliseconds in one minute.
pub const MINUTE_MS: EpochMs = 60_000;

/// Milliseconds in one hour.
pub const HOUR_MS: EpochMs = 3_600_000;
