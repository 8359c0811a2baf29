//! Journal data model: events as stored, and the validated event log the
//! engine computes over.

mod event;
mod log;

pub use event::{Event, RawEvent};
pub use log::EventLog;
