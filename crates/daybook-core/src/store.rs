//! Event storage collaborators.
//!
//! The engine never owns persistence. It reads events through the
//! [`EventStore`] trait; [`MemoryStore`] is the in-process implementation
//! used by the CLI and tests, filled from a JSON or JSON Lines file by
//! [`load_events_file`].

use std::fs;
use std::path::Path;

use tracing::{debug, instrument};

use crate::EpochMs;
use crate::error::EngineError;
use crate::model::{Event, EventLog, RawEvent};

/// Read access to stored events, ordered by end time.
pub trait EventStore {
    /// Every stored event.
    fn all_events(&self) -> Result<Vec<Event>, EngineError>;

    /// Events with `start_ms <= end_time < end_ms`.
    fn events_between(&self, start_ms: EpochMs, end_ms: EpochMs)
    -> Result<Vec<Event>, EngineError>;

    /// All events as a validated [`EventLog`].
    fn load_log(&self) -> Result<EventLog, EngineError> {
        Ok(EventLog::new(self.all_events()?)?)
    }
}

/// In-memory store. Events are kept sorted by end time; events with equal
/// end times keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<Event>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(mut events: Vec<Event>) -> Self {
        events.sort_by_key(|e| e.end_time);
        Self { events }
    }

    /// Insert after any stored events with the same end time.
    pub fn insert(&mut self, event: Event) {
        let at = self.events.partition_point(|e| e.end_time <= event.end_time);
        self.events.insert(at, event);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventStore for MemoryStore {
    fn all_events(&self) -> Result<Vec<Event>, EngineError> {
        Ok(self.events.clone())
    }

    fn events_between(
        &self,
        start_ms: EpochMs,
        end_ms: EpochMs,
    ) -> Result<Vec<Event>, EngineError> {
        let lo = self.events.partition_point(|e| e.end_time < start_ms);
        let hi = self.events.partition_point(|e| e.end_time < end_ms).max(lo);
        Ok(self.events[lo..hi].to_vec())
    }
}

/// Read events from a JSON array or a JSON Lines file.
///
/// The format is chosen by the first non-whitespace byte: `[` means an
/// array, anything else one record per line. Blank lines are skipped.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_events_file(path: &Path) -> Result<MemoryStore, EngineError> {
    let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let malformed = |message: String| EngineError::Malformed {
        path: path.display().to_string(),
        message,
    };

    let raw: Vec<RawEvent> = if content.trim_start().starts_with('[') {
        serde_json::from_str(&content).map_err(|e| malformed(e.to_string()))?
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<RawEvent>(line)
                    .map_err(|e| malformed(format!("line {}: {e}", idx + 1)))
            })
            .collect::<Result<_, _>>()?
    };

    debug!(events = raw.len(), "event file parsed");
    Ok(MemoryStore::new(raw.into_iter().map(Event::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn memory_store_sorts_stably() {
        let store = MemoryStore::new(vec![
            Event::new("late", 300, "Work"),
            Event::new("tie-a", 100, "Work"),
            Event::new("tie-b", 100, "Break"),
        ]);
        let events = store.all_events().expect("events");
        assert_eq!(ids(&events), vec!["tie-a", "tie-b", "late"]);
    }

    #[test]
    fn insert_goes_after_equal_end_times() {
        let mut store = MemoryStore::new(vec![Event::new("a", 100, "Work")]);
        store.insert(Event::new("b", 100, "Work"));
        store.insert(Event::new("c", 50, "Work"));
        assert_eq!(ids(&store.all_events().expect("events")), vec!["c", "a", "b"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn events_between_is_half_open() {
        let store = MemoryStore::new(vec![
            Event::new("a", 100, "Work"),
            Event::new("b", 200, "Work"),
            Event::new("c", 300, "Work"),
        ]);
        assert_eq!(ids(&store.events_between(100, 300).expect("range")), vec!["a", "b"]);
        assert!(store.events_between(300, 100).expect("inverted").is_empty());
    }

    #[test]
    fn loads_json_array() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("events.json");
        fs::write(
            &path,
            r#"[
  {"id": "2", "endTime": 2000, "category": "Work", "happiness": 0.5, "wakefulness": 0.5, "health": 0.5},
  {"id": "1", "endTime": 1000, "category": "Sleep", "happiness": 0.5, "wakefulness": 0.1, "health": 0.5, "notes": "  "}
]"#,
        )
        .expect("write events");

        let store = load_events_file(&path).expect("load");
        let events = store.all_events().expect("events");
        assert_eq!(ids(&events), vec!["1", "2"]);
        assert_eq!(events[0].notes, None);
    }

    #[test]
    fn loads_json_lines_and_reports_bad_line() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("events.jsonl");
        fs::write(
            &path,
            concat!(
                r#"{"id": "1", "endTime": 1000, "category": "Sleep", "happiness": 0.5, "wakefulness": 0.1, "health": 0.5}"#,
                "\n\n",
                r#"{"id": "2", "endTime": 2000, "category": "Work", "happiness": 0.5, "wakefulness": 0.5, "health": 0.5}"#,
                "\n",
            ),
        )
        .expect("write events");
        let log = load_events_file(&path).expect("load").load_log().expect("valid");
        assert_eq!(log.len(), 2);

        fs::write(&path, "{\"id\": \"1\"}\nnot json\n").expect("write events");
        let err = load_events_file(&path).expect_err("malformed");
        assert_eq!(err.error_code(), ErrorCode::EventFileMalformed);
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_events_file(&dir.path().join("nope.json")).expect_err("missing");
        assert_eq!(err.error_code(), ErrorCode::EventFileUnreadable);
    }

    #[test]
    fn load_log_validates() {
        let mut bad = Event::new("a", 100, "Work");
        bad.happiness = 1.5;
        let err = MemoryStore::new(vec![bad]).load_log().expect_err("invalid mood");
        assert_eq!(err.error_code(), ErrorCode::MoodOutOfRange);
    }
}
