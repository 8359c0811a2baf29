use serde::{Deserialize, Serialize};

use crate::EpochMs;
use crate::category;

/// One logged activity, identified by when it ended.
///
/// `category` is kept exactly as stored (casing and surrounding whitespace
/// included) so the canonicalizer can see every raw spelling. `notes` is
/// normalized on ingestion: trimmed, and `None` when blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawEvent")]
pub struct Event {
    pub id: String,
    pub end_time: EpochMs,
    pub category: String,
    pub happiness: f64,
    pub wakefulness: f64,
    pub health: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Event record as it arrives from the store, before normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: String,
    #[serde(alias = "end_time")]
    pub end_time: EpochMs,
    #[serde(default)]
    pub category: String,
    pub happiness: f64,
    pub wakefulness: f64,
    pub health: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        Self {
            id: raw.id,
            end_time: raw.end_time,
            category: raw.category,
            happiness: raw.happiness,
            wakefulness: raw.wakefulness,
            health: raw.health,
            notes: normalize_notes(raw.notes),
        }
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

impl Event {
    /// Event with neutral (0.5) mood values and no notes.
    pub fn new(id: impl Into<String>, end_time: EpochMs, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            end_time,
            category: category.into(),
            happiness: 0.5,
            wakefulness: 0.5,
            health: 0.5,
            notes: None,
        }
    }

    /// Replace the three mood scalars.
    #[must_use]
    pub fn with_mood(mut self, happiness: f64, wakefulness: f64, health: f64) -> Self {
        self.happiness = happiness;
        self.wakefulness = wakefulness;
        self.health = health;
        self
    }

    /// Attach notes, normalized the same way as on ingestion.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = normalize_notes(Some(notes.into()));
        self
    }

    /// Trimmed, case-folded category used for every equality check.
    #[must_use]
    pub fn category_key(&self) -> String {
        category::category_key(&self.category)
    }

    /// Whether this event is sleep (case-insensitive, whitespace-trimmed).
    #[must_use]
    pub fn is_sleep(&self) -> bool {
        category::is_sleep(&self.category)
    }

    /// The three mood values as `(field name, value)` pairs.
    #[must_use]
    pub const fn mood_fields(&self) -> [(&'static str, f64); 3] {
        [
            ("happiness", self.happiness),
            ("wakefulness", self.wakefulness),
            ("health", self.health),
        ]
    }
}
