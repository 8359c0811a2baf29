//! Category name equality and merge-candidate grouping.
//!
//! Categories are stored exactly as typed, so `"Work"`, `" work"` and
//! `"WORK "` can all appear in one journal. Two raw spellings name the same
//! category when their trimmed, case-folded forms match. The canonicalizer
//! groups such spellings and proposes one headline-cased name per group for
//! the user to review.
//!
//! Nothing here mutates events. A confirmed merge is expressed as a
//! [`MergeCommand`] that the caller applies to its own store.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::model::Event;

/// Category key of sleep intervals.
pub const SLEEP_KEY: &str = "sleep";

/// Display name used in previews for blank or whitespace-only categories.
///
/// This is a UI-facing default, not a general rule: blank categories are
/// left untouched in the data.
pub const BLANK_CATEGORY_DEFAULT: &str = "Slack";

/// Trimmed, case-folded grouping key of a raw category.
#[must_use]
pub fn category_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether two raw categories name the same category.
#[must_use]
pub fn same_category(a: &str, b: &str) -> bool {
    category_key(a) == category_key(b)
}

/// Whether a raw category is sleep.
#[must_use]
pub fn is_sleep(raw: &str) -> bool {
    category_key(raw) == SLEEP_KEY
}

/// First character upper-cased, the rest lower-cased.
#[must_use]
pub fn headline_case(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect()
    })
}

/// One raw spelling observed in the journal and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryVariant {
    pub raw: String,
    pub count: usize,
}

/// Raw spellings that normalize to one canonical category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    /// Proposed headline-cased name.
    pub canonical: String,
    /// Distinct raw spellings, ordered by raw text.
    pub variants: Vec<CategoryVariant>,
}

impl CategoryGroup {
    /// Total events across all spellings.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.variants.iter().map(|v| v.count).sum()
    }

    /// Command that would rename every non-canonical spelling.
    #[must_use]
    pub fn merge_command(&self) -> MergeCommand {
        MergeCommand {
            from: self
                .variants
                .iter()
                .filter(|v| v.raw != self.canonical)
                .map(|v| v.raw.clone())
                .collect(),
            to: self.canonical.clone(),
        }
    }
}

/// Rename request for the caller's store: every event whose category is one
/// of `from` should be rewritten to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeCommand {
    pub from: Vec<String>,
    pub to: String,
}

/// Group every category spelling under its canonical name.
///
/// Returns one group per distinct key, including keys with a single
/// spelling, ordered by canonical name.
#[must_use]
pub fn category_summaries(events: &[Event]) -> Vec<CategoryGroup> {
    let mut by_key: BTreeMap<String, BTreeMap<&str, usize>> = BTreeMap::new();
    for event in events {
        let key = grouping_key(&event.category);
        *by_key
            .entry(key)
            .or_default()
            .entry(event.category.as_str())
            .or_default() += 1;
    }

    let mut groups: Vec<CategoryGroup> = by_key
        .into_iter()
        .map(|(key, spellings)| CategoryGroup {
            canonical: headline_case(&key),
            variants: spellings
                .into_iter()
                .map(|(raw, count)| CategoryVariant {
                    raw: raw.to_string(),
                    count,
                })
                .collect(),
        })
        .collect();
    groups.sort_by(|a, b| a.canonical.cmp(&b.canonical));
    groups
}

/// Groups with more than one distinct raw spelling.
#[instrument(skip_all, fields(events = events.len()))]
#[must_use]
pub fn merge_candidates(events: &[Event]) -> Vec<CategoryGroup> {
    let candidates: Vec<_> = category_summaries(events)
        .into_iter()
        .filter(|group| group.variants.len() > 1)
        .collect();
    debug!(groups = candidates.len(), "category merge candidates");
    candidates
}

/// [`category_key`], with blank categories grouped under
/// [`BLANK_CATEGORY_DEFAULT`].
#[must_use]
pub fn grouping_key(raw: &str) -> String {
    let key = category_key(raw);
    if key.is_empty() {
        category_key(BLANK_CATEGORY_DEFAULT)
    } else {
        key
    }
}
