use std::fmt;

use chrono::NaiveDate;

use crate::EpochMs;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    UnknownTimezone,
    EventFileUnreadable,
    EventFileMalformed,
    UnsortedEvents,
    MoodOutOfRange,
    TimestampOutOfRange,
    DuplicateEventId,
    InvalidBucketCount,
    DateOutOfRange,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::UnknownTimezone => "E1002",
            Self::EventFileUnreadable => "E2001",
            Self::EventFileMalformed => "E2002",
            Self::UnsortedEvents => "E3001",
            Self::MoodOutOfRange => "E3002",
            Self::TimestampOutOfRange => "E3003",
            Self::DuplicateEventId => "E3004",
            Self::InvalidBucketCount => "E4001",
            Self::DateOutOfRange => "E4002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::UnknownTimezone => "Unknown timezone",
            Self::EventFileUnreadable => "Event file could not be read",
            Self::EventFileMalformed => "Event file is not valid event JSON",
            Self::UnsortedEvents => "Events are not sorted by end time",
            Self::MoodOutOfRange => "Mood value outside [0, 1]",
            Self::TimestampOutOfRange => "Event timestamp outside the supported range",
            Self::DuplicateEventId => "Duplicate event id",
            Self::InvalidBucketCount => "Bucket count must be at least one",
            Self::DateOutOfRange => "Calendar date arithmetic overflowed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in daybook/config.toml and retry."),
            Self::UnknownTimezone => Some("Use an IANA zone name such as `Europe/Berlin`."),
            Self::EventFileUnreadable => Some("Check the path and read permissions."),
            Self::EventFileMalformed => {
                Some("Provide a JSON array or JSON Lines file of event records.")
            }
            Self::UnsortedEvents => {
                Some("Sort events by endTime (stable, keeping insertion order for ties).")
            }
            Self::MoodOutOfRange => Some("Clamp happiness/wakefulness/health to [0, 1] on write."),
            Self::TimestampOutOfRange => Some("Store endTime as epoch milliseconds."),
            Self::DuplicateEventId => Some("Give every event a unique id."),
            Self::InvalidBucketCount => Some("Request one or more buckets."),
            Self::DateOutOfRange => Some("Choose an anchor date closer to the present."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Contract violations detected when an event sequence enters the engine.
///
/// The engine never repairs these; the caller has to fix its input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// `events[index]` ends before `events[index - 1]`.
    #[error(
        "event '{id}' at position {index} ends at {end_ms}, before its predecessor at {previous_end_ms}"
    )]
    Unsorted {
        index: usize,
        id: String,
        end_ms: EpochMs,
        previous_end_ms: EpochMs,
    },

    /// A mood scalar is NaN, infinite, or outside `[0, 1]`.
    #[error("event '{id}' has {field} = {value}, expected a value in [0, 1]")]
    MoodOutOfRange {
        id: String,
        field: &'static str,
        value: f64,
    },

    /// The end time cannot be represented as a calendar instant.
    #[error("event '{id}' has end time {end_ms} ms, which is outside the calendar range")]
    TimestampOutOfRange { id: String, end_ms: EpochMs },

    /// Two events share one id.
    #[error("event id '{id}' appears more than once")]
    DuplicateId { id: String },
}

impl ValidationError {
    /// Error code for this failure.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Unsorted { .. } => ErrorCode::UnsortedEvents,
            Self::MoodOutOfRange { .. } => ErrorCode::MoodOutOfRange,
            Self::TimestampOutOfRange { .. } => ErrorCode::TimestampOutOfRange,
            Self::DuplicateId { .. } => ErrorCode::DuplicateEventId,
        }
    }
}

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A series was requested with zero buckets.
    #[error("bucket count must be at least 1")]
    InvalidBucketCount,

    /// Moving a calendar date left chrono's representable range.
    #[error("date arithmetic from {anchor} overflowed the calendar range")]
    DateOutOfRange { anchor: NaiveDate },

    /// The configured zone name is not in the IANA database.
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    /// The event file could not be read.
    #[error("failed to read events from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The event file is not a JSON array / JSON Lines of event records.
    #[error("failed to parse events from {path}: {message}")]
    Malformed { path: String, message: String },
}

impl EngineError {
    /// Error code for this failure.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(err) => err.error_code(),
            Self::InvalidBucketCount => ErrorCode::InvalidBucketCount,
            Self::DateOutOfRange { .. } => ErrorCode::DateOutOfRange,
            Self::UnknownTimezone(_) => ErrorCode::UnknownTimezone,
            Self::Io { .. } => ErrorCode::EventFileUnreadable,
            Self::Malformed { .. } => ErrorCode::EventFileMalformed,
        }
    }

    /// Remediation text for terminal and JSON error output.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or_else(|| code.message()).to_string()
    }
}
