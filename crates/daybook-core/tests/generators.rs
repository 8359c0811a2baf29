use daybook_core::{EpochMs, Event, EventLog, HOUR_MS, MINUTE_MS};
use proptest::prelude::*;

/// 2023-06-01T00:00:00Z, far enough from the epoch that every zone is valid.
pub const BASE_MS: EpochMs = 1_685_577_600_000;

pub fn arb_category() -> impl Strategy<Value = String> + Clone {
    prop_oneof![
        Just("Sleep".to_string()),
        Just(" sleep ".to_string()),
        Just("Work".to_string()),
        Just("work".to_string()),
        Just("WORK ".to_string()),
        Just("Exercise".to_string()),
        Just(String::new()),
        "[a-zA-Z ]{1,12}",
    ]
}

pub fn arb_mood() -> impl Strategy<Value = f64> + Clone {
    prop_oneof![Just(0.0), Just(1.0), 0.0f64..=1.0]
}

/// Gap between consecutive end times: ties, minutes, and multi-day jumps.
pub fn arb_gap() -> impl Strategy<Value = EpochMs> + Clone {
    prop_oneof![
        1 => Just(0),
        6 => (1i64..=12 * 60).prop_map(|m| m * MINUTE_MS),
        1 => (1i64..=72).prop_map(|h| h * HOUR_MS),
    ]
}

pub fn arb_event_fields() -> impl Strategy<Value = (EpochMs, String, f64, f64, f64)> + Clone {
    (arb_gap(), arb_category(), arb_mood(), arb_mood(), arb_mood())
}

/// A valid, end-time-sorted event log.
pub fn arb_event_log(max_len: usize) -> impl Strategy<Value = EventLog> {
    (
        0i64..24 * 60,
        prop::collection::vec(arb_event_fields(), 0..max_len),
    )
        .prop_map(|(offset_minutes, fields)| {
            let mut end = BASE_MS + offset_minutes * MINUTE_MS;
            let events = fields
                .into_iter()
                .enumerate()
                .map(|(idx, (gap, category, happiness, wakefulness, health))| {
                    end += gap;
                    Event::new(format!("ev-{idx}"), end, category).with_mood(
                        happiness,
                        wakefulness,
                        health,
                    )
                })
                .collect();
            EventLog::new(events).expect("generated events are valid")
        })
}

pub fn arb_zone() -> impl Strategy<Value = chrono_tz::Tz> + Clone {
    prop_oneof![
        Just(chrono_tz::UTC),
        Just(chrono_tz::Europe::Berlin),
        Just(chrono_tz::America::New_York),
        Just(chrono_tz::America::Santiago),
        Just(chrono_tz::Asia::Kolkata),
        Just(chrono_tz::Australia::Lord_Howe),
    ]
}
