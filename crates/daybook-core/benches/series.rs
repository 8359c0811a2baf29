use daybook_core::bucket::{CategorySelection, Granularity, build_category_series, generate_buckets};
use daybook_core::interval::resolve_timeline;
use daybook_core::{Calendar, EpochMs, Event, EventLog, MINUTE_MS};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const CATEGORIES: [&str; 6] = ["Sleep", "Work", "work ", "Exercise", "Reading", ""];

struct Tier {
    name: &'static str,
    days: i64,
    events_per_day: i64,
}

const TIERS: [Tier; 3] = [
    Tier { name: "month", days: 31, events_per_day: 12 },
    Tier { name: "year", days: 366, events_per_day: 16 },
    Tier { name: "decade", days: 3653, events_per_day: 16 },
];

/// Deterministic history: evenly spread events with jittered end times.
fn synthetic_log(tier: &Tier, seed: u64) -> EventLog {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        state >> 33
    };

    let start: EpochMs = 1_577_836_800_000; // 2020-01-01T00:00:00Z
    let step = 24 * 60 / tier.events_per_day;
    let events = (0..tier.days * tier.events_per_day)
        .map(|i| {
            let jitter = (next() % 10) as EpochMs;
            let category = CATEGORIES[(next() % CATEGORIES.len() as u64) as usize];
            let mood = (next() % 101) as f64 / 100.0;
            Event::new(format!("ev-{i}"), start + (i * step + jitter) * MINUTE_MS, category)
                .with_mood(mood, mood, mood)
        })
        .collect();
    EventLog::new(events).expect("synthetic events are valid")
}

fn bench_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("series.category");
    let cal = Calendar::utc();

    for tier in &TIERS {
        let log = synthetic_log(tier, 0x5EED_u64 + tier.days as u64);
        let intervals = resolve_timeline(&log, &cal);
        let anchor = cal.date_of(log.events()[0].end_time);
        let selection = CategorySelection::new(["Sleep", "Work"], true);
        group.throughput(Throughput::Elements(intervals.len() as u64));

        for (granularity, count) in [(Granularity::Daily, 366), (Granularity::Weekly, 52), (Granularity::Monthly, 120)] {
            let buckets = generate_buckets(anchor, granularity, count, &cal).expect("buckets");
            group.bench_with_input(
                BenchmarkId::new(granularity.as_str(), tier.name),
                &buckets,
                |b, buckets| b.iter(|| black_box(build_category_series(&intervals, buckets, &selection))),
            );
        }

        group.bench_with_input(BenchmarkId::new("resolve", tier.name), &log, |b, log| {
            b.iter(|| black_box(resolve_timeline(log, &cal).len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_series);
criterion_main!(benches);
