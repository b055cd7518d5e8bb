//! This bench test measures the aggregate queries over a large visitor log.

#![allow(missing_docs)]

use chrono::{Duration, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use exhibition_log::{ExhibitionRecord, domain::query};

/// Generates a year of visits, several per day.
fn preseed_records() -> Vec<ExhibitionRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();

    (0..10_000u32)
        .map(|i| {
            let date = start + Duration::days(i64::from(i % 365));
            let comment = if i % 7 == 0 { "a great show" } else { "fine" };
            ExhibitionRecord::new("Impressions", "Monet", date, i % 50, comment).unwrap()
        })
        .collect()
}

fn queries(c: &mut Criterion) {
    let records = preseed_records();

    c.bench_function("total visitors", |b| {
        b.iter(|| query::total_visitors(&records));
    });

    c.bench_function("least visited day", |b| {
        b.iter(|| query::least_visited_day(&records).unwrap());
    });

    c.bench_function("comments containing", |b| {
        b.iter(|| query::comments_containing(&records, "great"));
    });
}

criterion_group!(benches, queries);
criterion_main!(benches);
