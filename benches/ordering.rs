use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linked_notes::ordering::order_entries;
use linked_notes::settings::DEFAULT_DATE_FORMAT;
use linked_notes::vault::{Entry, EntryKind};
use linked_notes::DateFormat;
use std::path::PathBuf;

/// Folder listing with dated notes in scrambled order plus some foreign files
fn generate_entries(format: &DateFormat, count: usize) -> Vec<Entry> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    (0..count)
        .map(|i| {
            let name = if i % 10 == 0 {
                format!("attachment-{}.png", i)
            } else {
                let offset = (i * 7919) % count;
                let instant = start + Duration::minutes(offset as i64 * 37);
                format!("{}.md", format.format(&instant))
            };
            Entry {
                path: PathBuf::from("/notes").join(&name),
                name,
                kind: EntryKind::File,
            }
        })
        .collect()
}

fn bench_order_entries(c: &mut Criterion) {
    let format = DateFormat::new(DEFAULT_DATE_FORMAT).expect("default format compiles");
    let mut group = c.benchmark_group("order_entries");

    for size in [10, 100, 1_000, 5_000] {
        let entries = generate_entries(&format, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &entries, |b, entries| {
            b.iter(|| order_entries(black_box(entries.clone()), &format))
        });
    }
    group.finish();
}

fn bench_parse_name(c: &mut Criterion) {
    let format = DateFormat::new(DEFAULT_DATE_FORMAT).expect("default format compiles");
    c.bench_function("parse_note_name", |b| {
        b.iter(|| format.parse(black_box("2024-06-01 at 08ː00.md")))
    });
}

criterion_group!(benches, bench_order_entries, bench_parse_name);
criterion_main!(benches);
