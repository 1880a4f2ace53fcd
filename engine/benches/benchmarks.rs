//! Performance benchmarks for refshelf-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use refshelf_engine::{
    correlate, diff, selection, Author, Completion, Library, LibrarySnapshot, LookupRequest,
    Record, SortMode,
};

fn sample_record(i: usize) -> Record {
    Record::new(format!("10.1000/{:05}", i), format!("Paper number {}", i))
        .with_year(1990 + (i % 30) as i32)
        .with_journal(format!("Journal {}", i % 17))
        .with_authors(vec![
            Author::new(format!("Family{}", i % 101), Some("A.")),
            Author::new("Second", Some("B.")),
        ])
}

fn sample_library(size: usize) -> Library {
    Library::from_records((0..size).map(sample_record).collect()).unwrap()
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    group.bench_function("resolve_mixed", |b| {
        b.iter(|| selection::resolve(black_box("4, 9 21-240 3,17 500-999"), black_box(1000)))
    });

    group.bench_function("resolve_all", |b| {
        b.iter(|| selection::resolve(black_box("all"), black_box(10_000)))
    });

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    let old = sample_record(1);
    let new = sample_record(1).with_journal("Renamed").with_year(2024);

    group.bench_function("changed_record", |b| {
        b.iter(|| diff(black_box(Some(&old)), black_box(&new)))
    });

    group.bench_function("new_record", |b| b.iter(|| diff(None, black_box(&new))));

    group.finish();
}

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("correlate", size), size, |b, &size| {
            let requests: Vec<LookupRequest> = (0..size)
                .map(|i| LookupRequest::existing(format!("10.1000/{:05}", i), i + 1))
                .collect();
            // Completions arrive in reverse
            let completions: Vec<Completion<usize, ()>> = (0..size)
                .rev()
                .map(|i| Completion {
                    identifier: format!("10.1000/{:05}", i),
                    outcome: Ok(i),
                })
                .collect();

            b.iter(|| correlate(black_box(requests.clone()), black_box(completions.clone())))
        });
    }

    group.finish();
}

fn bench_library(c: &mut Criterion) {
    let mut group = c.benchmark_group("library");

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("sort_default", size), size, |b, &size| {
            let library = sample_library(size);
            b.iter(|| {
                let mut library = library.clone();
                library.sort(black_box(SortMode::default()))
            })
        });

        group.bench_with_input(BenchmarkId::new("snapshot_json", size), size, |b, &size| {
            let library = sample_library(size);
            b.iter(|| LibrarySnapshot::capture(black_box(&library)).to_json_pretty())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_selection,
    bench_diff,
    bench_correlation,
    bench_library,
);
criterion_main!(benches);
