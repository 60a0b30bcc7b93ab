//! Benchmarks for the differencing engine's hot paths.
//!
//! `choose_checkpoints` is pure Rust and benched directly; the full-diff
//! benchmarks drive [`Differ::diff`] end to end against the in-memory
//! reference driver, since query cost is otherwise entirely up to the
//! caller's own backend.
//!
//! Run with: `cargo bench --bench diff_operators`

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use futures::StreamExt;
use table_diff::testutil::InMemoryDatabase;
use table_diff::value::Value;
use table_diff::{DiffConfig, Differ, TablePath, TableSegment};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap()
}

fn build_table(n: i64, differing_key: Option<i64>) -> Arc<InMemoryDatabase> {
    let db = Arc::new(InMemoryDatabase::new(TablePath::new(["t"])));
    for id in 0..n {
        let v = if Some(id) == differing_key { "different" } else { "same" };
        db.insert_row(&[("id", Value::Int(id)), ("v", Value::Text(v.to_string()))]);
    }
    db
}

fn segment(db: Arc<InMemoryDatabase>) -> TableSegment {
    TableSegment::new(db, TablePath::new(["t"]), "id", None, vec!["v".to_string()], None, None, None, None)
        .unwrap()
}

// ── choose_checkpoints ──────────────────────────────────────────────────────

fn bench_choose_checkpoints(c: &mut Criterion) {
    let mut group = c.benchmark_group("choose_checkpoints");

    for factor in [4usize, 16, 64] {
        let db = Arc::new(InMemoryDatabase::new(TablePath::new(["t"])));
        let seg = TableSegment::new(
            db,
            TablePath::new(["t"]),
            "id",
            None,
            vec![],
            Some(0),
            Some(1_000_000),
            None,
            None,
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(factor), &factor, |b, &factor| {
            b.iter(|| black_box(seg.choose_checkpoints(factor - 1)));
        });
    }
    group.finish();
}

// ── Full diff: identical tables (checksum path only, never bisects) ────────

fn bench_diff_identical_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_identical");
    let rt = runtime();

    for n in [1_000i64, 10_000] {
        let config = DiffConfig { bisection_factor: 16, bisection_threshold: 1_024, ..Default::default() };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                rt.block_on(async {
                    let left = segment(build_table(n, None));
                    let right = segment(build_table(n, None));
                    let differ = Differ::new(config.clone()).unwrap();
                    let events: Vec<_> = differ.diff(left, right).collect().await;
                    black_box(events)
                })
            });
        });
    }
    group.finish();
}

// ── Full diff: one differing row among many (forces a bisection descent) ──

fn bench_diff_single_difference(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_single_difference");
    let rt = runtime();

    for n in [1_000i64, 10_000] {
        let config = DiffConfig { bisection_factor: 8, bisection_threshold: 64, ..Default::default() };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                rt.block_on(async {
                    let differing_key = n / 2;
                    let left = segment(build_table(n, None));
                    let right = segment(build_table(n, Some(differing_key)));
                    let differ = Differ::new(config.clone()).unwrap();
                    let events: Vec<_> = differ.diff(left, right).collect().await;
                    black_box(events)
                })
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_choose_checkpoints,
    bench_diff_identical_tables,
    bench_diff_single_difference,
);
criterion_main!(benches);
