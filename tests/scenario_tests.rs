//! End-to-end scenarios against the reference in-memory driver (spec §8).

mod common;

use common::diff_rows;
use table_diff::{DiffConfig, Sign};

#[tokio::test]
async fn two_empty_tables_is_fatal() {
    let config = DiffConfig {
        bisection_threshold: 50,
        ..Default::default()
    };
    let result = diff_rows(&[], &[], config).await;
    assert!(result.is_err(), "diffing two empty tables must be fatal");
}

#[tokio::test]
async fn identical_hundred_row_tables_diff_to_nothing() {
    let rows: Vec<(i64, &str)> = (1..=100).map(|id| (id, "same")).collect();
    let config = DiffConfig {
        bisection_threshold: 50,
        ..Default::default()
    };
    let (events, differ) = diff_rows(&rows, &rows, config).await.unwrap();
    assert!(events.is_empty());
    assert!(differ.stats().snapshot().checksum_calls >= 1);
}

#[tokio::test]
async fn left_has_extra_row() {
    let left = [(1, "a"), (2, "b"), (3, "c")];
    let right = [(1, "a"), (3, "c")];
    let config = DiffConfig {
        bisection_threshold: 1024,
        ..Default::default()
    };
    let (events, _) = diff_rows(&left, &right, config).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].sign, Sign::Plus);
    assert_eq!(events[0].row[0], table_diff::value::Value::Int(2));
}

#[tokio::test]
async fn updated_row_emits_contiguous_plus_then_minus() {
    let left = [(1, "a"), (2, "b")];
    let right = [(1, "a"), (2, "B")];
    let config = DiffConfig::default();
    let (events, _) = diff_rows(&left, &right, config).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].sign, Sign::Plus);
    assert_eq!(events[1].sign, Sign::Minus);
    assert_eq!(events[0].row[0], events[1].row[0]);
}

#[tokio::test]
async fn bisection_triggers_and_finds_the_single_differing_key() {
    let n = 20_000i64;
    let differing_key = 7_325i64;
    let left: Vec<(i64, &str)> = (0..n).map(|id| (id, "same")).collect();
    let mut right = left.clone();
    let idx = right.iter().position(|(id, _)| *id == differing_key).unwrap();
    right[idx].1 = "different";

    let config = DiffConfig {
        bisection_factor: 4,
        bisection_threshold: 512,
        ..Default::default()
    };
    let (events, differ) = diff_rows(&left, &right, config).await.unwrap();
    assert_eq!(events.len(), 2, "exactly one +/- pair for the differing key");
    assert_eq!(events[0].row[0], table_diff::value::Value::Int(differing_key));
    assert_eq!(events[1].row[0], table_diff::value::Value::Int(differing_key));
    assert!(differ.stats().snapshot().checksum_calls > 0);
}

#[tokio::test]
async fn one_side_empty_in_a_sub_range_still_terminates_and_reports_minus_rows() {
    // Left only has keys 1..=3; right additionally has a whole extra cluster
    // at 100..=103. Bisection will eventually isolate a child segment where
    // the left side's count is 0 but the right side's is not (diffPair's
    // checksum-mismatch branch, not its both-counts-zero branch) — pinning
    // that this still terminates cleanly rather than looping on maxRows=0.
    let left = [(1, "a"), (2, "b"), (3, "c")];
    let right = [
        (1, "a"),
        (2, "b"),
        (3, "c"),
        (100, "x"),
        (101, "y"),
        (102, "z"),
        (103, "w"),
    ];
    let config = DiffConfig {
        bisection_factor: 2,
        bisection_threshold: 2,
        ..Default::default()
    };
    let (events, _) = diff_rows(&left, &right, config).await.unwrap();
    assert_eq!(events.len(), 4, "every extra right-side row must be reported exactly once");
    assert!(events.iter().all(|e| e.sign == Sign::Minus));
    let keys: Vec<i64> = events
        .iter()
        .map(|e| match e.row[0] {
            table_diff::value::Value::Int(k) => k,
            _ => panic!("expected int key"),
        })
        .collect();
    assert_eq!(keys, vec![100, 101, 102, 103]);
}

#[tokio::test]
async fn sparse_keys_still_diff_to_nothing_with_an_advisory() {
    let rows = [(1, "a"), (1_000_000, "b")];
    let config = DiffConfig {
        bisection_factor: 2,
        bisection_threshold: 4,
        ..Default::default()
    };
    let (events, differ) = diff_rows(&rows, &rows, config).await.unwrap();
    assert!(events.is_empty());
    assert!(differ.stats().snapshot().sparse_key_warnings >= 1);
}
