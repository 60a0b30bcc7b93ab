//! The bisection differ (§4.5): the recursive divide-and-conquer algorithm
//! that drives a pair of [`TableSegment`]s to a lazy stream of [`DiffEvent`]s.
//!
//! Recursion is modeled as a segment tree of tasks (`DESIGN.md`'s "recursion
//! as task graph" note): each internal node fans its children out through
//! [`crate::executor::ordered_map`] and flattens their results back together
//! in child order, exactly mirroring the reference implementation's
//! `for res in thread_map(list, children): yield from res` — each child's
//! own subtree is fully resolved before being handed to its parent, but
//! siblings run concurrently and are emitted to the caller as soon as they
//! land, in order.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::config::DiffConfig;
use crate::error::DiffError;
use crate::executor::{ordered_map, threaded_call};
use crate::segment::TableSegment;
use crate::setdiff::{DiffEvent, diff_sets};
use crate::stats::DiffStats;

/// Runs [`diff`](Differ::diff) calls with a fixed configuration, sharing a
/// single [`DiffStats`] handle across however many calls are made with this
/// instance.
#[derive(Debug, Clone)]
pub struct Differ {
    config: DiffConfig,
    stats: DiffStats,
}

impl Differ {
    /// Construct a differ, validating `config` up front (§7: configuration
    /// errors are fatal at construction, not mid-run).
    pub fn new(config: DiffConfig) -> Result<Self, DiffError> {
        config.validate()?;
        Ok(Differ {
            config,
            stats: DiffStats::new(),
        })
    }

    /// The shared statistics handle for every [`diff`](Self::diff) call run
    /// through this `Differ`.
    pub fn stats(&self) -> DiffStats {
        self.stats.clone()
    }

    /// Diff `left` against `right`, returning a lazy stream of row-level
    /// differences. Consumers may drop the stream early; in-flight queries
    /// already spawned run to completion in the background and their
    /// results are discarded (§4.4 — no cancellation path).
    pub fn diff(
        &self,
        left: TableSegment,
        right: TableSegment,
    ) -> BoxStream<'static, Result<DiffEvent, DiffError>> {
        let config_for_bounds = self.config.clone();
        let config_for_recursion = self.config.clone();
        let stats = self.stats.clone();

        tracing::info!(
            bisection_factor = config_for_bounds.bisection_factor,
            bisection_threshold = config_for_bounds.bisection_threshold,
            "diffing tables",
        );

        stream::once(async move { discover_bounds(config_for_bounds, left, right).await })
            .flat_map(move |res| match res {
                Ok((left, right)) => {
                    bisect_and_diff_stream(config_for_recursion.clone(), stats.clone(), left, right, 0, None)
                }
                Err(err) => stream::once(async move { Err(err) }).boxed(),
            })
            .boxed()
    }
}

/// Phase 1 (§4.5): concurrently discover each side's key range, then widen
/// both segments to the union `[min(mins), max(maxs) + 1)`. Fatal if either
/// side is empty.
async fn discover_bounds(
    config: DiffConfig,
    left: TableSegment,
    right: TableSegment,
) -> Result<(TableSegment, TableSegment), DiffError> {
    let ranges = threaded_call(
        config.threaded,
        config.max_pool_size,
        vec![left.clone(), right.clone()],
        |seg| async move { seg.query_key_range().await },
    )
    .await;
    let mut ranges = ranges.into_iter();
    let (left_min, left_max) = ranges.next().expect("exactly two inputs")?;
    let (right_min, right_max) = ranges.next().expect("exactly two inputs")?;

    let start_key = left_min.min(right_min);
    let end_key = left_max.max(right_max) + 1; // ranges are semi-open on the right (§3 invariant 5)

    Ok((
        left.with_range(Some(start_key), Some(end_key)),
        right.with_range(Some(start_key), Some(end_key)),
    ))
}

/// Phase 2 (§4.5): below `bisection_threshold` rows, materialize and diff
/// locally; otherwise split into `bisection_factor` child pairs and recurse
/// into each via [`diff_pair`], streaming results back in child order.
fn bisect_and_diff_stream(
    config: DiffConfig,
    stats: DiffStats,
    left: TableSegment,
    right: TableSegment,
    level: usize,
    max_rows: Option<u64>,
) -> BoxStream<'static, Result<DiffEvent, DiffError>> {
    debug_assert!(left.is_bounded() && right.is_bounded());

    let max_rows = max_rows.unwrap_or_else(|| {
        (left.end_key().unwrap() - left.start_key().unwrap()).max(0) as u64
    });

    if max_rows < config.bisection_threshold {
        let threaded = config.threaded;
        let max_pool_size = config.max_pool_size;
        let fut: BoxFuture<'static, Result<Vec<DiffEvent>, DiffError>> = async move {
            let rows = threaded_call(
                threaded,
                max_pool_size,
                vec![left.clone(), right.clone()],
                |seg| async move { seg.get_values().await },
            )
            .await;
            let mut rows = rows.into_iter();
            let left_rows = rows.next().expect("exactly two inputs")?;
            let right_rows = rows.next().expect("exactly two inputs")?;
            let events = diff_sets(left_rows, right_rows);
            tracing::info!(level, diff_count = events.len(), "diff found different rows");
            Ok(events)
        }
        .boxed();
        return flatten_events(fut);
    }

    let checkpoints = left.choose_checkpoints(config.bisection_factor - 1);
    let left_children = left.segment_by_checkpoints(checkpoints.clone());
    let right_children = right.segment_by_checkpoints(checkpoints);
    let child_count = left_children.len();

    let pairs: Vec<(TableSegment, TableSegment, usize)> = left_children
        .into_iter()
        .zip(right_children)
        .enumerate()
        .map(|(i, (l, r))| (l, r, i))
        .collect();

    let child_results = ordered_map(config.threaded, config.max_pool_size, pairs, move |(l, r, i)| {
        let config = config.clone();
        let stats = stats.clone();
        diff_pair(config, stats, l, r, level + 1, i + 1, child_count)
    });

    child_results
        .flat_map(|res| match res {
            Ok(events) => stream::iter(events.into_iter().map(Ok)).boxed(),
            Err(err) => stream::once(async move { Err(err) }).boxed(),
        })
        .boxed()
}

/// Phase 3 (§4.5): compare one child pair by checksum, recursing into
/// [`bisect_and_diff_stream`] (drained to completion) only when the
/// checksums disagree.
fn diff_pair(
    config: DiffConfig,
    stats: DiffStats,
    left: TableSegment,
    right: TableSegment,
    level: usize,
    index: usize,
    count: usize,
) -> BoxFuture<'static, Result<Vec<DiffEvent>, DiffError>> {
    async move {
        tracing::debug!(
            level,
            index,
            count,
            start_key = ?left.start_key(),
            end_key = ?left.end_key(),
            "diffing segment",
        );

        let results = threaded_call(
            config.threaded,
            config.max_pool_size,
            vec![left.clone(), right.clone()],
            |seg| async move { seg.count_and_checksum().await },
        )
        .await;
        let mut results = results.into_iter();
        let (left_count, left_checksum) = results.next().expect("exactly two inputs")?;
        let (right_count, right_checksum) = results.next().expect("exactly two inputs")?;
        stats.record_checksum_call();

        if level == 1 {
            stats.add_left_table_count(left_count);
        }

        if left_count == 0 && right_count == 0 {
            stats.record_sparse_key_warning();
            tracing::warn!(
                level,
                index,
                "uneven distribution of keys detected (big gaps in the key column); \
                 consider increasing bisection_threshold",
            );
            debug_assert!(left_checksum.is_none() && right_checksum.is_none());
            return Ok(Vec::new());
        }

        if left_checksum != right_checksum {
            let max_rows = left_count.max(right_count);
            bisect_and_diff_stream(config, stats, left, right, level, Some(max_rows))
                .try_collect()
                .await
        } else {
            Ok(Vec::new())
        }
    }
    .boxed()
}

fn flatten_events(
    fut: BoxFuture<'static, Result<Vec<DiffEvent>, DiffError>>,
) -> BoxStream<'static, Result<DiffEvent, DiffError>> {
    stream::once(fut)
        .flat_map(|res| match res {
            Ok(events) => stream::iter(events.into_iter().map(Ok)).boxed(),
            Err(err) => stream::once(async move { Err(err) }).boxed(),
        })
        .boxed()
}
