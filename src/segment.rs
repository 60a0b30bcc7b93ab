//! `TableSegment`: an immutable, key- and time-bounded slice of one table on
//! one database, plus the four queries it can run against itself.
//!
//! Segments are value types. Every "mutation" (`with_range`, `new` via
//! [`TableSegmentBuilder`]) produces a fresh [`TableSegment`]; this is what
//! lets the bisection differ hand children off to concurrent tasks without
//! any locking (see `DESIGN.md`).

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::database::{Database, QueryResult, Shape};
use crate::error::DiffError;
use crate::sql::{CompareOp, Operand, Select, SqlExpr, TablePath};
use crate::value::{Row, Value};

/// How long a single `count_and_checksum` call may take before the engine
/// logs an advisory suggesting a larger bisection factor. Purely
/// informational — never changes behavior.
pub const RECOMMENDED_CHECKSUM_DURATION: Duration = Duration::from_secs(10);

/// A key-bounded, time-bounded slice of one table on one database.
#[derive(Clone)]
pub struct TableSegment {
    db: Arc<dyn Database>,
    path: TablePath,
    key_column: String,
    update_column: Option<String>,
    extra_columns: Vec<String>,
    start_key: Option<i64>,
    end_key: Option<i64>,
    min_time: Option<DateTime<Utc>>,
    max_time: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for TableSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSegment")
            .field("path", &self.path)
            .field("key_column", &self.key_column)
            .field("start_key", &self.start_key)
            .field("end_key", &self.end_key)
            .finish_non_exhaustive()
    }
}

impl TableSegment {
    /// Construct a new, unbounded segment. Fails with
    /// [`DiffError::Configuration`] if `min_time`/`max_time` is set without
    /// `update_column` (invariant 1, §3).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<dyn Database>,
        path: TablePath,
        key_column: impl Into<String>,
        update_column: Option<String>,
        extra_columns: Vec<String>,
        start_key: Option<i64>,
        end_key: Option<i64>,
        min_time: Option<DateTime<Utc>>,
        max_time: Option<DateTime<Utc>>,
    ) -> Result<Self, DiffError> {
        if update_column.is_none() && (min_time.is_some() || max_time.is_some()) {
            return Err(DiffError::Configuration(
                "min_time/max_time requires update_column to be set".into(),
            ));
        }
        Ok(TableSegment {
            db,
            path,
            key_column: key_column.into(),
            update_column,
            extra_columns,
            start_key,
            end_key,
            min_time,
            max_time,
        })
    }

    /// A copy of this segment with a different `[start_key, end_key)` range.
    /// All other fields are preserved.
    pub fn with_range(&self, start_key: Option<i64>, end_key: Option<i64>) -> TableSegment {
        TableSegment {
            start_key,
            end_key,
            ..self.clone()
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.start_key.is_some() && self.end_key.is_some()
    }

    pub fn start_key(&self) -> Option<i64> {
        self.start_key
    }

    pub fn end_key(&self) -> Option<i64> {
        self.end_key
    }

    pub fn path(&self) -> &TablePath {
        &self.path
    }

    /// The canonical column list (§3 invariant 4): key column first, then
    /// the remaining columns — extras plus the update column, if any — in
    /// lexicographic order. Both sides of a diff must agree on this order
    /// or their checksums will never match for identical data.
    pub fn relevant_columns(&self) -> Vec<String> {
        let mut extras: BTreeSet<String> = self.extra_columns.iter().cloned().collect();
        if let Some(update_column) = &self.update_column {
            extras.insert(update_column.clone());
        }
        let mut columns = vec![self.key_column.clone()];
        columns.extend(extras);
        columns
    }

    fn key_range_where(&self) -> Vec<SqlExpr> {
        let mut clauses = Vec::new();
        if let Some(start) = self.start_key {
            clauses.push(SqlExpr::Compare(
                CompareOp::Le,
                Operand::IntLiteral(start),
                Operand::Column(self.key_column.clone()),
            ));
        }
        if let Some(end) = self.end_key {
            clauses.push(SqlExpr::Compare(
                CompareOp::Lt,
                Operand::Column(self.key_column.clone()),
                Operand::IntLiteral(end),
            ));
        }
        clauses
    }

    fn update_range_where(&self) -> Vec<SqlExpr> {
        let mut clauses = Vec::new();
        let update_column = match &self.update_column {
            Some(c) => c,
            None => return clauses,
        };
        if let Some(min_time) = self.min_time {
            clauses.push(SqlExpr::Compare(
                CompareOp::Le,
                Operand::Time(min_time),
                Operand::Column(update_column.clone()),
            ));
        }
        if let Some(max_time) = self.max_time {
            clauses.push(SqlExpr::Compare(
                CompareOp::Lt,
                Operand::Column(update_column.clone()),
                Operand::Time(max_time),
            ));
        }
        clauses
    }

    fn make_select(&self, columns: Vec<SqlExpr>) -> Select {
        let mut where_clauses = self.key_range_where();
        where_clauses.extend(self.update_range_where());
        Select::new(self.path.clone(), columns).with_where(where_clauses)
    }

    /// Query the database for the minimum and maximum key in this segment.
    /// Used to discover the initial bisection bounds. Fails with
    /// [`DiffError::EmptyTable`] if either bound is absent (no rows).
    pub async fn query_key_range(&self) -> Result<(i64, i64), DiffError> {
        let select = self.make_select(vec![
            SqlExpr::Min(self.key_column.clone()),
            SqlExpr::Max(self.key_column.clone()),
        ]);
        let result = self.db.query(select, Shape::Tuple).await?;
        let values = match result {
            QueryResult::Tuple(v) => v,
            other => {
                return Err(DiffError::backend(UnexpectedShape("Tuple", other)));
            }
        };
        let min_key = as_opt_int(values.first());
        let max_key = as_opt_int(values.get(1));
        match (min_key, max_key) {
            (Some(min_key), Some(max_key)) => Ok((min_key, max_key)),
            _ => Err(DiffError::EmptyTable(self.path.to_string())),
        }
    }

    /// Row count of this segment. Available but not used on the hot path —
    /// `count_and_checksum` returns both in a single round trip.
    pub async fn count(&self) -> Result<u64, DiffError> {
        let select = self.make_select(vec![SqlExpr::Count]);
        let result = self.db.query(select, Shape::Scalar).await?;
        match result {
            QueryResult::Scalar(v) => Ok(as_opt_int(v.as_ref()).unwrap_or(0) as u64),
            other => Err(DiffError::backend(UnexpectedShape("Scalar", other))),
        }
    }

    /// Row count and checksum over [`Self::relevant_columns`] in one query —
    /// the hot path of the bisection differ. An empty segment returns
    /// `(0, None)`; a `None` checksum must never be compared against
    /// another checksum (see `DESIGN.md`).
    pub async fn count_and_checksum(&self) -> Result<(u64, Option<u64>), DiffError> {
        let columns = self.relevant_columns();
        let select = self.make_select(vec![SqlExpr::Count, SqlExpr::Checksum(columns)]);

        let start = Instant::now();
        let result = self.db.query(select, Shape::Tuple).await?;
        let duration = start.elapsed();
        if duration > RECOMMENDED_CHECKSUM_DURATION {
            tracing::warn!(
                ?duration,
                table = %self.path,
                "checksum is taking longer than expected; consider increasing the bisection factor",
            );
        }

        let values = match result {
            QueryResult::Tuple(v) => v,
            other => return Err(DiffError::backend(UnexpectedShape("Tuple", other))),
        };
        let count = as_opt_int(values.first()).unwrap_or(0) as u64;
        let checksum = match values.get(1) {
            Some(Value::Int(v)) => Some(*v as u64),
            _ => None,
        };
        Ok((count, checksum))
    }

    /// Materialize every row of this segment, in canonical column order.
    pub async fn get_values(&self) -> Result<Vec<Row>, DiffError> {
        let columns: Vec<SqlExpr> = self
            .relevant_columns()
            .into_iter()
            .map(SqlExpr::Column)
            .collect();
        let select = self.make_select(columns);
        let result = self.db.query(select, Shape::Rows).await?;
        match result {
            QueryResult::Rows(rows) => Ok(rows),
            other => Err(DiffError::backend(UnexpectedShape("Rows", other))),
        }
    }

    /// `n` interior key positions evenly spaced within `(start_key, end_key)`.
    /// Requires [`Self::is_bounded`].
    pub fn choose_checkpoints(&self, n: usize) -> Vec<i64> {
        assert!(self.is_bounded(), "choose_checkpoints requires a bounded segment");
        let start = self.start_key.unwrap();
        let end = self.end_key.unwrap();
        split_space(start, end, n)
    }

    /// Split this segment into `checkpoints.len() + 1` contiguous child
    /// segments joining `start_key -> c1 -> c2 -> ... -> cn -> end_key`.
    pub fn segment_by_checkpoints(&self, mut checkpoints: Vec<i64>) -> Vec<TableSegment> {
        checkpoints.sort_unstable();
        if let (Some(start), Some(end)) = (self.start_key, self.end_key) {
            debug_assert!(
                checkpoints.iter().all(|&c| start <= c && c < end),
                "checkpoints must lie within [start_key, end_key)",
            );
        }

        let mut positions = Vec::with_capacity(checkpoints.len() + 2);
        positions.push(self.start_key);
        positions.extend(checkpoints.into_iter().map(Some));
        positions.push(self.end_key);

        positions
            .windows(2)
            .map(|w| self.with_range(w[0], w[1]))
            .collect()
    }
}

/// Evenly space `count` checkpoints within `[start, end)`, matching the
/// reference implementation's spacing formula exactly (§4.3): step is
/// `(size + 1) / (count + 1)` (integer, floor division), and checkpoints are
/// the first `count` multiples of `step` past `start` that land strictly
/// before `end`.
fn split_space(start: i64, end: i64, count: usize) -> Vec<i64> {
    if count == 0 || start >= end {
        return Vec::new();
    }
    let size = end - start;
    let step = ((size + 1) / (count as i64 + 1)).max(1);

    let mut checkpoints = Vec::with_capacity(count);
    let mut next = start + step;
    while next < end && checkpoints.len() < count {
        checkpoints.push(next);
        next += step;
    }
    checkpoints
}

fn as_opt_int(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Int(v)) => Some(*v),
        _ => None,
    }
}

#[derive(Debug)]
struct UnexpectedShape(&'static str, QueryResult);

impl std::fmt::Display for UnexpectedShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected a {} result, got {:?}", self.0, self.1)
    }
}

impl std::error::Error for UnexpectedShape {}
