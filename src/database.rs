//! The Database capability.
//!
//! This is the one thing the core consumes from the outside world: a way to
//! run a [`Select`] fragment and decode the result into one of a few shapes.
//! Connection pooling, type coercion, and concrete SQL string formatting all
//! live in a concrete driver — an external collaborator not covered by this
//! crate (see `DESIGN.md`). `async_trait` is used so the trait stays
//! object-safe (`Arc<dyn Database>`) while composing with the async
//! executor in [`crate::executor`].

use crate::error::DiffError;
use crate::sql::Select;
use crate::value::Row;
use async_trait::async_trait;

/// The shape a caller wants a query's result decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single scalar value, e.g. `COUNT(*)`.
    Scalar,
    /// A fixed tuple of scalars, e.g. `(MIN(key), MAX(key))`.
    Tuple,
    /// A list of tuples, e.g. the materialized rows of a segment.
    Rows,
}

/// The decoded result of a query, tagged by the [`Shape`] that was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Scalar(Option<crate::value::Value>),
    Tuple(Vec<crate::value::Value>),
    Rows(Vec<Row>),
}

/// A handle to a queryable backend: one SQL server, one connection pool,
/// one vendor's dialect.
///
/// Implementations are assumed thread-safe for concurrent queries against
/// distinct connections; the [`crate::executor`] relies on this to fan out
/// work. Errors propagate as [`DiffError::Backend`] — this layer never
/// retries.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute `select`, decoding the result according to `shape`.
    async fn query(&self, select: Select, shape: Shape) -> Result<QueryResult, DiffError>;
}
