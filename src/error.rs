//! Error types for the differencing engine.
//!
//! All errors that can occur while diffing two tables are represented by
//! [`DiffError`]. Errors are propagated via `Result<T, DiffError>` throughout
//! the crate and, once a diff stream yields one, the stream ends — there is
//! no partial-success mode (see `DESIGN.md`).
//!
//! # Error Classification
//!
//! - **Configuration** — invalid parameter combinations (bad bisection
//!   factor/threshold, time bounds without an update column). Raised at
//!   construction time, before any query is issued.
//! - **Empty table** — `query_key_range` found no rows on one side.
//! - **Backend** — any error surfaced by the [`Database`](crate::database::Database)
//!   capability. Propagated unchanged, never retried.
//!
//! Slow-checksum and sparse-key conditions are advisory only: they are
//! logged via `tracing::warn!` and never become a [`DiffError`] variant.

use std::sync::Arc;

/// Primary error type for the differencing engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiffError {
    /// An invalid combination of parameters was supplied at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `query_key_range` found no rows on one or both sides.
    #[error("table appears to be empty: {0}")]
    EmptyTable(String),

    /// The [`Database`](crate::database::Database) capability returned an error.
    #[error("backend error: {0}")]
    Backend(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl DiffError {
    /// Wrap an arbitrary backend error as a [`DiffError::Backend`].
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DiffError::Backend(Arc::new(err))
    }

    /// Whether this error originated from the configuration layer, as
    /// opposed to a live query against a backend.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DiffError::Configuration(_))
    }
}
