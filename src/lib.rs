//! Hash-bisection row-level differencing for two relational tables that may
//! live on different database servers of different vendors.
//!
//! # Theoretical Basis
//!
//! The algorithm localizes disagreement between two (expected to be mostly
//! identical) tables to small key ranges using server-side aggregate
//! checksums, then materializes and set-diffs only those small ranges —
//! network and compute cost scales with the size of the *difference*, not
//! with table size. See `SPEC_FULL.md` and `DESIGN.md` for the full design
//! and the grounding ledger against this codebase's conventions.
//!
//! # Scope
//!
//! This crate is the differencing engine only: the [`Database`] trait is a
//! narrow capability a caller's own driver implements (connection pooling,
//! type coercion, and dialect-specific SQL rendering — including the
//! cross-dialect `Checksum` contract — are the driver's job, not this
//! crate's). No CLI, no file-based configuration loading, no bundled
//! logging backend: callers wire up `tracing-subscriber` themselves.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use table_diff::{Differ, DiffConfig, TableSegment, TablePath};
//! use table_diff::testutil::InMemoryDatabase;
//! use table_diff::value::Value;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let left_db = Arc::new(InMemoryDatabase::new(TablePath::new(["orders"])));
//! left_db.insert_row(&[("id", Value::Int(1)), ("total", Value::Int(100))]);
//! left_db.insert_row(&[("id", Value::Int(2)), ("total", Value::Int(200))]);
//!
//! let right_db = Arc::new(InMemoryDatabase::new(TablePath::new(["orders"])));
//! right_db.insert_row(&[("id", Value::Int(1)), ("total", Value::Int(100))]);
//!
//! let left = TableSegment::new(
//!     left_db, TablePath::new(["orders"]), "id", None, vec!["total".into()],
//!     None, None, None, None,
//! ).unwrap();
//! let right = TableSegment::new(
//!     right_db, TablePath::new(["orders"]), "id", None, vec!["total".into()],
//!     None, None, None, None,
//! ).unwrap();
//!
//! let differ = Differ::new(DiffConfig::default()).unwrap();
//! let events: Vec<_> = differ.diff(left, right).map(|r| r.unwrap()).collect().await;
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].sign, table_diff::Sign::Plus);
//! # }
//! ```

mod checksum;
mod config;
mod database;
mod differ;
mod error;
mod executor;
mod segment;
mod setdiff;
mod sql;
pub mod stats;
pub mod testutil;
pub mod value;

pub use config::DiffConfig;
pub use database::{Database, QueryResult, Shape};
pub use differ::Differ;
pub use error::DiffError;
pub use segment::TableSegment;
pub use setdiff::{DiffEvent, Sign};
pub use sql::{CompareOp, Operand, Select, SqlExpr, TablePath};
pub use stats::{DiffStats, DiffStatsSnapshot};
