//! SQL fragment algebra.
//!
//! A small, closed family of AST nodes emitted by [`TableSegment`](crate::segment::TableSegment)
//! and rendered into dialect-specific SQL by a [`Database`](crate::database::Database)
//! driver. The core never renders SQL itself — only drivers do — so this
//! module is deliberately just typed data, no string building.
//!
//! The one node whose rendering carries a correctness obligation is
//! [`SqlExpr::Checksum`]: two drivers given the same logical rows must
//! produce the same value. See `DESIGN.md` for the cross-dialect contract
//! and [`crate::checksum`] for the reference implementation this crate's
//! own in-memory driver uses.

use chrono::{DateTime, Utc};

/// A possibly-qualified table identifier, e.g. `["public", "orders"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TablePath(pub Vec<String>);

impl TablePath {
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        TablePath(parts.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for TablePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Comparison operators usable in a `WHERE` fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
}

/// An operand to a [`SqlExpr::Compare`]: either a column identifier or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(String),
    IntLiteral(i64),
    Time(DateTime<Utc>),
}

/// A node in the SQL fragment algebra.
///
/// This enum is the entire surface a driver needs to render. It is closed
/// by design (see `DESIGN.md`): adding a new kind of query to the
/// differencing engine means adding a variant here, not an open-ended
/// expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    /// A named column reference in a column list.
    Column(String),
    /// `COUNT(*)`.
    Count,
    /// An order-independent, value-commutative checksum aggregate over the
    /// concatenation of the given columns. See the module docs.
    Checksum(Vec<String>),
    /// `MIN(col)`.
    Min(String),
    /// `MAX(col)`.
    Max(String),
    /// `lhs op rhs`.
    Compare(CompareOp, Operand, Operand),
}

/// A complete, driver-agnostic `SELECT` fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: TablePath,
    pub columns: Vec<SqlExpr>,
    pub where_clauses: Vec<SqlExpr>,
    pub group_by: Option<Vec<String>>,
    pub order_by: Option<Vec<String>>,
}

impl Select {
    pub fn new(table: TablePath, columns: Vec<SqlExpr>) -> Self {
        Select {
            table,
            columns,
            where_clauses: Vec::new(),
            group_by: None,
            order_by: None,
        }
    }

    pub fn with_where(mut self, where_clauses: Vec<SqlExpr>) -> Self {
        self.where_clauses = where_clauses;
        self
    }
}
