//! A reference, in-memory [`Database`] implementation.
//!
//! Real drivers (connection pooling, type coercion, dialect-specific
//! `Checksum` rendering) are external collaborators this crate doesn't
//! provide — but the bisection differ needs *something* implementing the
//! capability to be testable at all. This module is that something: it
//! interprets the [`Select`] AST directly against in-memory rows, using
//! [`crate::checksum`] for the `Checksum` aggregate. It is also handy for
//! callers writing examples or fixtures without standing up a real database.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::checksum;
use crate::database::{Database, QueryResult, Shape};
use crate::error::DiffError;
use crate::sql::{CompareOp, Operand, Select, SqlExpr, TablePath};
use crate::value::{Row, Value};

/// An in-memory table: an unordered bag of rows, each a name -> value map.
pub struct InMemoryDatabase {
    path: TablePath,
    rows: Arc<Mutex<Vec<BTreeMap<String, Value>>>>,
}

impl InMemoryDatabase {
    pub fn new(path: TablePath) -> Self {
        InMemoryDatabase {
            path,
            rows: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Insert one row, given as `(column, value)` pairs.
    pub fn insert_row(&self, columns: &[(&str, Value)]) {
        let row = columns
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        self.rows.lock().expect("lock poisoned").push(row);
    }

    pub fn path(&self) -> &TablePath {
        &self.path
    }
}

fn eval_operand(row: &BTreeMap<String, Value>, operand: &Operand) -> Value {
    match operand {
        Operand::Column(name) => row.get(name).cloned().unwrap_or(Value::Null),
        Operand::IntLiteral(v) => Value::Int(*v),
        Operand::Time(t) => Value::Timestamp(*t),
    }
}

fn compare(op: CompareOp, lhs: Value, rhs: Value) -> bool {
    let ordering = match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.partial_cmp(b),
        _ => None,
    };
    match op {
        CompareOp::Eq => lhs == rhs,
        CompareOp::Ne => lhs != rhs,
        CompareOp::Lt => ordering.is_some_and(|o| o.is_lt()),
        CompareOp::Le => ordering.is_some_and(|o| o.is_le()),
    }
}

fn eval_aggregate(expr: &SqlExpr, rows: &[&BTreeMap<String, Value>]) -> Value {
    match expr {
        SqlExpr::Count => Value::Int(rows.len() as i64),
        SqlExpr::Checksum(cols) => {
            let projected: Vec<Row> = rows
                .iter()
                .map(|r| cols.iter().map(|c| r.get(c).cloned().unwrap_or(Value::Null)).collect())
                .collect();
            match checksum::checksum_rows(&projected) {
                Some(sum) => Value::Int(sum as i64),
                None => Value::Null,
            }
        }
        SqlExpr::Min(col) => int_column(rows, col).min().map(Value::Int).unwrap_or(Value::Null),
        SqlExpr::Max(col) => int_column(rows, col).max().map(Value::Int).unwrap_or(Value::Null),
        other => panic!("reference driver does not support aggregate {other:?} in this position"),
    }
}

fn int_column<'a>(rows: &'a [&'a BTreeMap<String, Value>], col: &'a str) -> impl Iterator<Item = i64> + 'a {
    rows.iter().filter_map(move |r| match r.get(col) {
        Some(Value::Int(v)) => Some(*v),
        _ => None,
    })
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn query(&self, select: Select, shape: Shape) -> Result<QueryResult, DiffError> {
        let rows = self.rows.lock().expect("lock poisoned");
        let filtered: Vec<&BTreeMap<String, Value>> = rows
            .iter()
            .filter(|row| {
                select.where_clauses.iter().all(|clause| match clause {
                    SqlExpr::Compare(op, lhs, rhs) => {
                        compare(*op, eval_operand(row, lhs), eval_operand(row, rhs))
                    }
                    other => panic!("reference driver does not support where-clause {other:?}"),
                })
            })
            .collect();

        match shape {
            Shape::Rows => {
                let out = filtered
                    .iter()
                    .map(|row| {
                        select
                            .columns
                            .iter()
                            .map(|c| match c {
                                SqlExpr::Column(name) => row.get(name).cloned().unwrap_or(Value::Null),
                                other => panic!("reference driver does not support column {other:?}"),
                            })
                            .collect::<Row>()
                    })
                    .collect();
                Ok(QueryResult::Rows(out))
            }
            Shape::Scalar => Ok(QueryResult::Scalar(Some(eval_aggregate(&select.columns[0], &filtered)))),
            Shape::Tuple => {
                let values = select.columns.iter().map(|c| eval_aggregate(c, &filtered)).collect();
                Ok(QueryResult::Tuple(values))
            }
        }
    }
}
