//! Reference row checksum.
//!
//! The [`Checksum`](crate::sql::SqlExpr::Checksum) AST node is rendered by
//! each driver in its own SQL dialect (see `DESIGN.md` for the cross-dialect
//! contract). This module provides the checksum the crate's own reference
//! in-memory driver uses, and doubles as a worked example of what the
//! contract requires: stable under row permutation, and a pure function of
//! the row's column values.
//!
//! Order-independence is achieved the same way a `SUM(hash(...))` aggregate
//! would be in SQL: hash each row independently, then combine with wrapping
//! addition, which is commutative and associative over a fixed-width integer.

use crate::value::Row;
use xxhash_rust::xxh3::xxh3_64;

/// Digest of a single row, suitable for folding into an order-independent
/// aggregate via [`fold_row`].
pub fn row_digest(row: &Row) -> u64 {
    let mut bytes = Vec::new();
    for (i, value) in row.iter().enumerate() {
        if i > 0 {
            bytes.push(0x1E); // record separator, keeps adjacent columns from colliding
        }
        value.digest_bytes(&mut bytes);
    }
    xxh3_64(&bytes)
}

/// Fold a row's digest into a running checksum. Order-independent: the same
/// set of rows folded in any order yields the same final value.
pub fn fold_row(running: u64, row: &Row) -> u64 {
    running.wrapping_add(row_digest(row))
}

/// Checksum of a whole row set. Returns `None` for an empty set, matching
/// the `NULL` a `SUM()` aggregate yields over zero rows (see
/// `TableSegment::count_and_checksum` empty-segment semantics).
pub fn checksum_rows<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Option<u64> {
    let mut acc: Option<u64> = None;
    for row in rows {
        acc = Some(fold_row(acc.unwrap_or(0), row));
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn row(id: i64, v: &str) -> Row {
        vec![Value::Int(id), Value::Text(v.to_string())]
    }

    #[test]
    fn empty_row_set_checksums_to_none() {
        let rows: Vec<Row> = vec![];
        assert_eq!(checksum_rows(&rows), None);
    }

    #[test]
    fn checksum_is_order_independent() {
        let rows = vec![row(1, "a"), row(2, "b"), row(3, "c")];
        let mut reversed = rows.clone();
        reversed.reverse();
        assert_eq!(checksum_rows(&rows), checksum_rows(&reversed));
    }

    #[test]
    fn checksum_changes_when_a_value_changes() {
        let a = vec![row(1, "a"), row(2, "b")];
        let b = vec![row(1, "a"), row(2, "B")];
        assert_ne!(checksum_rows(&a), checksum_rows(&b));
    }

    #[test]
    fn adjacent_column_boundary_does_not_collide() {
        // ("1", "23") vs ("12", "3") must not hash identically.
        let a: Row = vec![Value::Text("1".into()), Value::Text("23".into())];
        let b: Row = vec![Value::Text("12".into()), Value::Text("3".into())];
        assert_ne!(row_digest(&a), row_digest(&b));
    }
}
