//! Dynamic column typing.
//!
//! Drivers hand rows back as tuples of [`Value`] rather than a generic
//! decode target, so the differ can hash and compare them without knowing
//! anything about the originating SQL type system.

use chrono::{DateTime, Utc};
use std::hash::{Hash, Hasher};

/// A single database-typed scalar.
///
/// Equality and hashing are structural. `Float` compares and hashes by bit
/// pattern (the usual approach for giving `f64` a total, hashable equality —
/// two NaNs with the same bit pattern are equal, `0.0` and `-0.0` are not).
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
            Value::Bool(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::Null => {}
        }
    }
}

impl Value {
    /// A stable byte encoding used by [`crate::checksum`] to fold a `Value`
    /// into an order-independent row digest. Distinct variants must never
    /// collide, so each is tagged before its payload.
    pub(crate) fn digest_bytes(&self, out: &mut Vec<u8>) {
        match self {
            Value::Int(v) => {
                out.push(b'i');
                out.extend_from_slice(&v.to_le_bytes());
            }
            Value::Float(v) => {
                out.push(b'f');
                out.extend_from_slice(&v.to_bits().to_le_bytes());
            }
            Value::Text(v) => {
                out.push(b't');
                out.extend_from_slice(v.as_bytes());
            }
            Value::Bool(v) => {
                out.push(b'b');
                out.push(*v as u8);
            }
            Value::Timestamp(v) => {
                out.push(b's');
                out.extend_from_slice(&v.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
            }
            Value::Null => out.push(b'n'),
        }
    }
}

/// A materialized row, in canonical column order (key column first).
pub type Row = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(Value::Float(1.5), Value::Float(1.5));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn null_does_not_equal_other_variants() {
        assert_ne!(Value::Null, Value::Int(0));
    }

    #[test]
    fn digest_bytes_distinguish_variant_boundaries() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        Value::Text("1".into()).digest_bytes(&mut a);
        Value::Int(49).digest_bytes(&mut b); // b'1' == 0x31 == 49
        assert_ne!(a, b, "tagged encoding must not let Text and Int collide");
    }
}
