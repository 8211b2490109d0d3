//! Attribute value ordering
//!
//! Numbers compare numerically, strings lexicographically, booleans with
//! `false < true`. Values of different kinds are incomparable for
//! predicates; `total_cmp` gives them a stable kind order for sorting.

use std::cmp::Ordering;

use serde_json::Value;

/// Compare two values of the same kind
///
/// Returns `None` when the kinds differ or the kind has no natural order.
pub fn partial_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                return Some(ai.cmp(&bi));
            }
            if let (Some(au), Some(bu)) = (a.as_u64(), b.as_u64()) {
                return Some(au.cmp(&bu));
            }
            let (af, bf) = (a.as_f64()?, b.as_f64()?);
            af.partial_cmp(&bf)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Total order over all values, used for sort-key ordering
pub fn total_cmp(a: &Value, b: &Value) -> Ordering {
    if let Some(ordering) = partial_cmp(a, b) {
        return ordering;
    }
    match kind_rank(a).cmp(&kind_rank(b)) {
        Ordering::Equal => a.to_string().cmp(&b.to_string()),
        ordering => ordering,
    }
}

/// Compare two key tuples element by element
pub fn total_cmp_keys(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match total_cmp(x, y) {
            Ordering::Equal => continue,
            ordering => return ordering,
        }
    }
    a.len().cmp(&b.len())
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
