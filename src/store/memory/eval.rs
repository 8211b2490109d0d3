//! Condition evaluation for the in-memory table
//!
//! No type coercion: a string never equals a number. Numbers compare by
//! value regardless of representation.

use std::cmp::Ordering;

use serde_json::Value;

use crate::predicate::{compare, Condition, ConditionOp};

/// Evaluates store conditions against item attributes
pub struct ConditionEval;

impl ConditionEval {
    /// Checks if an item matches a condition
    pub fn matches(item: &Value, condition: &Condition) -> bool {
        let actual = item
            .get(&condition.attribute)
            .filter(|v| !v.is_null());

        let actual = match (actual, &condition.op) {
            (None, ConditionOp::NotExists) | (None, ConditionOp::Ne { .. }) => return true,
            (None, _) => return false,
            (Some(_), ConditionOp::NotExists) => return false,
            (Some(v), _) => v,
        };

        match &condition.op {
            ConditionOp::Eq { value } => Self::eq_match(actual, value),
            ConditionOp::Ne { value } => !Self::eq_match(actual, value),
            ConditionOp::Lt { value } => Self::ordered(actual, value, |o| o == Ordering::Less),
            ConditionOp::Le { value } => Self::ordered(actual, value, |o| o != Ordering::Greater),
            ConditionOp::Gt { value } => Self::ordered(actual, value, |o| o == Ordering::Greater),
            ConditionOp::Ge { value } => Self::ordered(actual, value, |o| o != Ordering::Less),
            ConditionOp::Between { low, high } => {
                Self::ordered(actual, low, |o| o != Ordering::Less)
                    && Self::ordered(actual, high, |o| o != Ordering::Greater)
            }
            ConditionOp::In { values } => values.iter().any(|v| Self::eq_match(actual, v)),
            ConditionOp::Exists => true,
            ConditionOp::NotExists => false,
            ConditionOp::BeginsWith { prefix } => match (actual, prefix) {
                (Value::String(a), Value::String(p)) => a.starts_with(p.as_str()),
                _ => false,
            },
            ConditionOp::Contains { value } => match (actual, value) {
                (Value::String(a), Value::String(v)) => a.contains(v.as_str()),
                (Value::Array(items), v) => items.iter().any(|item| Self::eq_match(item, v)),
                _ => false,
            },
        }
    }

    fn eq_match(actual: &Value, expected: &Value) -> bool {
        match (actual, expected) {
            (Value::Number(_), Value::Number(_)) => {
                compare::partial_cmp(actual, expected) == Some(Ordering::Equal)
            }
            _ => actual == expected,
        }
    }

    /// Applies `accept` to the ordering; incomparable kinds never match
    fn ordered(actual: &Value, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
        compare::partial_cmp(actual, bound).map_or(false, accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cond(attribute: &str, op: ConditionOp) -> Condition {
        Condition::new(attribute, op)
    }

    #[test]
    fn test_equality_no_coercion() {
        let item = json!({"number": 5});
        assert!(ConditionEval::matches(&item, &Condition::eq("number", json!(5))));
        assert!(ConditionEval::matches(&item, &Condition::eq("number", json!(5.0))));
        assert!(!ConditionEval::matches(&item, &Condition::eq("number", json!("5"))));
    }

    #[test]
    fn test_range_operators() {
        let item = json!({"number": 4});
        assert!(ConditionEval::matches(&item, &cond("number", ConditionOp::Le { value: json!(4) })));
        assert!(!ConditionEval::matches(&item, &cond("number", ConditionOp::Lt { value: json!(4) })));
        assert!(ConditionEval::matches(&item, &cond("number", ConditionOp::Ge { value: json!(4) })));
        assert!(!ConditionEval::matches(&item, &cond("number", ConditionOp::Gt { value: json!(4) })));
    }

    #[test]
    fn test_between_inclusive() {
        let range = Condition::between("number", json!(2), json!(4));
        assert!(ConditionEval::matches(&json!({"number": 2}), &range));
        assert!(ConditionEval::matches(&json!({"number": 4}), &range));
        assert!(!ConditionEval::matches(&json!({"number": 5}), &range));
    }

    #[test]
    fn test_between_mixed_kinds_never_matches() {
        let range = Condition::between("number", json!(1), json!("z"));
        assert!(!ConditionEval::matches(&json!({"number": 2}), &range));
    }

    #[test]
    fn test_missing_and_null_attributes() {
        let item = json!({"string": null});
        assert!(!ConditionEval::matches(&item, &Condition::eq("string", json!("a"))));
        assert!(ConditionEval::matches(&item, &cond("string", ConditionOp::NotExists)));
        assert!(!ConditionEval::matches(&item, &cond("string", ConditionOp::Exists)));
        assert!(ConditionEval::matches(&item, &cond("other", ConditionOp::Ne { value: json!(1) })));
    }

    #[test]
    fn test_in_and_contains() {
        let item = json!({"string": "hello world", "tags": ["a", "b"]});
        assert!(ConditionEval::matches(
            &item,
            &cond("string", ConditionOp::In { values: vec![json!("x"), json!("hello world")] })
        ));
        assert!(ConditionEval::matches(&item, &cond("string", ConditionOp::Contains { value: json!("o w") })));
        assert!(ConditionEval::matches(&item, &cond("tags", ConditionOp::Contains { value: json!("b") })));
        assert!(!ConditionEval::matches(&item, &cond("tags", ConditionOp::Contains { value: json!("c") })));
    }

    #[test]
    fn test_begins_with() {
        let item = json!({"string": "item-7"});
        assert!(ConditionEval::matches(&item, &cond("string", ConditionOp::BeginsWith { prefix: json!("item-") })));
        assert!(!ConditionEval::matches(&item, &cond("string", ConditionOp::BeginsWith { prefix: json!("7") })));
        assert!(!ConditionEval::matches(&json!({"string": 7}), &cond("string", ConditionOp::BeginsWith { prefix: json!("7") })));
    }
}
