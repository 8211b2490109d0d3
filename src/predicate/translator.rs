//! Field lookup translation
//!
//! Turns `("number__gt", 4)` into `Condition { attribute: "number", op: Gt }`.
//! Translation is pure: it never touches the store and never inspects
//! the model beyond the attribute name it is handed.

use std::cmp::Ordering;

use serde_json::Value;

use super::ast::{Condition, ConditionOp, Lookup, LOOKUP_SEPARATOR};
use super::compare;
use super::errors::{PredicateError, PredicateResult};

/// A field lookup split into its attribute name and raw operator token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLookup<'a> {
    /// Attribute name
    pub field: &'a str,
    /// Operator token, `None` when the lookup had no suffix
    pub operator: Option<&'a str>,
}

impl FieldLookup<'_> {
    /// Parse the operator token; no suffix means equality
    pub fn lookup(&self) -> PredicateResult<Lookup> {
        match self.operator {
            Some(token) => token.parse(),
            None => Ok(Lookup::Eq),
        }
    }
}

/// Stateless lookup parser and condition builder
pub struct Translator;

impl Translator {
    /// Split a lookup on its last separator
    ///
    /// `"number"` is `(number, None)`, `"number__gte"` is `(number, "gte")`.
    /// The operator is left unparsed so the field can be resolved first.
    pub fn parse_lookup(lookup: &str) -> FieldLookup<'_> {
        match lookup.rsplit_once(LOOKUP_SEPARATOR) {
            Some((field, token)) => FieldLookup {
                field,
                operator: Some(token),
            },
            None => FieldLookup {
                field: lookup,
                operator: None,
            },
        }
    }

    /// Build the store condition for an attribute, operator and value
    pub fn translate(attribute: &str, lookup: Lookup, value: Value) -> PredicateResult<Condition> {
        let op = match lookup {
            Lookup::Eq => ConditionOp::Eq { value },
            Lookup::Not => ConditionOp::Ne { value },
            Lookup::Lt => ConditionOp::Lt { value },
            Lookup::Lte => ConditionOp::Le { value },
            Lookup::Gt => ConditionOp::Gt { value },
            Lookup::Gte => ConditionOp::Ge { value },
            Lookup::Between => {
                let (low, high) = Self::range_bounds(value)?;
                ConditionOp::Between { low, high }
            }
            Lookup::In => match value {
                Value::Array(values) => ConditionOp::In { values },
                other => return Err(invalid(lookup, format!("expected an array, got {}", other))),
            },
            Lookup::Exists => match value {
                Value::Bool(true) => ConditionOp::Exists,
                Value::Bool(false) => ConditionOp::NotExists,
                other => return Err(invalid(lookup, format!("expected a boolean, got {}", other))),
            },
            Lookup::StartsWith => ConditionOp::BeginsWith { prefix: value },
            Lookup::Contains => ConditionOp::Contains { value },
        };
        Ok(Condition::new(attribute, op))
    }

    /// Returns true if the condition is a range that can never match
    ///
    /// Only `between` with `low > high` qualifies. Bounds of different
    /// kinds are left for the store to judge.
    pub fn is_empty_range(condition: &Condition) -> bool {
        match &condition.op {
            ConditionOp::Between { low, high } => {
                compare::partial_cmp(low, high) == Some(Ordering::Greater)
            }
            _ => false,
        }
    }

    fn range_bounds(value: Value) -> PredicateResult<(Value, Value)> {
        match value {
            Value::Array(bounds) if bounds.len() == 2 => {
                let mut bounds = bounds.into_iter();
                match (bounds.next(), bounds.next()) {
                    (Some(low), Some(high)) => Ok((low, high)),
                    _ => Err(invalid(Lookup::Between, "expected [low, high]".to_string())),
                }
            }
            other => Err(invalid(
                Lookup::Between,
                format!("expected [low, high], got {}", other),
            )),
        }
    }
}

fn invalid(lookup: Lookup, reason: String) -> PredicateError {
    PredicateError::InvalidValue {
        operator: lookup.as_str(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_without_separator_is_equality() {
        let parsed = Translator::parse_lookup("number");
        assert_eq!(parsed.field, "number");
        assert_eq!(parsed.operator, None);
        assert_eq!(parsed.lookup().unwrap(), Lookup::Eq);
    }

    #[test]
    fn test_parse_splits_on_last_separator() {
        let parsed = Translator::parse_lookup("number__gte");
        assert_eq!(parsed.field, "number");
        assert_eq!(parsed.lookup().unwrap(), Lookup::Gte);

        let parsed = Translator::parse_lookup("created__by__startswith");
        assert_eq!(parsed.field, "created__by");
        assert_eq!(parsed.lookup().unwrap(), Lookup::StartsWith);
    }

    #[test]
    fn test_unknown_operator_fails_only_when_parsed() {
        let parsed = Translator::parse_lookup("number__near");
        assert_eq!(parsed.field, "number");
        assert_eq!(parsed.operator, Some("near"));
        assert_eq!(
            parsed.lookup().unwrap_err(),
            PredicateError::InvalidOperator("near".into())
        );
    }

    #[test]
    fn test_comparison_operators() {
        let cases = [
            (Lookup::Eq, ConditionOp::Eq { value: json!(5) }),
            (Lookup::Not, ConditionOp::Ne { value: json!(5) }),
            (Lookup::Lt, ConditionOp::Lt { value: json!(5) }),
            (Lookup::Lte, ConditionOp::Le { value: json!(5) }),
            (Lookup::Gt, ConditionOp::Gt { value: json!(5) }),
            (Lookup::Gte, ConditionOp::Ge { value: json!(5) }),
            (Lookup::StartsWith, ConditionOp::BeginsWith { prefix: json!(5) }),
            (Lookup::Contains, ConditionOp::Contains { value: json!(5) }),
        ];
        for (lookup, expected) in cases {
            let cond = Translator::translate("number", lookup, json!(5)).unwrap();
            assert_eq!(cond.attribute, "number");
            assert_eq!(cond.op, expected);
        }
    }

    #[test]
    fn test_between_requires_pair() {
        let cond = Translator::translate("number", Lookup::Between, json!([2, 4])).unwrap();
        assert_eq!(
            cond.op,
            ConditionOp::Between {
                low: json!(2),
                high: json!(4)
            }
        );

        assert!(Translator::translate("number", Lookup::Between, json!([2])).is_err());
        assert!(Translator::translate("number", Lookup::Between, json!(2)).is_err());
    }

    #[test]
    fn test_in_requires_array() {
        let cond = Translator::translate("string", Lookup::In, json!(["a", "b"])).unwrap();
        assert_eq!(
            cond.op,
            ConditionOp::In {
                values: vec![json!("a"), json!("b")]
            }
        );
        assert!(Translator::translate("string", Lookup::In, json!("a")).is_err());
    }

    #[test]
    fn test_exists_by_flag() {
        let cond = Translator::translate("string", Lookup::Exists, json!(true)).unwrap();
        assert_eq!(cond.op, ConditionOp::Exists);
        let cond = Translator::translate("string", Lookup::Exists, json!(false)).unwrap();
        assert_eq!(cond.op, ConditionOp::NotExists);
        assert!(Translator::translate("string", Lookup::Exists, json!(1)).is_err());
    }

    #[test]
    fn test_empty_range_detection() {
        let inverted = Condition::between("number", json!(4), json!(2));
        assert!(Translator::is_empty_range(&inverted));

        let ordered = Condition::between("number", json!(2), json!(4));
        assert!(!Translator::is_empty_range(&ordered));

        let single = Condition::between("number", json!(3), json!(3));
        assert!(!Translator::is_empty_range(&single));

        let mixed = Condition::between("number", json!("b"), json!(1));
        assert!(!Translator::is_empty_range(&mixed));
    }
}
