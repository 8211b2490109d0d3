//! Store-native condition structures
//!
//! A `Condition` is what the store evaluates server-side: one attribute,
//! one comparison. Conditions are produced by the translator and never
//! combined by the queryset layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::PredicateError;

/// Lookup separator between a field name and its operator (`number__gt`)
pub const LOOKUP_SEPARATOR: &str = "__";

/// Operator token parsed from a field lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lookup {
    /// `field` or `field__eq`
    Eq,
    /// `field__not`
    Not,
    /// `field__lt`
    Lt,
    /// `field__lte`
    Lte,
    /// `field__gt`
    Gt,
    /// `field__gte`
    Gte,
    /// `field__between`, inclusive on both ends
    Between,
    /// `field__in`
    In,
    /// `field__exists`, with a boolean value
    Exists,
    /// `field__startswith`
    StartsWith,
    /// `field__contains`
    Contains,
}

impl Lookup {
    /// Returns the lookup token as written in a field lookup
    pub fn as_str(&self) -> &'static str {
        match self {
            Lookup::Eq => "eq",
            Lookup::Not => "not",
            Lookup::Lt => "lt",
            Lookup::Lte => "lte",
            Lookup::Gt => "gt",
            Lookup::Gte => "gte",
            Lookup::Between => "between",
            Lookup::In => "in",
            Lookup::Exists => "exists",
            Lookup::StartsWith => "startswith",
            Lookup::Contains => "contains",
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookup {
    type Err = PredicateError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "eq" => Ok(Lookup::Eq),
            "not" => Ok(Lookup::Not),
            "lt" => Ok(Lookup::Lt),
            "lte" => Ok(Lookup::Lte),
            "gt" => Ok(Lookup::Gt),
            "gte" => Ok(Lookup::Gte),
            "between" => Ok(Lookup::Between),
            "in" => Ok(Lookup::In),
            "exists" => Ok(Lookup::Exists),
            "startswith" => Ok(Lookup::StartsWith),
            "contains" => Ok(Lookup::Contains),
            other => Err(PredicateError::InvalidOperator(other.to_string())),
        }
    }
}

/// Comparison evaluated by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ConditionOp {
    /// attribute = value
    Eq { value: Value },
    /// attribute <> value
    Ne { value: Value },
    /// attribute < value
    Lt { value: Value },
    /// attribute <= value
    Le { value: Value },
    /// attribute > value
    Gt { value: Value },
    /// attribute >= value
    Ge { value: Value },
    /// low <= attribute <= high
    Between { low: Value, high: Value },
    /// attribute is one of values
    In { values: Vec<Value> },
    /// attribute is present
    Exists,
    /// attribute is absent
    NotExists,
    /// attribute begins with prefix
    BeginsWith { prefix: Value },
    /// attribute contains value (substring or element)
    Contains { value: Value },
}

impl ConditionOp {
    /// Returns the operation name for log output
    pub fn op_name(&self) -> &'static str {
        match self {
            ConditionOp::Eq { .. } => "eq",
            ConditionOp::Ne { .. } => "ne",
            ConditionOp::Lt { .. } => "lt",
            ConditionOp::Le { .. } => "le",
            ConditionOp::Gt { .. } => "gt",
            ConditionOp::Ge { .. } => "ge",
            ConditionOp::Between { .. } => "between",
            ConditionOp::In { .. } => "in",
            ConditionOp::Exists => "exists",
            ConditionOp::NotExists => "not_exists",
            ConditionOp::BeginsWith { .. } => "begins_with",
            ConditionOp::Contains { .. } => "contains",
        }
    }
}

/// A single store-native condition (attribute + operation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Attribute name the condition applies to
    pub attribute: String,
    /// Comparison
    #[serde(flatten)]
    pub op: ConditionOp,
}

impl Condition {
    /// Create a condition from an attribute and an operation
    pub fn new(attribute: impl Into<String>, op: ConditionOp) -> Self {
        Self {
            attribute: attribute.into(),
            op,
        }
    }

    /// Create an equality condition
    pub fn eq(attribute: impl Into<String>, value: Value) -> Self {
        Self::new(attribute, ConditionOp::Eq { value })
    }

    /// Create an inclusive range condition
    pub fn between(attribute: impl Into<String>, low: Value, high: Value) -> Self {
        Self::new(attribute, ConditionOp::Between { low, high })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.op.op_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_tokens_parse() {
        for lookup in [
            Lookup::Eq,
            Lookup::Not,
            Lookup::Lt,
            Lookup::Lte,
            Lookup::Gt,
            Lookup::Gte,
            Lookup::Between,
            Lookup::In,
            Lookup::Exists,
            Lookup::StartsWith,
            Lookup::Contains,
        ] {
            assert_eq!(lookup.as_str().parse::<Lookup>().unwrap(), lookup);
        }
    }

    #[test]
    fn test_unknown_lookup_rejected() {
        let err = "icontains".parse::<Lookup>().unwrap_err();
        assert!(matches!(err, PredicateError::InvalidOperator(ref op) if op == "icontains"));
    }

    #[test]
    fn test_condition_serializes_flat() {
        let cond = Condition::eq("number", json!(5));
        let value = serde_json::to_value(&cond).unwrap();
        assert_eq!(value, json!({"attribute": "number", "op": "eq", "value": 5}));
    }
}
