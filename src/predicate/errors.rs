//! # Predicate Errors
//!
//! Error types raised while translating a field lookup into a condition.

use thiserror::Error;

/// Result type for predicate translation
pub type PredicateResult<T> = Result<T, PredicateError>;

/// Predicate translation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// Lookup references an attribute the model does not declare
    #[error("Field \"{0}\" does not exist")]
    FieldDoesNotExist(String),

    /// Lookup suffix is not a known operator
    #[error("Invalid operator \"{0}\"")]
    InvalidOperator(String),

    /// Value has the wrong shape for the operator
    #[error("Invalid value for \"{operator}\": {reason}")]
    InvalidValue {
        operator: &'static str,
        reason: String,
    },
}

impl PredicateError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PredicateError::FieldDoesNotExist(_) => "DYNAQ_FIELD_DOES_NOT_EXIST",
            PredicateError::InvalidOperator(_) => "DYNAQ_INVALID_OPERATOR",
            PredicateError::InvalidValue { .. } => "DYNAQ_INVALID_VALUE",
        }
    }
}
