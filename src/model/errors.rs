//! # Model Errors
//!
//! Error types for schema validation and model registration.

use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Model errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Schema is internally inconsistent
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A concrete model already owns this table
    #[error("Model for table \"{0}\" is already registered")]
    AlreadyRegistered(String),

    /// No registered model owns this table
    #[error("No model registered for table \"{0}\"")]
    NotRegistered(String),
}

impl ModelError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidSchema(_) => "DYNAQ_INVALID_SCHEMA",
            ModelError::AlreadyRegistered(_) => "DYNAQ_MODEL_ALREADY_REGISTERED",
            ModelError::NotRegistered(_) => "DYNAQ_MODEL_NOT_REGISTERED",
        }
    }
}
