//! # Store Errors
//!
//! Failures reported by, or on the way to, the store collaborator. The
//! queryset layer never retries these; it propagates them unchanged.

use thiserror::Error;

/// Result type for store calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// The request deadline passed
    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    /// The store rejected the request as malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// An item could not be converted to or from attributes
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Cancelled => "DYNAQ_STORE_CANCELLED",
            StoreError::DeadlineExceeded => "DYNAQ_STORE_DEADLINE_EXCEEDED",
            StoreError::InvalidRequest(_) => "DYNAQ_STORE_INVALID_REQUEST",
            StoreError::Unavailable(_) => "DYNAQ_STORE_UNAVAILABLE",
            StoreError::Serialization(_) => "DYNAQ_STORE_SERIALIZATION",
            StoreError::Backend(_) => "DYNAQ_STORE_BACKEND",
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
