//! Cursor errors

use thiserror::Error;

/// Result type for cursor decoding
pub type CursorResult<T> = Result<T, CursorError>;

/// Cursor errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Token is not a cursor produced by this crate
    #[error("Invalid cursor token: {0}")]
    InvalidToken(String),
}

impl CursorError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CursorError::InvalidToken(_) => "DYNAQ_INVALID_CURSOR",
        }
    }
}
