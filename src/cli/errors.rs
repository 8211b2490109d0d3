//! CLI-specific error types
//!
//! Library errors keep their own code when they reach the CLI.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::cursor::CursorError;
use crate::model::ModelError;
use crate::queryset::QuerySetError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// I/O error (files, stdout)
    IoError,
    /// Fixture file is malformed
    FixtureError,
    /// Flag value could not be parsed
    InvalidArgument,
    /// Error raised by the library, with its code
    Library(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::IoError => "DYNAQ_CLI_IO_ERROR",
            Self::FixtureError => "DYNAQ_CLI_FIXTURE_ERROR",
            Self::InvalidArgument => "DYNAQ_CLI_INVALID_ARGUMENT",
            Self::Library(code) => *code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn fixture_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::FixtureError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

macro_rules! from_library_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for CliError {
                fn from(e: $error) -> Self {
                    Self::new(CliErrorCode::Library(e.code()), e.to_string())
                }
            }
        )*
    };
}

from_library_error!(ConfigError, CursorError, ModelError, QuerySetError, StoreError);

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_code_preserved() {
        let err: CliError = QuerySetError::HashKeyRequired.into();
        assert_eq!(err.code_str(), "DYNAQ_HASH_KEY_REQUIRED");
        assert_eq!(err.message(), "Hash key must be set");
        assert_eq!(err.to_string(), "DYNAQ_HASH_KEY_REQUIRED: Hash key must be set");
    }

    #[test]
    fn test_cli_codes() {
        assert_eq!(CliError::fixture_error("x").code_str(), "DYNAQ_CLI_FIXTURE_ERROR");
        assert_eq!(CliError::invalid_argument("x").code_str(), "DYNAQ_CLI_INVALID_ARGUMENT");
    }
}
