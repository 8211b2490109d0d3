//! Configuration errors

use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Config file error: {0}")]
    Io(String),

    /// Config file is not valid JSON for this structure
    #[error("Config parse error: {0}")]
    Parse(String),

    /// Config parsed but holds an unusable value
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "DYNAQ_CONFIG_IO",
            ConfigError::Parse(_) => "DYNAQ_CONFIG_PARSE",
            ConfigError::Invalid(_) => "DYNAQ_CONFIG_INVALID",
        }
    }
}
