//! Database configuration
//!
//! Settings a deployment supplies once: how logical table names map to
//! physical tables, the defaults applied to registered models, and the
//! log threshold. Loaded from a JSON file; every field has a default.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Placeholder replaced by the physical table name in tag templates
pub const TABLE_NAME_PLACEHOLDER: &str = "{table_name}";

/// Capacity billing mode applied to tables without an explicit setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingMode {
    Provisioned,
    PayPerRequest,
}

impl BillingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingMode::Provisioned => "PROVISIONED",
            BillingMode::PayPerRequest => "PAY_PER_REQUEST",
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Prefix joined to every logical table name (default: "dynaquery")
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,

    /// Store region
    #[serde(default)]
    pub region: Option<String>,

    /// Store endpoint override
    #[serde(default)]
    pub host: Option<String>,

    /// Billing mode for models that do not set one
    #[serde(default)]
    pub billing_mode: Option<BillingMode>,

    /// Whether new tables enable point-in-time recovery
    #[serde(default)]
    pub point_in_time_recovery: bool,

    /// Tags applied to new tables; values may contain `{table_name}`
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Prefix for isolated test tables
    #[serde(default)]
    pub test_prefix: Option<String>,

    /// Minimum log severity (default: INFO)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_table_prefix() -> String {
    "dynaquery".to_string()
}

fn default_log_level() -> Severity {
    Severity::Info
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            table_prefix: default_table_prefix(),
            region: None,
            host: None,
            billing_mode: None,
            point_in_time_recovery: false,
            tags: BTreeMap::new(),
            test_prefix: None,
            log_level: default_log_level(),
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&content)?;
        log_event_with_fields(Event::ConfigLoaded, &[("path", path.display().to_string().as_str())]);
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce unusable table names
    pub fn validate(&self) -> ConfigResult<()> {
        if self.table_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("table_prefix must not be empty".into()));
        }
        if self.table_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "table_prefix \"{}\" contains whitespace",
                self.table_prefix
            )));
        }
        Ok(())
    }

    /// Physical table name for a logical model table
    pub fn table_name(&self, logical: &str) -> String {
        format!("{}-{}", self.table_prefix, logical)
    }

    /// Physical name of the isolated test copy of a table
    pub fn test_table_name(&self, logical: &str) -> String {
        let physical = self.table_name(logical);
        match &self.test_prefix {
            Some(prefix) => format!("test_{}_{}", prefix, physical),
            None => format!("test_{}", physical),
        }
    }

    /// Resolve tag templates for a physical table
    pub fn render_tags(&self, physical_table: &str) -> BTreeMap<String, String> {
        self.tags
            .iter()
            .map(|(k, v)| (k.clone(), v.replace(TABLE_NAME_PLACEHOLDER, physical_table)))
            .collect()
    }

    /// Apply the configured log threshold process-wide
    pub fn apply_logging(&self) {
        Logger::set_min_severity(self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DatabaseConfig::default();
        assert_eq!(config.table_prefix, "dynaquery");
        assert_eq!(config.log_level, Severity::Info);
        assert!(config.billing_mode.is_none());
    }

    #[test]
    fn test_table_names() {
        let config = DatabaseConfig {
            table_prefix: "prod".into(),
            ..Default::default()
        };
        assert_eq!(config.table_name("items"), "prod-items");
        assert_eq!(config.test_table_name("items"), "test_prod-items");

        let config = DatabaseConfig {
            test_prefix: Some("ci".into()),
            ..config
        };
        assert_eq!(config.test_table_name("items"), "test_ci_prod-items");
    }

    #[test]
    fn test_tags_rendered() {
        let mut config = DatabaseConfig::default();
        config.tags.insert("Name".into(), "{table_name}".into());
        config.tags.insert("Team".into(), "search".into());

        let tags = config.render_tags("dynaquery-items");
        assert_eq!(tags["Name"], "dynaquery-items");
        assert_eq!(tags["Team"], "search");
    }

    #[test]
    fn test_parse_json() {
        let config = DatabaseConfig::from_json_str(
            r#"{"table_prefix": "dev", "billing_mode": "PAY_PER_REQUEST", "log_level": "WARN"}"#,
        )
        .unwrap();
        assert_eq!(config.table_prefix, "dev");
        assert_eq!(config.billing_mode, Some(BillingMode::PayPerRequest));
        assert_eq!(config.log_level, Severity::Warn);
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let err = DatabaseConfig::from_json_str(r#"{"table_prefix": ""}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = DatabaseConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
