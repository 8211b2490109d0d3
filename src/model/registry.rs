//! Explicit model registration
//!
//! Concrete models are registered once at startup. Registration validates
//! the schema, resolves the physical table name and applies configured
//! defaults. Abstract and proxy models are accepted but not recorded.

use std::collections::BTreeMap;

use crate::config::DatabaseConfig;
use crate::observability::{log_event_with_fields, Event};

use super::errors::{ModelError, ModelResult};
use super::options::ModelOptions;
use super::schema::ModelSchema;

/// A model recorded by the registry
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredModel {
    pub schema: ModelSchema,
    /// Options with configured defaults applied
    pub options: ModelOptions,
    /// Table name after the configured prefix
    pub physical_table: String,
    /// Tags with `{table_name}` resolved
    pub tags: BTreeMap<String, String>,
}

/// Registry of concrete models keyed by logical table name
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    config: DatabaseConfig,
    models: BTreeMap<String, RegisteredModel>,
}

impl ModelRegistry {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            models: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Register a model
    ///
    /// Returns `Ok(false)` for abstract and proxy models, which are skipped.
    pub fn register(&mut self, schema: ModelSchema, options: ModelOptions) -> ModelResult<bool> {
        schema.validate()?;

        if !options.is_concrete() {
            return Ok(false);
        }
        if self.models.contains_key(&schema.table_name) {
            return Err(ModelError::AlreadyRegistered(schema.table_name.clone()));
        }

        let mut options = options;
        if options.billing_mode.is_none() {
            options.billing_mode = self.config.billing_mode;
        }

        let physical_table = self.config.table_name(&schema.table_name);
        let tags = self.config.render_tags(&physical_table);

        log_event_with_fields(
            Event::ModelRegistered,
            &[("table", schema.table_name.as_str()), ("physical_table", physical_table.as_str())],
        );

        self.models.insert(
            schema.table_name.clone(),
            RegisteredModel {
                schema,
                options,
                physical_table,
                tags,
            },
        );
        Ok(true)
    }

    /// Returns the model registered for a logical table name
    pub fn get(&self, table_name: &str) -> ModelResult<&RegisteredModel> {
        self.models
            .get(table_name)
            .ok_or_else(|| ModelError::NotRegistered(table_name.to_string()))
    }

    /// Registered models in table-name order
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredModel> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BillingMode;

    fn config() -> DatabaseConfig {
        let mut config = DatabaseConfig {
            table_prefix: "test".into(),
            billing_mode: Some(BillingMode::PayPerRequest),
            ..Default::default()
        };
        config.tags.insert("table".into(), "{table_name}".into());
        config
    }

    #[test]
    fn test_register_concrete_model() {
        let mut registry = ModelRegistry::new(config());
        let registered = registry
            .register(ModelSchema::new("items", "id"), ModelOptions::new())
            .unwrap();
        assert!(registered);

        let model = registry.get("items").unwrap();
        assert_eq!(model.physical_table, "test-items");
        assert_eq!(model.options.billing_mode, Some(BillingMode::PayPerRequest));
        assert_eq!(model.tags["table"], "test-items");
    }

    #[test]
    fn test_explicit_billing_mode_kept() {
        let mut registry = ModelRegistry::new(config());
        registry
            .register(
                ModelSchema::new("items", "id"),
                ModelOptions::new().with_billing_mode(BillingMode::Provisioned),
            )
            .unwrap();
        assert_eq!(
            registry.get("items").unwrap().options.billing_mode,
            Some(BillingMode::Provisioned)
        );
    }

    #[test]
    fn test_abstract_and_proxy_skipped() {
        let mut registry = ModelRegistry::new(config());
        assert!(!registry
            .register(ModelSchema::new("base", "id"), ModelOptions::abstract_base())
            .unwrap());
        assert!(!registry
            .register(ModelSchema::new("items", "id"), ModelOptions::proxy())
            .unwrap());
        assert!(registry.is_empty());
        assert!(matches!(registry.get("base"), Err(ModelError::NotRegistered(_))));
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let mut registry = ModelRegistry::new(config());
        registry
            .register(ModelSchema::new("items", "id"), ModelOptions::new())
            .unwrap();
        let err = registry
            .register(ModelSchema::new("items", "pk"), ModelOptions::new())
            .unwrap_err();
        assert_eq!(err, ModelError::AlreadyRegistered("items".into()));
        assert_eq!(registry.len(), 1);
    }
}
