//! Model schema structures
//!
//! Describes what the queryset layer needs to know about a model: its
//! table, key attributes, declared attributes and secondary indexes.
//! Attribute kinds are descriptive only; marshaling belongs to the store.

use serde::{Deserialize, Serialize};

use super::errors::{ModelError, ModelResult};

/// Declared attribute kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    Number,
    Boolean,
    DateTime,
    Map,
    List,
    #[default]
    Any,
}

/// A declared model attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name as stored
    pub name: String,
    /// Declared kind
    #[serde(default)]
    pub kind: AttributeKind,
    /// Whether the attribute may be absent
    #[serde(default)]
    pub nullable: bool,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
        }
    }

    /// Marks the attribute as optional
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Alternate hash/sort key pairing over the same items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Index name
    pub name: String,
    /// Partition attribute of the index
    pub hash_key: String,
    /// Sort attribute of the index
    #[serde(default)]
    pub range_key: Option<String>,
}

impl IndexSchema {
    pub fn new(name: impl Into<String>, hash_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash_key: hash_key.into(),
            range_key: None,
        }
    }

    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }
}

/// Table-level description of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Logical table name (before any configured prefix)
    pub table_name: String,
    /// Partition attribute
    pub hash_key: String,
    /// Sort attribute
    #[serde(default)]
    pub range_key: Option<String>,
    /// Non-key attributes (key attributes may be repeated here)
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    /// Secondary indexes
    #[serde(default)]
    pub indexes: Vec<IndexSchema>,
}

impl ModelSchema {
    /// Creates a schema with a hash key only
    pub fn new(table_name: impl Into<String>, hash_key: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            hash_key: hash_key.into(),
            range_key: None,
            attributes: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Sets the sort attribute
    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    /// Declares an attribute
    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Declares a secondary index
    pub fn with_index(mut self, index: IndexSchema) -> Self {
        self.indexes.push(index);
        self
    }

    /// Returns true if `name` is a key or declared attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.hash_key == name
            || self.range_key.as_deref() == Some(name)
            || self.attributes.iter().any(|a| a.name == name)
    }

    /// Returns the declared attribute, synthesizing one for undeclared keys
    pub fn attribute(&self, name: &str) -> Option<AttributeDef> {
        if let Some(attr) = self.attributes.iter().find(|a| a.name == name) {
            return Some(attr.clone());
        }
        if self.hash_key == name || self.range_key.as_deref() == Some(name) {
            return Some(AttributeDef::new(name, AttributeKind::Any));
        }
        None
    }

    /// Returns the index with the given name
    pub fn index(&self, name: &str) -> Option<&IndexSchema> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Table key attribute names, hash key first
    pub fn primary_key_attributes(&self) -> Vec<&str> {
        let mut keys = vec![self.hash_key.as_str()];
        if let Some(range_key) = &self.range_key {
            keys.push(range_key);
        }
        keys
    }

    /// Checks that every key and index attribute is known
    pub fn validate(&self) -> ModelResult<()> {
        if self.table_name.trim().is_empty() {
            return Err(ModelError::InvalidSchema("table name is empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for attr in &self.attributes {
            if !seen.insert(attr.name.as_str()) {
                return Err(ModelError::InvalidSchema(format!(
                    "attribute \"{}\" declared twice",
                    attr.name
                )));
            }
        }
        let mut index_names = std::collections::HashSet::new();
        for index in &self.indexes {
            if !index_names.insert(index.name.as_str()) {
                return Err(ModelError::InvalidSchema(format!(
                    "index \"{}\" declared twice",
                    index.name
                )));
            }
            let keys = std::iter::once(&index.hash_key).chain(index.range_key.iter());
            for key in keys {
                if !self.has_attribute(key) {
                    return Err(ModelError::InvalidSchema(format!(
                        "index \"{}\" uses undeclared attribute \"{}\"",
                        index.name, key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ModelSchema {
        ModelSchema::new("items", "id")
            .with_range_key("date")
            .with_attribute(AttributeDef::new("string", AttributeKind::String).nullable())
            .with_attribute(AttributeDef::new("number", AttributeKind::Number))
            .with_index(IndexSchema::new("string_number_index", "string").with_range_key("number"))
    }

    #[test]
    fn test_key_attributes_resolve_without_declaration() {
        let schema = schema();
        assert!(schema.has_attribute("id"));
        assert!(schema.has_attribute("date"));
        assert_eq!(schema.attribute("id").unwrap().kind, AttributeKind::Any);
        assert!(schema.attribute("missing").is_none());
    }

    #[test]
    fn test_declared_attribute_kept() {
        let attr = schema().attribute("string").unwrap();
        assert_eq!(attr.kind, AttributeKind::String);
        assert!(attr.nullable);
    }

    #[test]
    fn test_primary_key_order() {
        assert_eq!(schema().primary_key_attributes(), vec!["id", "date"]);
    }

    #[test]
    fn test_validate_rejects_unknown_index_key() {
        let bad = ModelSchema::new("items", "id")
            .with_index(IndexSchema::new("by_owner", "owner"));
        assert!(matches!(bad.validate(), Err(ModelError::InvalidSchema(_))));
        assert!(schema().validate().is_ok());
    }

    #[test]
    fn test_schema_deserializes_with_defaults() {
        let schema: ModelSchema =
            serde_json::from_str(r#"{"table_name": "t", "hash_key": "pk"}"#).unwrap();
        assert_eq!(schema.range_key, None);
        assert!(schema.attributes.is_empty());
    }
}
