//! Model descriptions for dynaquery
//!
//! A model is any cloneable, thread-safe item type. What the queryset layer
//! knows about it lives in a `ModelSchema`, carried at runtime by the
//! model's `Table` handle rather than discovered from the type.

mod errors;
mod options;
mod registry;
mod schema;

pub use errors::{ModelError, ModelResult};
pub use options::ModelOptions;
pub use registry::{ModelRegistry, RegisteredModel};
pub use schema::{AttributeDef, AttributeKind, IndexSchema, ModelSchema};

/// Item type a queryset yields
pub trait Model: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Model for T {}

/// Untyped model item: a JSON object of attributes
pub type Document = serde_json::Map<String, serde_json::Value>;
