//! dynaquery - lazy, immutable querysets over hash/range key-value tables
//!
//! Builds store-native range queries from field lookups, threads
//! pagination cursors, memoizes execution per queryset and exposes the
//! whole queryset API on model managers.

pub mod cli;
pub mod config;
pub mod cursor;
pub mod manager;
pub mod model;
pub mod observability;
pub mod predicate;
pub mod queryset;
pub mod store;

/// Traits and types most callers need
pub mod prelude {
    pub use crate::cursor::Cursor;
    pub use crate::manager::{DefaultManager, Manager, ManagerMethods, QuerySetMethods};
    pub use crate::model::{AttributeDef, AttributeKind, Document, IndexSchema, ModelSchema};
    pub use crate::predicate::Lookup;
    pub use crate::queryset::{QueryResult, QuerySet, QuerySetError};
    pub use crate::store::{QueryContext, SecondaryIndex, Table};
}
