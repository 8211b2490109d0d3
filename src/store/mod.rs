//! Store boundary
//!
//! The querying layer talks to the key-value store only through the
//! traits in this module:
//!
//! - [`QueryEndpoint`]: range query and count, implemented by a table and
//!   by each of its secondary indexes
//! - [`BatchWriter`]: batch delete, implemented by a table
//!
//! A backend implements [`TableBackend`] once; [`Table`] and
//! [`SecondaryIndex`] are the handles that bind it to one query target.
//! Every call carries a [`QueryContext`].

mod context;
mod errors;
pub mod memory;

pub use context::{CancelToken, QueryContext};
pub use errors::{StoreError, StoreResult};

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::cursor::Cursor;
use crate::model::{IndexSchema, ModelSchema};
use crate::observability::MetricsRegistry;
use crate::predicate::Condition;

/// Largest batch a batch-delete call accepts unless the backend says otherwise
pub const DEFAULT_MAX_BATCH_SIZE: usize = 25;

/// Parameters of one range query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Partition to read
    pub hash_key: Value,
    /// Optional condition on the range key or any other attribute
    pub condition: Option<Condition>,
    /// Maximum number of items to return
    pub limit: Option<usize>,
    /// Resume strictly after this position
    pub cursor: Option<Cursor>,
    /// Ascending range-key order when true
    pub scan_forward: bool,
}

impl QueryRequest {
    pub fn new(hash_key: Value) -> Self {
        Self {
            hash_key,
            condition: None,
            limit: None,
            cursor: None,
            scan_forward: true,
        }
    }
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct QueryPage<M> {
    pub items: Vec<M>,
    /// Present only when another page may follow
    pub next_cursor: Option<Cursor>,
}

impl<M> QueryPage<M> {
    pub fn new(items: Vec<M>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }
}

/// Result of one batch delete call
#[derive(Debug, Clone)]
pub struct BatchDeleteOutcome<M> {
    /// Items the store confirmed deleted
    pub deleted: usize,
    /// Items the store did not process
    pub unprocessed: Vec<M>,
}

/// Which key schema a query runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    Table,
    Index(String),
}

/// Operations a store backend offers for one table and its indexes
pub trait TableBackend<M>: Send + Sync {
    fn query(
        &self,
        ctx: &QueryContext,
        target: &QueryTarget,
        request: &QueryRequest,
    ) -> StoreResult<QueryPage<M>>;

    fn count(
        &self,
        ctx: &QueryContext,
        target: &QueryTarget,
        hash_key: &Value,
        condition: Option<&Condition>,
    ) -> StoreResult<u64>;

    fn batch_delete(&self, ctx: &QueryContext, items: &[M]) -> StoreResult<BatchDeleteOutcome<M>>;

    fn max_batch_size(&self) -> usize {
        DEFAULT_MAX_BATCH_SIZE
    }
}

/// Range query and count over one table or index
pub trait QueryEndpoint<M>: Send + Sync {
    fn query(&self, ctx: &QueryContext, request: &QueryRequest) -> StoreResult<QueryPage<M>>;

    fn count(
        &self,
        ctx: &QueryContext,
        hash_key: &Value,
        condition: Option<&Condition>,
    ) -> StoreResult<u64>;

    /// Name used in log fields
    fn endpoint_name(&self) -> String;
}

/// Batch delete over one table
pub trait BatchWriter<M>: Send + Sync {
    fn batch_delete(&self, ctx: &QueryContext, items: &[M]) -> StoreResult<BatchDeleteOutcome<M>>;

    fn max_batch_size(&self) -> usize;
}

/// Handle binding a model type to its table
pub struct Table<M> {
    schema: Arc<ModelSchema>,
    backend: Arc<dyn TableBackend<M>>,
    metrics: Arc<MetricsRegistry>,
}

impl<M> Table<M> {
    /// Handle with its own counters; handles built from it share them
    pub fn new(schema: ModelSchema, backend: Arc<dyn TableBackend<M>>) -> Self {
        Self::with_metrics(schema, backend, Arc::new(MetricsRegistry::new()))
    }

    /// Handle reporting into an existing registry
    pub fn with_metrics(
        schema: ModelSchema,
        backend: Arc<dyn TableBackend<M>>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            schema: Arc::new(schema),
            backend,
            metrics,
        }
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.schema.table_name
    }

    /// Counters shared by every queryset built on this table
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Returns a handle for a declared secondary index
    pub fn index(&self, name: &str) -> Option<SecondaryIndex<M>> {
        let index = self.schema.index(name)?.clone();
        Some(SecondaryIndex {
            table: self.clone(),
            index: Arc::new(index),
        })
    }
}

impl<M> Clone for Table<M> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            backend: Arc::clone(&self.backend),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<M> fmt::Debug for Table<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("table_name", &self.schema.table_name)
            .finish_non_exhaustive()
    }
}

impl<M> QueryEndpoint<M> for Table<M> {
    fn query(&self, ctx: &QueryContext, request: &QueryRequest) -> StoreResult<QueryPage<M>> {
        self.backend.query(ctx, &QueryTarget::Table, request)
    }

    fn count(
        &self,
        ctx: &QueryContext,
        hash_key: &Value,
        condition: Option<&Condition>,
    ) -> StoreResult<u64> {
        self.backend.count(ctx, &QueryTarget::Table, hash_key, condition)
    }

    fn endpoint_name(&self) -> String {
        self.schema.table_name.clone()
    }
}

impl<M> BatchWriter<M> for Table<M> {
    fn batch_delete(&self, ctx: &QueryContext, items: &[M]) -> StoreResult<BatchDeleteOutcome<M>> {
        self.backend.batch_delete(ctx, items)
    }

    fn max_batch_size(&self) -> usize {
        self.backend.max_batch_size().max(1)
    }
}

/// Handle for one secondary index of a table
pub struct SecondaryIndex<M> {
    table: Table<M>,
    index: Arc<IndexSchema>,
}

impl<M> SecondaryIndex<M> {
    pub fn name(&self) -> &str {
        &self.index.name
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.index
    }

    /// The table this index belongs to
    pub fn table(&self) -> &Table<M> {
        &self.table
    }

    fn target(&self) -> QueryTarget {
        QueryTarget::Index(self.index.name.clone())
    }
}

impl<M> Clone for SecondaryIndex<M> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            index: Arc::clone(&self.index),
        }
    }
}

impl<M> fmt::Debug for SecondaryIndex<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondaryIndex")
            .field("table_name", &self.table.name())
            .field("index", &self.index.name)
            .finish()
    }
}

impl<M> QueryEndpoint<M> for SecondaryIndex<M> {
    fn query(&self, ctx: &QueryContext, request: &QueryRequest) -> StoreResult<QueryPage<M>> {
        self.table.backend.query(ctx, &self.target(), request)
    }

    fn count(
        &self,
        ctx: &QueryContext,
        hash_key: &Value,
        condition: Option<&Condition>,
    ) -> StoreResult<u64> {
        self.table
            .backend
            .count(ctx, &self.target(), hash_key, condition)
    }

    fn endpoint_name(&self) -> String {
        format!("{}/{}", self.table.name(), self.index.name)
    }
}
