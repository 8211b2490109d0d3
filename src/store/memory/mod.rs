//! In-memory table
//!
//! A complete [`TableBackend`] kept in process memory. It follows the
//! store contract exactly: items are partitioned by hash key, ordered by
//! range key (ties broken by the table keys), filtered by the condition,
//! cut to the limit and resumed strictly after a cursor. A cursor is
//! returned only while more matching items remain.
//!
//! Index partitions contain only items that carry the index keys: an
//! item missing the index hash key or range key is not in the index.
//!
//! Call counters let callers see whether a code path reached the store.
//! Every [`Table`] handle from [`MemoryTable::table`] reports into one
//! metrics registry.

mod eval;

pub use eval::ConditionEval;

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde_json::Value;

use super::{
    BatchDeleteOutcome, QueryContext, QueryPage, QueryRequest, QueryTarget, StoreError,
    StoreResult, Table, TableBackend, DEFAULT_MAX_BATCH_SIZE,
};
use crate::cursor::Cursor;
use crate::model::ModelSchema;
use crate::observability::MetricsRegistry;
use crate::predicate::{compare, Condition};

struct StoredItem<M> {
    attributes: Value,
    item: M,
}

/// Key attributes of the partition being read
struct KeySchema<'a> {
    hash_key: &'a str,
    range_key: Option<&'a str>,
}

/// In-memory table backend
pub struct MemoryTable<M> {
    schema: ModelSchema,
    items: RwLock<Vec<StoredItem<M>>>,
    max_batch_size: usize,
    /// Items a single batch delete processes; the rest come back unprocessed
    delete_capacity: Option<usize>,
    query_calls: AtomicU64,
    count_calls: AtomicU64,
    delete_calls: AtomicU64,
    remaining_failures: AtomicUsize,
    metrics: Arc<MetricsRegistry>,
}

impl<M> MemoryTable<M>
where
    M: Serialize + Clone + Send + Sync + 'static,
{
    pub fn new(schema: ModelSchema) -> Self {
        Self {
            schema,
            items: RwLock::new(Vec::new()),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            delete_capacity: None,
            query_calls: AtomicU64::new(0),
            count_calls: AtomicU64::new(0),
            delete_calls: AtomicU64::new(0),
            remaining_failures: AtomicUsize::new(0),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.max(1);
        self
    }

    /// Limit how many items one batch delete processes
    pub fn with_delete_capacity(mut self, capacity: usize) -> Self {
        self.delete_capacity = Some(capacity);
        self
    }

    /// Make the next `n` store calls fail with `Unavailable`
    pub fn fail_next(&self, n: usize) {
        self.remaining_failures.store(n, AtomicOrdering::SeqCst);
    }

    /// Wrap in a [`Table`] handle sharing this backend and its metrics
    pub fn table(self: &Arc<Self>) -> Table<M> {
        Table::with_metrics(
            self.schema.clone(),
            Arc::clone(self) as Arc<dyn TableBackend<M>>,
            Arc::clone(&self.metrics),
        )
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Insert an item, replacing any item with the same primary key
    pub fn put(&self, item: M) -> StoreResult<()> {
        let attributes = serde_json::to_value(&item)?;
        if !attributes.is_object() {
            return Err(StoreError::InvalidRequest(
                "item must serialize to an object".into(),
            ));
        }
        let key = self.primary_key(&attributes)?;

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = items
            .iter()
            .position(|stored| self.primary_key_of(&stored.attributes) == key)
        {
            items[pos] = StoredItem { attributes, item };
        } else {
            items.push(StoredItem { attributes, item });
        }
        Ok(())
    }

    /// Insert several items
    pub fn put_all(&self, items: impl IntoIterator<Item = M>) -> StoreResult<()> {
        for item in items {
            self.put(item)?;
        }
        Ok(())
    }

    /// Remove every item
    pub fn clear(&self) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn query_calls(&self) -> u64 {
        self.query_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn count_calls(&self) -> u64 {
        self.count_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn delete_calls(&self) -> u64 {
        self.delete_calls.load(AtomicOrdering::SeqCst)
    }

    fn primary_key(&self, attributes: &Value) -> StoreResult<Vec<Value>> {
        let mut key = Vec::with_capacity(2);
        for name in self.schema.primary_key_attributes() {
            match attributes.get(name) {
                Some(v) if !v.is_null() => key.push(v.clone()),
                _ => {
                    return Err(StoreError::InvalidRequest(format!(
                        "item is missing key attribute \"{}\"",
                        name
                    )))
                }
            }
        }
        Ok(key)
    }

    fn primary_key_of(&self, attributes: &Value) -> Vec<Value> {
        self.schema
            .primary_key_attributes()
            .into_iter()
            .map(|name| attributes.get(name).cloned().unwrap_or(Value::Null))
            .collect()
    }

    fn key_schema(&self, target: &QueryTarget) -> StoreResult<KeySchema<'_>> {
        match target {
            QueryTarget::Table => Ok(KeySchema {
                hash_key: &self.schema.hash_key,
                range_key: self.schema.range_key.as_deref(),
            }),
            QueryTarget::Index(name) => {
                let index = self.schema.index(name).ok_or_else(|| {
                    StoreError::InvalidRequest(format!("unknown index \"{}\"", name))
                })?;
                Ok(KeySchema {
                    hash_key: &index.hash_key,
                    range_key: index.range_key.as_deref(),
                })
            }
        }
    }

    /// Range key first, then the table keys
    fn sort_key(&self, keys: &KeySchema<'_>, lookup: impl Fn(&str) -> Option<Value>) -> Vec<Value> {
        let mut sort_key = Vec::with_capacity(3);
        sort_key.push(
            keys.range_key
                .and_then(|name| lookup(name))
                .unwrap_or(Value::Null),
        );
        for name in self.schema.primary_key_attributes() {
            sort_key.push(lookup(name).unwrap_or(Value::Null));
        }
        sort_key
    }

    fn cursor_for(&self, keys: &KeySchema<'_>, attributes: &Value) -> Cursor {
        let names = std::iter::once(keys.hash_key)
            .chain(keys.range_key)
            .chain(self.schema.primary_key_attributes());
        let mut cursor = Cursor::new();
        for name in names {
            if let Some(value) = attributes.get(name) {
                cursor = cursor.with_key(name, value.clone());
            }
        }
        cursor
    }

    fn begin_call(&self, ctx: &QueryContext, counter: &AtomicU64) -> StoreResult<()> {
        ctx.check()?;
        counter.fetch_add(1, AtomicOrdering::SeqCst);
        let injected = self
            .remaining_failures
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        Ok(())
    }

    /// Matching items of one partition in scan order, with their sort keys
    fn scan<'a>(
        &self,
        items: &'a [StoredItem<M>],
        keys: &KeySchema<'_>,
        hash_key: &Value,
        condition: Option<&Condition>,
        scan_forward: bool,
    ) -> Vec<(Vec<Value>, &'a StoredItem<M>)> {
        let mut partition: Vec<(Vec<Value>, &StoredItem<M>)> = items
            .iter()
            .filter(|stored| {
                stored
                    .attributes
                    .get(keys.hash_key)
                    .filter(|v| !v.is_null())
                    .map_or(false, |v| key_equal(v, hash_key))
            })
            .filter(|stored| {
                keys.range_key.map_or(true, |name| {
                    stored.attributes.get(name).map_or(false, |v| !v.is_null())
                })
            })
            .filter(|stored| condition.map_or(true, |c| ConditionEval::matches(&stored.attributes, c)))
            .map(|stored| {
                let sort_key = self.sort_key(keys, |name| stored.attributes.get(name).cloned());
                (sort_key, stored)
            })
            .collect();

        partition.sort_by(|(a, _), (b, _)| compare::total_cmp_keys(a, b));
        if !scan_forward {
            partition.reverse();
        }
        partition
    }
}

impl<M> TableBackend<M> for MemoryTable<M>
where
    M: Serialize + Clone + Send + Sync + 'static,
{
    fn query(
        &self,
        ctx: &QueryContext,
        target: &QueryTarget,
        request: &QueryRequest,
    ) -> StoreResult<QueryPage<M>> {
        self.begin_call(ctx, &self.query_calls)?;
        if request.limit == Some(0) {
            return Err(StoreError::InvalidRequest("limit must be positive".into()));
        }
        let keys = self.key_schema(target)?;

        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let partition = self.scan(
            &items,
            &keys,
            &request.hash_key,
            request.condition.as_ref(),
            request.scan_forward,
        );

        let start = match &request.cursor {
            Some(cursor) => {
                let resume = self.sort_key(&keys, |name| cursor.get(name).cloned());
                let past = if request.scan_forward {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
                partition
                    .iter()
                    .position(|(key, _)| compare::total_cmp_keys(key, &resume) == past)
                    .unwrap_or(partition.len())
            }
            None => 0,
        };

        let remaining = &partition[start..];
        let take = request.limit.unwrap_or(remaining.len()).min(remaining.len());
        let page = &remaining[..take];

        let next_cursor = match page.last() {
            Some((_, last)) if take < remaining.len() => {
                Some(self.cursor_for(&keys, &last.attributes))
            }
            _ => None,
        };

        Ok(QueryPage::new(
            page.iter().map(|(_, stored)| stored.item.clone()).collect(),
            next_cursor,
        ))
    }

    fn count(
        &self,
        ctx: &QueryContext,
        target: &QueryTarget,
        hash_key: &Value,
        condition: Option<&Condition>,
    ) -> StoreResult<u64> {
        self.begin_call(ctx, &self.count_calls)?;
        let keys = self.key_schema(target)?;
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(self.scan(&items, &keys, hash_key, condition, true).len() as u64)
    }

    fn batch_delete(&self, ctx: &QueryContext, batch: &[M]) -> StoreResult<BatchDeleteOutcome<M>> {
        self.begin_call(ctx, &self.delete_calls)?;
        if batch.len() > self.max_batch_size {
            return Err(StoreError::InvalidRequest(format!(
                "batch of {} exceeds maximum of {}",
                batch.len(),
                self.max_batch_size
            )));
        }

        let capacity = self.delete_capacity.unwrap_or(batch.len()).min(batch.len());
        let (processed, unprocessed) = batch.split_at(capacity);

        let mut keys = Vec::with_capacity(processed.len());
        for item in processed {
            let attributes = serde_json::to_value(item)?;
            keys.push(self.primary_key(&attributes)?);
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.retain(|stored| !keys.contains(&self.primary_key_of(&stored.attributes)));

        Ok(BatchDeleteOutcome {
            deleted: processed.len(),
            unprocessed: unprocessed.to_vec(),
        })
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}

fn key_equal(a: &Value, b: &Value) -> bool {
    compare::partial_cmp(a, b) == Some(Ordering::Equal) || a == b
}
