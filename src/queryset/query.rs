//! Lazy, immutable queryset
//!
//! Builder state lives in plain fields; every builder call clones the
//! receiver, changes one field and returns the clone. Nothing contacts the
//! store until a terminal operation runs.
//!
//! Each instance memoizes its execution in a mutex-held slot: the first
//! terminal call runs the query while holding the slot, concurrent terminal
//! calls on the same instance wait and reuse the result. Failed executions
//! leave the slot empty. Builder calls never take the slot lock; the empty
//! sentinel lives in its own field and is copied on clone.
//!
//! NOTE: `filter` is not conjunctive. Each call replaces the previous
//! condition; `filter("number", 5)?.filter("number__gt", 4)?` queries
//! `number > 4` only.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::errors::{QueryResult, QuerySetError};
use super::execution::{Execution, ExecutionIter};
use crate::cursor::Cursor;
use crate::model::{AttributeDef, Model};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::predicate::{Condition, Lookup, PredicateError, Translator};
use crate::store::{
    BatchWriter, QueryContext, QueryEndpoint, QueryRequest, SecondaryIndex, StoreResult, Table,
};

type Slot<M> = Option<Arc<Execution<M>>>;

/// Lazy query over one partition of a table or secondary index
pub struct QuerySet<M> {
    table: Table<M>,
    limit: Option<usize>,
    cursor: Option<Cursor>,
    hash_key: Option<Value>,
    index: Option<SecondaryIndex<M>>,
    scan_forward: bool,
    condition: Option<Condition>,
    context: QueryContext,
    /// Set once by `none()` and inherited by every clone
    empty: Option<Arc<Execution<M>>>,
    execution: Mutex<Slot<M>>,
}

impl<M> QuerySet<M> {
    fn slot(&self) -> MutexGuard<'_, Slot<M>> {
        self.execution.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<M: Model> QuerySet<M> {
    /// Create an unfiltered queryset over `table`
    pub fn new(table: Table<M>) -> Self {
        Self {
            table,
            limit: None,
            cursor: None,
            hash_key: None,
            index: None,
            scan_forward: true,
            condition: None,
            context: QueryContext::background(),
            empty: None,
            execution: Mutex::new(None),
        }
    }

    fn derive(&self, change: impl FnOnce(&mut Self)) -> Self {
        let mut queryset = self.clone();
        change(&mut queryset);
        queryset
    }

    // ==================
    // Builder
    // ==================

    pub fn set_limit(&self, limit: usize) -> Self {
        self.derive(|qs| qs.limit = Some(limit))
    }

    /// Resume after `cursor`; `None` starts from the beginning
    pub fn set_cursor(&self, cursor: impl Into<Option<Cursor>>) -> Self {
        let cursor = cursor.into();
        self.derive(|qs| qs.cursor = cursor)
    }

    /// Query a secondary index instead of the table; `None` goes back to the table
    pub fn set_index(&self, index: impl Into<Option<SecondaryIndex<M>>>) -> Self {
        let index = index.into();
        self.derive(|qs| qs.index = index)
    }

    pub fn set_hash_key(&self, hash_key: impl Into<Value>) -> Self {
        let hash_key = hash_key.into();
        self.derive(|qs| qs.hash_key = Some(hash_key))
    }

    pub fn set_scan_forward(&self, scan_forward: bool) -> Self {
        self.derive(|qs| qs.scan_forward = scan_forward)
    }

    /// Carry `context` to every store call
    pub fn with_context(&self, context: QueryContext) -> Self {
        self.derive(|qs| qs.context = context)
    }

    /// A clone that always yields nothing and never contacts the store
    pub fn none(&self) -> Self {
        self.derive(|qs| qs.empty = Some(Arc::new(Execution::empty())))
    }

    /// Replace the condition with one field lookup
    ///
    /// `lookup` is `field` or `field__operator`. A `between` range with
    /// `low > high` gives the empty queryset.
    pub fn filter(&self, lookup: &str, value: impl Into<Value>) -> QueryResult<Self> {
        self.filter_hooked(lookup, value.into(), |_, _, _| Ok(()))
    }

    /// `filter` taking the lookup as a collection that must hold exactly one pair
    pub fn filter_args<I, K>(&self, args: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let (lookup, value) = exactly_one(args)?;
        self.filter(lookup.as_ref(), value)
    }

    pub(crate) fn filter_hooked<F>(&self, lookup: &str, value: Value, hook: F) -> QueryResult<Self>
    where
        F: FnOnce(&AttributeDef, Lookup, &Value) -> QueryResult<()>,
    {
        let parsed = Translator::parse_lookup(lookup);
        let field = parsed.field;
        let attribute = self
            .table
            .schema()
            .attribute(field)
            .ok_or_else(|| PredicateError::FieldDoesNotExist(field.to_string()))?;
        let lookup = parsed.lookup()?;

        hook(&attribute, lookup, &value)?;

        let condition = Translator::translate(field, lookup, value)?;
        if Translator::is_empty_range(&condition) {
            return Ok(self.none());
        }
        Ok(self.derive(|qs| qs.condition = Some(condition)))
    }

    // ==================
    // Terminal operations
    // ==================

    /// First item in scan order
    pub fn first(&self) -> QueryResult<Option<M>> {
        let queryset = self.derive(|qs| qs.limit = Some(1));
        Ok(queryset.execute()?.items().first().cloned())
    }

    /// Last item in scan order
    ///
    /// Flips the scan direction, so `last` on a reversed queryset reads forward.
    pub fn last(&self) -> QueryResult<Option<M>> {
        let queryset = self.derive(|qs| {
            qs.limit = Some(1);
            qs.scan_forward = !qs.scan_forward;
        });
        Ok(queryset.execute()?.items().first().cloned())
    }

    pub fn exists(&self) -> QueryResult<bool> {
        Ok(self.first()?.is_some())
    }

    /// The only item, failing unless there is exactly one
    pub fn get(&self) -> QueryResult<M> {
        let execution = self.execute()?;
        match execution.items() {
            [item] => Ok(item.clone()),
            [] => Err(QuerySetError::ObjectDoesNotExist),
            items => Err(QuerySetError::MultipleObjectsReturned(items.len())),
        }
    }

    /// `filter(lookup, value)` then `get`
    pub fn get_by(&self, lookup: &str, value: impl Into<Value>) -> QueryResult<M> {
        self.filter(lookup, value)?.get()
    }

    /// `get` with an optional lookup given as a collection of at most one pair
    pub fn get_args<I, K>(&self, args: I) -> QueryResult<M>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        match at_most_one(args)? {
            Some((lookup, value)) => self.get_by(lookup.as_ref(), value),
            None => self.get(),
        }
    }

    /// Number of matching items
    ///
    /// Without a limit or cursor, and with nothing memoized yet, this asks the
    /// store for a native count instead of reading the items.
    pub fn count(&self) -> QueryResult<u64> {
        if let Some(execution) = self.memoized() {
            return Ok(execution.len() as u64);
        }
        if self.cursor.is_some() || self.limit.is_some() {
            return Ok(self.execute()?.len() as u64);
        }

        let hash_key = self.hash_key.as_ref().ok_or(QuerySetError::HashKeyRequired)?;
        let endpoint = self.endpoint();
        let name = endpoint.endpoint_name();
        let request_id = self.context.request_id().to_string();
        log_event_with_fields(
            Event::QuerysetCount,
            &[("endpoint", name.as_str()), ("request_id", request_id.as_str())],
        );

        let count = self.call_store(&name, || {
            endpoint.count(&self.context, hash_key, self.condition.as_ref())
        })?;
        self.table.metrics().increment_native_counts();
        Ok(count)
    }

    /// Cursor to resume after this page, `None` on the last page
    pub fn next_cursor(&self) -> QueryResult<Option<Cursor>> {
        Ok(self.execute()?.next_cursor().cloned())
    }

    /// Delete every matching item, returning how many were deleted
    ///
    /// Items are sent in batches no larger than the table accepts. A store
    /// error stops at that batch. Unprocessed items do not stop later
    /// batches but make the whole call fail with `IncompleteDelete`.
    pub fn delete(&self) -> QueryResult<usize> {
        let execution = self.execute()?;
        let table_name = self.table.name().to_string();
        let total = execution.len().to_string();
        let scope = ObservationScope::with_fields(
            Event::QuerysetDelete.as_str(),
            &[("table", table_name.as_str()), ("items", total.as_str())],
        );

        let metrics = self.table.metrics();
        let mut deleted = 0;
        let mut unprocessed = 0;
        for batch in execution.items().chunks(self.table.max_batch_size()) {
            let outcome =
                match self.call_store(&table_name, || self.table.batch_delete(&self.context, batch)) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        scope.fail(&e.to_string());
                        return Err(e);
                    }
                };
            metrics.increment_delete_batches();
            metrics.add_items_deleted(outcome.deleted as u64);
            deleted += outcome.deleted;

            if !outcome.unprocessed.is_empty() {
                unprocessed += outcome.unprocessed.len();
                let left = outcome.unprocessed.len().to_string();
                log_event_with_fields(
                    Event::QuerysetDeleteUnprocessed,
                    &[("table", table_name.as_str()), ("unprocessed", left.as_str())],
                );
            }
        }

        if unprocessed > 0 {
            scope.fail("unprocessed items");
            return Err(QuerySetError::IncompleteDelete {
                deleted,
                unprocessed,
            });
        }
        scope.complete_with_fields(&[("deleted", deleted.to_string().as_str())]);
        Ok(deleted)
    }

    /// Run the query once and return the memoized result
    pub fn execute(&self) -> QueryResult<Arc<Execution<M>>> {
        if let Some(empty) = &self.empty {
            self.note_reuse(empty);
            return Ok(Arc::clone(empty));
        }
        let mut slot = self.slot();
        if let Some(execution) = slot.as_ref() {
            self.note_reuse(execution);
            return Ok(Arc::clone(execution));
        }
        let execution = Arc::new(self.run_query()?);
        *slot = Some(Arc::clone(&execution));
        Ok(execution)
    }

    /// Iterate over the memoized items
    pub fn iter(&self) -> QueryResult<ExecutionIter<M>> {
        Ok(ExecutionIter::new(self.execute()?))
    }

    pub fn to_vec(&self) -> QueryResult<Vec<M>> {
        Ok(self.execute()?.items().to_vec())
    }

    // ==================
    // Accessors
    // ==================

    pub fn table(&self) -> &Table<M> {
        &self.table
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn hash_key(&self) -> Option<&Value> {
        self.hash_key.as_ref()
    }

    pub fn index(&self) -> Option<&SecondaryIndex<M>> {
        self.index.as_ref()
    }

    pub fn scan_forward(&self) -> bool {
        self.scan_forward
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    /// True if this queryset is the empty sentinel
    pub fn is_none(&self) -> bool {
        self.empty.is_some()
    }

    pub fn is_executed(&self) -> bool {
        self.empty.is_some() || self.slot().is_some()
    }

    // ==================
    // Internals
    // ==================

    fn endpoint(&self) -> &dyn QueryEndpoint<M> {
        match &self.index {
            Some(index) => index as &dyn QueryEndpoint<M>,
            None => &self.table,
        }
    }

    fn memoized(&self) -> Option<Arc<Execution<M>>> {
        if let Some(empty) = &self.empty {
            self.note_reuse(empty);
            return Some(Arc::clone(empty));
        }
        let slot = self.slot();
        let execution = slot.as_ref()?;
        self.note_reuse(execution);
        Some(Arc::clone(execution))
    }

    fn note_reuse(&self, execution: &Execution<M>) {
        if execution.is_short_circuited() {
            self.table.metrics().increment_empty_short_circuits();
            log_event_with_fields(Event::QuerysetEmpty, &[("table", self.table.name())]);
        }
    }

    fn run_query(&self) -> QueryResult<Execution<M>> {
        let hash_key = self.hash_key.clone().ok_or(QuerySetError::HashKeyRequired)?;
        let endpoint = self.endpoint();
        let name = endpoint.endpoint_name();
        let request = QueryRequest {
            hash_key,
            condition: self.condition.clone(),
            limit: self.limit,
            cursor: self.cursor.clone(),
            scan_forward: self.scan_forward,
        };

        let request_id = self.context.request_id().to_string();
        let condition = self
            .condition
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_default();
        log_event_with_fields(
            Event::QuerysetExecute,
            &[
                ("endpoint", name.as_str()),
                ("request_id", request_id.as_str()),
                ("condition", condition.as_str()),
                ("scan_forward", if self.scan_forward { "true" } else { "false" }),
            ],
        );

        let page = self.call_store(&name, || endpoint.query(&self.context, &request))?;
        self.table.metrics().increment_queries_executed();

        let items = page.items.len().to_string();
        log_event_with_fields(
            Event::QuerysetExecuted,
            &[
                ("endpoint", name.as_str()),
                ("request_id", request_id.as_str()),
                ("items", items.as_str()),
                ("has_next", if page.next_cursor.is_some() { "true" } else { "false" }),
            ],
        );
        Ok(Execution::new(page.items, page.next_cursor))
    }

    /// Check the context, then make one store call
    fn call_store<T>(&self, endpoint: &str, call: impl FnOnce() -> StoreResult<T>) -> QueryResult<T> {
        self.context.check()?;
        call().map_err(|e| {
            self.table.metrics().increment_store_failures();
            log_event_with_fields(
                Event::QuerysetStoreFailure,
                &[("endpoint", endpoint), ("code", e.code()), ("error", e.to_string().as_str())],
            );
            QuerySetError::Store(e)
        })
    }
}

/// Clones share builder state and the empty sentinel, never a memoized page
impl<M> Clone for QuerySet<M> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            limit: self.limit,
            cursor: self.cursor.clone(),
            hash_key: self.hash_key.clone(),
            index: self.index.clone(),
            scan_forward: self.scan_forward,
            condition: self.condition.clone(),
            context: self.context.clone(),
            empty: self.empty.clone(),
            execution: Mutex::new(None),
        }
    }
}

impl<M> fmt::Debug for QuerySet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySet")
            .field("table", &self.table.name())
            .field("index", &self.index.as_ref().map(|i| i.name().to_string()))
            .field("hash_key", &self.hash_key)
            .field("condition", &self.condition)
            .field("limit", &self.limit)
            .field("cursor", &self.cursor)
            .field("scan_forward", &self.scan_forward)
            .finish_non_exhaustive()
    }
}

pub(crate) fn exactly_one<I, K>(args: I) -> QueryResult<(K, Value)>
where
    I: IntoIterator<Item = (K, Value)>,
{
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(pair), None) => Ok(pair),
        _ => Err(QuerySetError::InvalidArgument(
            "exactly one filter lookup is required".into(),
        )),
    }
}

pub(crate) fn at_most_one<I, K>(args: I) -> QueryResult<Option<(K, Value)>>
where
    I: IntoIterator<Item = (K, Value)>,
{
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (pair, None) => Ok(pair),
        _ => Err(QuerySetError::InvalidArgument(
            "at most one filter lookup is allowed".into(),
        )),
    }
}
