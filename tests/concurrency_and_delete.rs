//! Concurrency, Context and Delete Tests
//!
//! - a shared queryset runs its query once across threads
//! - cancelled or expired contexts never reach the store
//! - delete batches by the store's limit and reports unprocessed items
//! - store failures propagate and are not memoized

mod support;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dynaquery::manager::ManagerMethods;
use dynaquery::predicate::Condition;
use dynaquery::queryset::{QuerySet, QuerySetError};
use dynaquery::store::memory::MemoryTable;
use dynaquery::store::{
    BatchDeleteOutcome, CancelToken, QueryContext, QueryPage, QueryRequest, QueryTarget,
    StoreError, StoreResult, Table, TableBackend,
};
use serde_json::Value;

use support::{create_in_partition, schema, setup, setup_with, TestItem};

const SLOW_QUERY: Duration = Duration::from_millis(500);

/// Backend whose queries stall, answering with an empty page
struct SlowBackend;

impl TableBackend<TestItem> for SlowBackend {
    fn query(
        &self,
        _ctx: &QueryContext,
        _target: &QueryTarget,
        _request: &QueryRequest,
    ) -> StoreResult<QueryPage<TestItem>> {
        thread::sleep(SLOW_QUERY);
        Ok(QueryPage::new(vec![], None))
    }

    fn count(
        &self,
        _ctx: &QueryContext,
        _target: &QueryTarget,
        _hash_key: &Value,
        _condition: Option<&Condition>,
    ) -> StoreResult<u64> {
        Ok(0)
    }

    fn batch_delete(
        &self,
        _ctx: &QueryContext,
        _items: &[TestItem],
    ) -> StoreResult<BatchDeleteOutcome<TestItem>> {
        Ok(BatchDeleteOutcome {
            deleted: 0,
            unprocessed: vec![],
        })
    }
}

// =============================================================================
// Concurrent memoization
// =============================================================================

#[test]
fn test_shared_queryset_executes_once() {
    let (store, table) = setup();
    let instances = create_in_partition(&store, "test", 20);
    let qs = Arc::new(table.objects().set_hash_key("test"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let qs = Arc::clone(&qs);
            thread::spawn(move || qs.to_vec().unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), instances);
    }
    assert_eq!(store.query_calls(), 1);
    assert_eq!(table.metrics().snapshot().queries_executed, 1);
}

#[test]
fn test_builders_do_not_wait_for_running_query() {
    let table = Table::new(schema(), Arc::new(SlowBackend));
    let qs: Arc<QuerySet<TestItem>> = Arc::new(table.objects().set_hash_key("test"));

    let running = {
        let qs = Arc::clone(&qs);
        thread::spawn(move || qs.to_vec().unwrap())
    };
    thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    let limited = qs.set_limit(1);
    let copy = QuerySet::clone(&qs);
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(200), "builders blocked for {:?}", elapsed);
    assert_eq!(limited.limit(), Some(1));
    assert!(!copy.is_executed());
    assert!(running.join().unwrap().is_empty());
}

#[test]
fn test_clones_execute_independently() {
    let (store, table) = setup();
    create_in_partition(&store, "test", 3);
    let qs = table.objects().set_hash_key("test");

    qs.to_vec().unwrap();
    let copy = qs.clone();
    assert!(!copy.is_executed());
    copy.to_vec().unwrap();
    assert_eq!(store.query_calls(), 2);
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn test_cancelled_context_skips_store() {
    let (store, table) = setup();
    create_in_partition(&store, "test", 3);
    let token = CancelToken::new();
    let qs = table
        .objects()
        .set_hash_key("test")
        .with_context(QueryContext::background().with_cancel_token(token.clone()));

    assert_eq!(qs.count().unwrap(), 3);
    token.cancel();

    assert_eq!(
        qs.to_vec().unwrap_err(),
        QuerySetError::Store(StoreError::Cancelled)
    );
    assert_eq!(
        qs.set_limit(1).count().unwrap_err().code(),
        "DYNAQ_STORE_CANCELLED"
    );
    assert_eq!(store.query_calls(), 0);
    assert_eq!(store.count_calls(), 1);
}

#[test]
fn test_expired_deadline_skips_store() {
    let (store, table) = setup();
    create_in_partition(&store, "test", 3);
    let qs = table
        .objects()
        .set_hash_key("test")
        .with_context(QueryContext::background().with_deadline(Instant::now()));

    assert_eq!(
        qs.first().unwrap_err(),
        QuerySetError::Store(StoreError::DeadlineExceeded)
    );
    assert_eq!(qs.count().unwrap_err().code(), "DYNAQ_STORE_DEADLINE_EXCEEDED");
    assert_eq!(store.query_calls() + store.count_calls(), 0);
}

#[test]
fn test_generous_deadline_allows_query() {
    let (store, table) = setup();
    create_in_partition(&store, "test", 3);
    let context = QueryContext::with_timeout(Duration::from_secs(60));
    let qs = table.objects().set_hash_key("test").with_context(context);

    assert_eq!(qs.to_vec().unwrap().len(), 3);
    assert!(qs.context().deadline().is_some());
}

#[test]
fn test_context_carries_through_builders() {
    let (store, table) = setup();
    create_in_partition(&store, "test", 2);
    let token = CancelToken::new();
    token.cancel();
    let qs = table
        .objects()
        .with_context(QueryContext::background().with_cancel_token(token))
        .set_hash_key("test")
        .filter("number", 1)
        .unwrap();

    assert!(qs.exists().is_err());
    assert_eq!(store.query_calls(), 0);
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete_removes_matching_items() {
    let (store, table) = setup();
    create_in_partition(&store, "test", 10);
    create_in_partition(&store, "other", 2);

    let deleted = table
        .objects()
        .set_hash_key("test")
        .filter("number__gte", 6)
        .unwrap()
        .delete()
        .unwrap();

    assert_eq!(deleted, 4);
    assert_eq!(store.len(), 8);
    assert_eq!(table.objects().set_hash_key("test").count().unwrap(), 6);
}

#[test]
fn test_delete_batches_by_store_limit() {
    let (store, table) = setup_with(MemoryTable::new(schema()).with_max_batch_size(3));
    create_in_partition(&store, "test", 10);

    assert_eq!(table.objects().set_hash_key("test").delete().unwrap(), 10);
    assert_eq!(store.delete_calls(), 4);
    assert!(store.is_empty());

    let metrics = table.metrics().snapshot();
    assert_eq!(metrics.delete_batches, 4);
    assert_eq!(metrics.items_deleted, 10);
}

#[test]
fn test_delete_reports_unprocessed_items() {
    let store = MemoryTable::new(schema())
        .with_max_batch_size(4)
        .with_delete_capacity(3);
    let (store, table) = setup_with(store);
    create_in_partition(&store, "test", 8);

    let err = table.objects().set_hash_key("test").delete().unwrap_err();
    assert_eq!(
        err,
        QuerySetError::IncompleteDelete {
            deleted: 6,
            unprocessed: 2
        }
    );
    assert_eq!(err.code(), "DYNAQ_INCOMPLETE_DELETE");
    assert_eq!(store.delete_calls(), 2);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_delete_of_empty_result_skips_store() {
    let (store, table) = setup();
    create_in_partition(&store, "test", 3);

    assert_eq!(table.objects().set_hash_key("other").delete().unwrap(), 0);
    assert_eq!(store.delete_calls(), 0);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_delete_stops_on_store_error() {
    let (store, table) = setup_with(MemoryTable::new(schema()).with_max_batch_size(2));
    create_in_partition(&store, "test", 6);
    let qs = table.objects().set_hash_key("test");
    qs.execute().unwrap();

    store.fail_next(1);
    assert!(matches!(
        qs.delete(),
        Err(QuerySetError::Store(StoreError::Unavailable(_)))
    ));
    assert_eq!(store.delete_calls(), 1);
    assert_eq!(store.len(), 6);
}

// =============================================================================
// Store failures
// =============================================================================

#[test]
fn test_store_failure_is_not_memoized() {
    let (store, table) = setup();
    let instances = create_in_partition(&store, "test", 3);
    let qs = table.objects().set_hash_key("test");

    store.fail_next(1);
    assert_eq!(qs.to_vec().unwrap_err().code(), "DYNAQ_STORE_UNAVAILABLE");
    assert!(!qs.is_executed());

    assert_eq!(qs.to_vec().unwrap(), instances);
    assert_eq!(store.query_calls(), 2);
    assert_eq!(table.metrics().snapshot().store_failures, 1);
}

#[test]
fn test_count_failure_propagates() {
    let (store, table) = setup();
    create_in_partition(&store, "test", 3);
    let qs = table.objects().set_hash_key("test");

    store.fail_next(1);
    assert!(matches!(
        qs.count(),
        Err(QuerySetError::Store(StoreError::Unavailable(_)))
    ));
    assert_eq!(qs.count().unwrap(), 3);
}
