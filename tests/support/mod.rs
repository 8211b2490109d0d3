//! Shared fixtures for integration tests
//!
//! A table of `TestItem`s keyed by `id` + `date`, with a secondary index
//! keyed by `string` + `number`.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dynaquery::model::{AttributeDef, AttributeKind, IndexSchema, ModelSchema};
use dynaquery::store::memory::MemoryTable;
use dynaquery::store::Table;

pub const INDEX: &str = "string_number_index";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestItem {
    pub id: String,
    pub date: DateTime<Utc>,
    pub string: Option<String>,
    pub number: i64,
    pub flag: bool,
}

pub fn schema() -> ModelSchema {
    ModelSchema::new("test_items", "id")
        .with_range_key("date")
        .with_attribute(AttributeDef::new("date", AttributeKind::DateTime))
        .with_attribute(AttributeDef::new("string", AttributeKind::String).nullable())
        .with_attribute(AttributeDef::new("number", AttributeKind::Number))
        .with_attribute(AttributeDef::new("flag", AttributeKind::Boolean))
        .with_index(IndexSchema::new(INDEX, "string").with_range_key("number"))
}

/// Whole seconds only, so serialized dates sort in time order
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn make_item(id: &str, string: Option<&str>, number: i64) -> TestItem {
    TestItem {
        id: id.to_string(),
        date: base_time() + Duration::minutes(number),
        string: string.map(str::to_string),
        number,
        flag: number % 2 == 1,
    }
}

pub fn setup() -> (Arc<MemoryTable<TestItem>>, Table<TestItem>) {
    setup_with(MemoryTable::new(schema()))
}

pub fn setup_with(store: MemoryTable<TestItem>) -> (Arc<MemoryTable<TestItem>>, Table<TestItem>) {
    let store = Arc::new(store);
    let table = store.table();
    (store, table)
}

/// `count` items sharing hash key `id`, numbered 0..count
pub fn create_in_partition(store: &MemoryTable<TestItem>, id: &str, count: i64) -> Vec<TestItem> {
    let items: Vec<TestItem> = (0..count)
        .map(|i| make_item(id, Some(&format!("test {}", i)), i))
        .collect();
    store.put_all(items.clone()).unwrap();
    items
}

/// `count` items with distinct ids sharing index hash key `string`
pub fn create_in_index(store: &MemoryTable<TestItem>, string: &str, count: i64) -> Vec<TestItem> {
    let items: Vec<TestItem> = (0..count)
        .map(|i| make_item(&Uuid::new_v4().to_string(), Some(string), i))
        .collect();
    store.put_all(items.clone()).unwrap();
    items
}
