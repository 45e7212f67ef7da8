#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use connectors::{memory::MemoryAdapter, sqlite::adapter::SqliteAdapter};
use model::{
    core::{data_type::DataType, value::Value},
    records::row::{FieldValue, RowData},
    schema::entity::EntitySchema,
};
use uuid::Uuid;

pub mod utils;

pub const PRODUCTS_TABLE: &str = "products";

/// Catalogue titles in insertion order; duplicates are intentional.
pub const PRODUCT_TITLES: [&str; 10] = [
    "Hat", "Pants", "Pants", "Jackets", "Hat", "T-Shirt", "Trousers", "Cap", "T-Shirt", "Hat",
];

pub fn product_schema() -> EntitySchema {
    EntitySchema::new("product")
        .field("id", DataType::Uuid)
        .field("title", DataType::String)
        .field("created_at", DataType::Timestamp)
        .field("updated_at", DataType::Timestamp)
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .expect("valid epoch")
}

/// One row per title, each with a fresh id. `created_at` grows by a minute
/// per row in insertion order.
pub fn products() -> Vec<RowData> {
    PRODUCT_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let created_at = epoch() + Duration::minutes(i as i64);
            RowData::new(
                "product",
                vec![
                    FieldValue::new("id", Uuid::new_v4()),
                    FieldValue::new("title", *title),
                    FieldValue {
                        name: "created_at".to_string(),
                        value: Some(Value::Timestamp(created_at)),
                    },
                    FieldValue {
                        name: "updated_at".to_string(),
                        value: Some(Value::Timestamp(created_at + Duration::hours(1))),
                    },
                ],
            )
        })
        .collect()
}

/// In-memory SQLite database holding `rows` in the products table.
pub fn sqlite_catalog(rows: &[RowData]) -> SqliteAdapter {
    let adapter = SqliteAdapter::open_in_memory().expect("open sqlite");
    let schema = product_schema();
    adapter
        .create_table(PRODUCTS_TABLE, &schema, &["id"])
        .expect("create products table");
    adapter
        .insert_rows(PRODUCTS_TABLE, &schema, rows)
        .expect("insert products");
    adapter
}

pub fn memory_catalog(rows: &[RowData]) -> MemoryAdapter {
    MemoryAdapter::new(rows.to_vec())
}
