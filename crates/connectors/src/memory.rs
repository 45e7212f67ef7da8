//! Query adapter over rows held in memory.
//!
//! Mirrors what a SQL backend does with a keyset directive: conditions are
//! ANDed, rows are sorted by the orderings and the result is truncated to
//! the limit. Useful for tests and for data that is already materialized.

use crate::error::AdapterError;
use async_trait::async_trait;
use model::{
    core::value::Value,
    pagination::cursor::SortDirection,
    records::row::{Row, RowData},
};
use planner::pagination::{adapter::QueryAdapter, predicate::Predicate};
use std::{cmp::Ordering, sync::Arc};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    rows: Arc<Vec<RowData>>,
    conditions: Vec<Predicate>,
    orderings: Vec<(String, SortDirection)>,
    limit: Option<usize>,
}

impl MemoryAdapter {
    pub fn new(rows: Vec<RowData>) -> Self {
        MemoryAdapter {
            rows: Arc::new(rows),
            conditions: Vec::new(),
            orderings: Vec::new(),
            limit: None,
        }
    }

    /// A fresh query over the same rows, without conditions, orderings or
    /// limit.
    pub fn query(&self) -> Self {
        MemoryAdapter {
            rows: Arc::clone(&self.rows),
            conditions: Vec::new(),
            orderings: Vec::new(),
            limit: None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn compare_rows(&self, a: &RowData, b: &RowData) -> Ordering {
        for (column, direction) in &self.orderings {
            let ordering = compare_fields(a.field_value(column), b.field_value(column));
            let ordering = match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Missing fields and NULLs sort first, as SQLite does for ascending order.
fn compare_fields(a: Option<Value>, b: Option<Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(&b).unwrap_or(Ordering::Equal),
    }
}

#[async_trait]
impl QueryAdapter for MemoryAdapter {
    type Row = RowData;
    type Error = AdapterError;

    fn add_condition(&mut self, predicate: &Predicate) {
        if !predicate.is_trivial() {
            self.conditions.push(predicate.clone());
        }
    }

    fn add_order(&mut self, column: &str, direction: SortDirection) {
        self.orderings.push((column.to_string(), direction));
    }

    fn set_limit(&mut self, limit: usize) {
        self.limit = Some(limit);
    }

    async fn execute(&self) -> Result<Vec<RowData>, AdapterError> {
        let mut rows: Vec<RowData> = self
            .rows
            .iter()
            .filter(|row| self.conditions.iter().all(|c| c.matches(*row)))
            .cloned()
            .collect();

        // Stable, so rows that tie on every key keep their insertion order.
        rows.sort_by(|a, b| self.compare_rows(a, b));

        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        debug!(
            matched = rows.len(),
            total = self.rows.len(),
            "Executed in-memory query"
        );
        Ok(rows)
    }
}
