#![allow(dead_code)]

use model::{
    core::value::Value,
    pagination::{cursor::Cursor, error::PaginationError},
    records::row::RowData,
    schema::entity::EntitySchema,
};
use planner::pagination::{adapter::QueryAdapter, coordinator::Pagination};

/// Upper bound on round trips before a walk is declared runaway.
const MAX_PAGES: usize = 100;

/// Walks a result set the way a client would: every round decodes the token
/// handed out by the previous one, fetches a page and re-encodes the next
/// cursor. Returns every page, including the final empty one.
pub async fn walk_with_tokens<Q, F>(
    schema: &EntitySchema,
    order: &str,
    page_size: i64,
    make_query: F,
) -> Vec<Vec<RowData>>
where
    F: FnMut() -> Q,
    Q: QueryAdapter<Row = RowData>,
{
    walk(|token| schema.decode_cursor(order, token), page_size, make_query).await
}

/// Same walk, decoding every token without a schema.
pub async fn walk_untyped<Q, F>(order: &str, page_size: i64, make_query: F) -> Vec<Vec<RowData>>
where
    F: FnMut() -> Q,
    Q: QueryAdapter<Row = RowData>,
{
    walk(|token| Cursor::decode(order, token), page_size, make_query).await
}

async fn walk<Q, F, D>(decode: D, page_size: i64, mut make_query: F) -> Vec<Vec<RowData>>
where
    D: Fn(&str) -> Result<Cursor, PaginationError>,
    F: FnMut() -> Q,
    Q: QueryAdapter<Row = RowData>,
{
    let mut token = String::new();
    let mut pages = Vec::new();

    for _ in 0..MAX_PAGES {
        let cursor = decode(&token).expect("decode cursor token");
        let directive = Pagination::from_cursor(&cursor, page_size).expect("valid page size");
        let page = directive
            .fetch(&cursor, make_query())
            .await
            .expect("fetch page");

        let done = page.rows.is_empty();
        pages.push(page.rows);
        if done {
            return pages;
        }
        token = page.next.encode();
    }

    panic!("pagination did not terminate after {MAX_PAGES} pages");
}

pub fn titles(pages: &[Vec<RowData>]) -> Vec<Vec<String>> {
    pages
        .iter()
        .map(|page| page.iter().map(|row| text(row, "title")).collect())
        .collect()
}

pub fn page_sizes(pages: &[Vec<RowData>]) -> Vec<usize> {
    pages.iter().map(Vec::len).collect()
}

pub fn ids(pages: &[Vec<RowData>]) -> Vec<Value> {
    pages
        .iter()
        .flatten()
        .map(|row| row.get_value("id"))
        .collect()
}

pub fn text(row: &RowData, field: &str) -> String {
    match row.get_value(field) {
        Value::String(s) => s,
        other => panic!("expected text in '{field}', found {other:?}"),
    }
}

pub fn expected(pages: &[&[&str]]) -> Vec<Vec<String>> {
    pages
        .iter()
        .map(|page| page.iter().map(|t| t.to_string()).collect())
        .collect()
}
