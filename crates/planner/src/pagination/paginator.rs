use crate::pagination::{
    adapter::QueryAdapter,
    coordinator::{Limit, Pagination},
};
use model::pagination::{cursor::Cursor, error::PaginationError};
use tracing::{debug, info};

/// Walks a result set page by page.
///
/// Each call to [`Paginator::next_page`] builds a fresh query, applies the
/// directive for the current cursor and moves the cursor past the returned
/// rows. Once a page comes back empty the paginator is exhausted: further
/// calls return empty pages without querying again, even though the cursor
/// it holds has the same shape as a first-page cursor.
pub struct Paginator<F> {
    cursor: Cursor,
    limit: usize,
    make_query: F,
    exhausted: bool,
    pages: usize,
}

impl<F, Q> Paginator<F>
where
    F: FnMut() -> Q,
    Q: QueryAdapter,
{
    pub fn new(cursor: Cursor, limit: i64, make_query: F) -> Result<Self, PaginationError> {
        let limit = match Pagination::from_cursor(&cursor, limit)?.limit() {
            Limit::Bounded(limit) => limit,
            Limit::Unbounded => return Err(PaginationError::InvalidLimit(limit)),
        };

        Ok(Paginator {
            cursor,
            limit,
            make_query,
            exhausted: false,
            pages: 0,
        })
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Token that resumes after the last page returned.
    pub fn token(&self) -> String {
        self.cursor.encode()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Number of non-empty pages returned so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub async fn next_page(&mut self) -> Result<Vec<Q::Row>, Q::Error> {
        if self.exhausted {
            debug!("Paginator exhausted; not querying");
            return Ok(Vec::new());
        }

        let directive = Pagination::bounded(&self.cursor, self.limit);
        let page = directive.fetch(&self.cursor, (self.make_query)()).await?;

        if page.rows.is_empty() {
            info!(pages = self.pages, "No more rows. Pagination finished.");
            self.exhausted = true;
        } else {
            self.pages += 1;
        }

        self.cursor = page.next;
        Ok(page.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::predicate::Predicate;
    use async_trait::async_trait;
    use model::{
        core::value::Value,
        pagination::cursor::SortDirection,
        records::row::{FieldValue, RowData},
    };
    use std::{
        convert::Infallible,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };
    use tracing_test::traced_test;

    /// Rows pre-sorted by `+id`; counts executions.
    struct SortedById {
        rows: Arc<Vec<RowData>>,
        executions: Arc<AtomicUsize>,
        condition: Option<Predicate>,
        limit: Option<usize>,
    }

    #[async_trait]
    impl QueryAdapter for SortedById {
        type Row = RowData;
        type Error = Infallible;

        fn add_condition(&mut self, predicate: &Predicate) {
            self.condition = Some(predicate.clone());
        }

        fn add_order(&mut self, column: &str, direction: SortDirection) {
            assert_eq!((column, direction), ("id", SortDirection::Ascending));
        }

        fn set_limit(&mut self, limit: usize) {
            self.limit = Some(limit);
        }

        async fn execute(&self) -> Result<Vec<RowData>, Infallible> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .iter()
                .filter(|row| self.condition.as_ref().is_none_or(|c| c.matches(*row)))
                .take(self.limit.unwrap_or(usize::MAX))
                .cloned()
                .collect())
        }
    }

    fn rows(count: i64) -> Arc<Vec<RowData>> {
        Arc::new(
            (1..=count)
                .map(|id| RowData::new("item", vec![FieldValue::new("id", id)]))
                .collect(),
        )
    }

    fn ids(page: &[RowData]) -> Vec<i64> {
        page.iter()
            .map(|row| match row.get_value("id") {
                Value::Int(id) => id,
                other => panic!("unexpected id {other:?}"),
            })
            .collect()
    }

    fn query_factory(
        data: Arc<Vec<RowData>>,
        executions: Arc<AtomicUsize>,
    ) -> impl FnMut() -> SortedById {
        move || SortedById {
            rows: data.clone(),
            executions: executions.clone(),
            condition: None,
            limit: None,
        }
    }

    #[test]
    fn test_rejects_non_positive_limit() {
        let cursor = Cursor::decode("+id", "").unwrap();
        let executions = Arc::new(AtomicUsize::new(0));

        let result = Paginator::new(cursor, 0, query_factory(rows(3), executions));
        assert!(matches!(result, Err(PaginationError::InvalidLimit(0))));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_walks_every_row_once_then_stays_exhausted() {
        let executions = Arc::new(AtomicUsize::new(0));
        let cursor = Cursor::decode("+id", "").unwrap();
        let mut paginator =
            Paginator::new(cursor, 2, query_factory(rows(5), executions.clone())).unwrap();

        assert_eq!(ids(&paginator.next_page().await.unwrap()), vec![1, 2]);
        assert_eq!(ids(&paginator.next_page().await.unwrap()), vec![3, 4]);
        assert_eq!(ids(&paginator.next_page().await.unwrap()), vec![5]);
        assert!(!paginator.is_exhausted());

        assert!(paginator.next_page().await.unwrap().is_empty());
        assert!(paginator.is_exhausted());
        assert_eq!(executions.load(Ordering::SeqCst), 4);
        assert!(logs_contain("Pagination finished"));

        for _ in 0..3 {
            assert!(paginator.next_page().await.unwrap().is_empty());
        }
        assert_eq!(executions.load(Ordering::SeqCst), 4);
        assert_eq!(paginator.pages(), 3);
        assert!(paginator.cursor().is_unbound());
        assert_eq!(paginator.token(), "");
    }

    #[tokio::test]
    async fn test_resumes_from_token() {
        let executions = Arc::new(AtomicUsize::new(0));
        let data = rows(4);

        let mut first = Paginator::new(
            Cursor::decode("+id", "").unwrap(),
            3,
            query_factory(data.clone(), executions.clone()),
        )
        .unwrap();
        assert_eq!(ids(&first.next_page().await.unwrap()), vec![1, 2, 3]);

        let token = first.token();
        let mut resumed = Paginator::new(
            Cursor::decode("+id", &token).unwrap(),
            3,
            query_factory(data, executions),
        )
        .unwrap();
        assert_eq!(ids(&resumed.next_page().await.unwrap()), vec![4]);
    }
}
