use crate::pagination::{
    adapter::QueryAdapter,
    predicate::{self, Predicate},
};
use model::{
    pagination::{
        cursor::{Cursor, SortDirection},
        error::PaginationError,
        settings::PaginationSettings,
    },
    records::row::Row,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Limit {
    /// At most this many rows; always positive.
    Bounded(usize),
    Unbounded,
}

/// Everything a query needs to fetch one page: the keyset predicate, the
/// sort keys in priority order, and the page size.
///
/// Derived from a cursor for a single request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    predicate: Predicate,
    orderings: Vec<(String, SortDirection)>,
    limit: Limit,
}

/// One fetched page together with the cursor that resumes after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub rows: Vec<R>,
    pub next: Cursor,
}

impl Pagination {
    /// Builds the directive for `cursor` with a page size of `limit` rows.
    pub fn from_cursor(cursor: &Cursor, limit: i64) -> Result<Self, PaginationError> {
        let limit = usize::try_from(limit)
            .ok()
            .filter(|l| *l > 0)
            .ok_or(PaginationError::InvalidLimit(limit))?;

        Ok(Self::with_limit(cursor, Limit::Bounded(limit)))
    }

    /// Builds the directive for `cursor` without a page size.
    pub fn unbounded(cursor: &Cursor) -> Self {
        Self::with_limit(cursor, Limit::Unbounded)
    }

    /// Like [`Pagination::from_cursor`], falling back to the configured
    /// default page size and clamping requests above the configured maximum.
    pub fn with_settings(
        cursor: &Cursor,
        limit: Option<i64>,
        settings: &PaginationSettings,
    ) -> Result<Self, PaginationError> {
        let requested = limit.unwrap_or(settings.default_limit as i64);
        let mut page = Self::from_cursor(cursor, requested)?;

        if let Limit::Bounded(n) = page.limit
            && n > settings.max_limit
        {
            warn!(
                "Requested page size {n} exceeds the maximum of {}; clamping",
                settings.max_limit
            );
            page.limit = Limit::Bounded(settings.max_limit);
        }

        Ok(page)
    }

    /// Directive for a page size already known to be positive.
    pub(crate) fn bounded(cursor: &Cursor, limit: usize) -> Self {
        Self::with_limit(cursor, Limit::Bounded(limit))
    }

    fn with_limit(cursor: &Cursor, limit: Limit) -> Self {
        let predicate = predicate::build(cursor.positions());
        let orderings = cursor
            .positions()
            .iter()
            .map(|p| (p.column.clone(), p.direction))
            .collect();

        debug!(%predicate, ?limit, "Built pagination directive");

        Pagination {
            predicate,
            orderings,
            limit,
        }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn orderings(&self) -> &[(String, SortDirection)] {
        &self.orderings
    }

    pub fn limit(&self) -> Limit {
        self.limit
    }

    /// Pushes the predicate, the orderings and the limit onto a query.
    pub fn apply<Q: QueryAdapter + ?Sized>(&self, query: &mut Q) {
        query.add_condition(&self.predicate);
        for (column, direction) in &self.orderings {
            query.add_order(column, *direction);
        }
        if let Limit::Bounded(limit) = self.limit {
            query.set_limit(limit);
        }
    }

    /// Cursor that resumes after `page`.
    ///
    /// Only the last row is read, so `page` must be in the order the query
    /// returned it. An empty page yields the same sort keys with every value
    /// absent, which has the same shape as a first-page cursor; callers that
    /// need to tell the two apart track page emptiness themselves (see
    /// [`Paginator`](crate::pagination::paginator::Paginator)).
    pub fn advance<R: Row>(cursor: &Cursor, page: &[R]) -> Cursor {
        let Some(last) = page.last() else {
            debug!("Empty page; cursor exhausted");
            return cursor.cleared();
        };

        let next = cursor.with_values(
            cursor
                .positions()
                .iter()
                .map(|p| last.field_value(&p.column)),
        );

        if !next.is_bound() {
            warn!("Last row is missing one or more sort key fields");
        }
        debug!(rows = page.len(), "Advanced cursor");
        next
    }

    /// Fetches the page selected by this directive and derives the next cursor.
    pub async fn fetch<Q>(&self, cursor: &Cursor, mut query: Q) -> Result<Page<Q::Row>, Q::Error>
    where
        Q: QueryAdapter + Send,
    {
        self.apply(&mut query);
        let rows = query.execute().await?;
        let next = Self::advance(cursor, &rows);
        Ok(Page { rows, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::predicate::CompareOp;
    use async_trait::async_trait;
    use model::{
        core::value::Value,
        records::row::{FieldValue, RowData},
    };
    use std::convert::Infallible;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct RecordingQuery {
        conditions: Vec<Predicate>,
        orders: Vec<(String, SortDirection)>,
        limit: Option<usize>,
        rows: Vec<RowData>,
    }

    #[async_trait]
    impl QueryAdapter for RecordingQuery {
        type Row = RowData;
        type Error = Infallible;

        fn add_condition(&mut self, predicate: &Predicate) {
            self.conditions.push(predicate.clone());
        }

        fn add_order(&mut self, column: &str, direction: SortDirection) {
            self.orders.push((column.to_string(), direction));
        }

        fn set_limit(&mut self, limit: usize) {
            self.limit = Some(limit);
        }

        async fn execute(&self) -> Result<Vec<RowData>, Infallible> {
            let mut rows: Vec<RowData> = self
                .rows
                .iter()
                .filter(|row| self.conditions.iter().all(|c| c.matches(*row)))
                .cloned()
                .collect();
            if let Some(limit) = self.limit {
                rows.truncate(limit);
            }
            Ok(rows)
        }
    }

    fn row(title: &str, id: i64) -> RowData {
        RowData::new(
            "product",
            vec![FieldValue::new("title", title), FieldValue::new("id", id)],
        )
    }

    fn first_page() -> Cursor {
        Cursor::decode("+title,-id", "").unwrap()
    }

    #[test]
    fn test_limit_must_be_positive() {
        let cursor = first_page();

        assert_eq!(
            Pagination::from_cursor(&cursor, 0).unwrap_err(),
            PaginationError::InvalidLimit(0)
        );
        assert_eq!(
            Pagination::from_cursor(&cursor, -1).unwrap_err(),
            PaginationError::InvalidLimit(-1)
        );
        assert_eq!(
            Pagination::from_cursor(&cursor, 1).unwrap().limit(),
            Limit::Bounded(1)
        );
    }

    #[test]
    fn test_orderings_follow_sort_keys() {
        let page = Pagination::from_cursor(&first_page(), 5).unwrap();

        assert_eq!(
            page.orderings(),
            &[
                ("title".to_string(), SortDirection::Ascending),
                ("id".to_string(), SortDirection::Descending)
            ]
        );
        assert!(page.predicate().is_trivial());
    }

    #[test]
    fn test_bound_cursor_builds_predicate() {
        let cursor = first_page().with_values([Some(Value::from("Hat")), Some(Value::Int(4))]);
        let page = Pagination::unbounded(&cursor);

        let expected = Predicate::compare("title", CompareOp::Gt, Value::from("Hat")).or(
            Predicate::compare("title", CompareOp::Eq, Value::from("Hat"))
                .and(Predicate::compare("id", CompareOp::Lt, Value::Int(4))),
        );
        assert_eq!(page.predicate(), &expected);
        assert_eq!(page.limit(), Limit::Unbounded);
    }

    #[test]
    fn test_with_settings_uses_default_limit() {
        let settings = PaginationSettings::default().with_default_limit(7);
        let page = Pagination::with_settings(&first_page(), None, &settings).unwrap();

        assert_eq!(page.limit(), Limit::Bounded(7));
    }

    #[test]
    fn test_with_settings_rejects_non_positive_request() {
        let settings = PaginationSettings::default();
        let err = Pagination::with_settings(&first_page(), Some(0), &settings).unwrap_err();

        assert_eq!(err, PaginationError::InvalidLimit(0));
    }

    #[traced_test]
    #[test]
    fn test_with_settings_clamps_to_max_limit() {
        let settings = PaginationSettings::default().with_max_limit(50);
        let page = Pagination::with_settings(&first_page(), Some(500), &settings).unwrap();

        assert_eq!(page.limit(), Limit::Bounded(50));
        assert!(logs_contain("exceeds the maximum of 50"));
    }

    #[test]
    fn test_apply_pushes_directive_onto_query() {
        let cursor = first_page().with_values([Some(Value::from("Cap")), Some(Value::Int(2))]);
        let page = Pagination::from_cursor(&cursor, 3).unwrap();
        let mut query = RecordingQuery::default();

        page.apply(&mut query);

        assert_eq!(query.conditions, vec![page.predicate().clone()]);
        assert_eq!(query.orders, page.orderings());
        assert_eq!(query.limit, Some(3));
    }

    #[test]
    fn test_apply_unbounded_sets_no_limit() {
        let page = Pagination::unbounded(&first_page());
        let mut query = RecordingQuery::default();

        page.apply(&mut query);

        assert_eq!(query.limit, None);
        assert_eq!(query.orders.len(), 2);
    }

    #[test]
    fn test_advance_reads_last_row_only() {
        let cursor = first_page();
        let page = vec![row("Cap", 9), row("Hat", 1), row("Hat", 5)];

        let next = Pagination::advance(&cursor, &page);

        assert!(next.is_bound());
        assert_eq!(next.positions()[0].value, Some(Value::from("Hat")));
        assert_eq!(next.positions()[1].value, Some(Value::Int(5)));
        assert_eq!(next.sort_keys(), cursor.sort_keys());
    }

    #[test]
    fn test_advance_empty_page_clears_values() {
        let cursor = first_page().with_values([Some(Value::from("Trousers")), Some(Value::Int(1))]);

        let next = Pagination::advance::<RowData>(&cursor, &[]);

        assert!(next.is_unbound());
        assert_eq!(next.encode(), "");
        assert_eq!(next.sort_keys(), cursor.sort_keys());
    }

    #[traced_test]
    #[test]
    fn test_advance_warns_on_missing_sort_field() {
        let cursor = Cursor::decode("+title,+price", "").unwrap();

        let next = Pagination::advance(&cursor, &[row("Hat", 1)]);

        assert_eq!(next.positions()[0].value, Some(Value::from("Hat")));
        assert_eq!(next.positions()[1].value, None);
        assert!(logs_contain("missing one or more sort key fields"));
    }

    #[tokio::test]
    async fn test_fetch_returns_rows_and_next_cursor() {
        let cursor = Cursor::decode("+title,+id", "").unwrap();
        let page = Pagination::from_cursor(&cursor, 2).unwrap();
        let query = RecordingQuery {
            rows: vec![row("Cap", 1), row("Hat", 2), row("Hat", 3)],
            ..Default::default()
        };

        let fetched = page.fetch(&cursor, query).await.unwrap();

        assert_eq!(fetched.rows, vec![row("Cap", 1), row("Hat", 2)]);
        assert_eq!(
            fetched.next,
            cursor.with_values([Some(Value::from("Hat")), Some(Value::Int(2))])
        );
    }
}
