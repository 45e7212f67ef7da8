use crate::pagination::predicate::Predicate;
use async_trait::async_trait;
use model::{pagination::cursor::SortDirection, records::row::Row};

/// Query-builder capability a pagination directive is applied to.
///
/// Conditions added through `add_condition` are combined with `AND`; orders
/// apply in the sequence they were added. Executing the query is the only
/// step that performs I/O.
#[async_trait]
pub trait QueryAdapter: Send + Sync {
    type Row: Row + Send;
    type Error: std::error::Error + Send + Sync + 'static;

    fn add_condition(&mut self, predicate: &Predicate);

    fn add_order(&mut self, column: &str, direction: SortDirection);

    fn set_limit(&mut self, limit: usize);

    async fn execute(&self) -> Result<Vec<Self::Row>, Self::Error>;
}
