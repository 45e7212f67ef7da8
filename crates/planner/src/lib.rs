pub mod pagination;
pub mod query;
