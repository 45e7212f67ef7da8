pub mod adapter;
pub mod coordinator;
pub mod paginator;
pub mod predicate;
