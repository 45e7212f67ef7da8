pub mod adapter;
pub mod params;
pub mod row;

/// Stored timestamps use the cursor token's text form, so a value from an
/// untyped token binds as the same text the table holds.
pub(crate) use model::core::value::{DATE_FORMAT, TIMESTAMP_FORMAT};
