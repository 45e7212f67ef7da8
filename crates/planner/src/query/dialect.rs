//! Defines the `Dialect` trait for database-specific SQL syntax.

use model::core::data_type::DataType;

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect. Embedded quote characters are doubled.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for the parameter at `index` (zero-based).
    fn get_placeholder(&self, index: usize) -> String;

    /// Column type used for a field of `data_type` in DDL.
    fn render_data_type(&self, data_type: &DataType) -> String;

    /// Returns the name of the dialect (e.g., "SQLite").
    fn name(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn get_placeholder(&self, index: usize) -> String {
        format!("?{}", index + 1)
    }

    // Storage classes; uuids, dates and timestamps are stored as text whose
    // lexical order matches their natural order.
    fn render_data_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Int | DataType::Uint | DataType::Boolean => "INTEGER",
            DataType::Float => "REAL",
            DataType::String | DataType::Uuid | DataType::Date | DataType::Timestamp => "TEXT",
        }
        .into()
    }

    fn name(&self) -> String {
        "SQLite".into()
    }
}
