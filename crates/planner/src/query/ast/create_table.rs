//! Defines the AST for a CREATE TABLE statement.

use crate::query::ast::common::TableRef;
use model::core::data_type::DataType;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTable {
    pub table: TableRef,
    pub columns: Vec<ColumnDef>,
    /// Composite primary key, rendered as a table constraint.
    pub primary_key: Vec<String>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub is_nullable: bool,
}
