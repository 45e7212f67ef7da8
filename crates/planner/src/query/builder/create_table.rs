//! Provides a fluent builder for constructing `CreateTable` ASTs.

use crate::query::ast::{
    common::TableRef,
    create_table::{ColumnDef, CreateTable},
};
use model::{core::data_type::DataType, schema::entity::EntitySchema};

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    ast: CreateTable,
}

impl CreateTableBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: CreateTable {
                table,
                ..Default::default()
            },
        }
    }

    /// Starts a table whose columns are the fields of `schema`, in
    /// declaration order.
    pub fn from_schema(table: TableRef, schema: &EntitySchema) -> Self {
        schema
            .fields
            .iter()
            .fold(Self::new(table), |builder, field| {
                builder.column(&field.name, field.data_type, false)
            })
    }

    pub fn if_not_exists(mut self) -> Self {
        self.ast.if_not_exists = true;
        self
    }

    pub fn column(mut self, name: &str, data_type: DataType, is_nullable: bool) -> Self {
        self.ast.columns.push(ColumnDef {
            name: name.to_string(),
            data_type,
            is_nullable,
        });
        self
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.ast.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn build(self) -> CreateTable {
        self.ast
    }
}
