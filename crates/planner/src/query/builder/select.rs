//! Provides a type-safe, fluent builder for constructing `Select` ASTs.

// --- Typestate Marker Structs ---
// These zero-sized structs represent the state of the builder.
// They ensure that methods are called in the correct SQL order at compile time.

use crate::{
    pagination::coordinator::{Limit, Pagination},
    query::ast::{
        common::{OrderDir, TableRef},
        expr::Expr,
        select::{FromClause, OrderByExpr, Select},
    },
};
use model::core::value::Value;

/// The initial state of the builder before any clauses have been added.
#[derive(Debug, Default, Clone)]
pub struct InitialState;

/// The state after the `SELECT` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// The state after the `FROM` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct FromState;

// --- The Main Builder ---

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    state: State,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

/// Implementation for the initial state of the builder.
impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: InitialState,
        }
    }

    /// Adds a `SELECT` clause with a list of columns.
    /// This is the entry point for building a select query.
    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        SelectBuilder {
            ast: self.ast,
            state: SelectState,
        }
    }
}

/// Implementation for the state after `SELECT` has been called.
/// The only valid next step is to specify a `FROM` table.
impl SelectBuilder<SelectState> {
    /// Adds a `FROM` clause specifying the primary table.
    pub fn from(mut self, table: TableRef) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause { table });
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }
}

/// Implementation for the state after `FROM` has been called.
impl SelectBuilder<FromState> {
    /// Adds a `WHERE` condition. A condition already present is kept and
    /// combined with the new one using `AND`.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(match self.ast.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Adds an `ORDER BY` clause to the query.
    pub fn order_by(mut self, expr: Expr, direction: Option<OrderDir>) -> Self {
        self.ast.order_by.push(OrderByExpr { expr, direction });
        self
    }

    /// Adds a `LIMIT` clause to the query.
    pub fn limit(mut self, limit: Expr) -> Self {
        self.ast.limit = Some(limit);
        self
    }

    /// Applies a keyset pagination directive: the cursor predicate (when it
    /// constrains anything), the sort keys in order, and the page size.
    pub fn paginate(mut self, page: &Pagination) -> Self {
        if let Some(condition) = page.predicate().to_expr() {
            self = self.where_clause(condition);
        }

        for (column, direction) in page.orderings() {
            self = self.order_by(crate::query::ident(column), Some(OrderDir::from(*direction)));
        }

        if let Limit::Bounded(limit) = page.limit() {
            self = self.limit(Expr::Value(Value::Uint(limit as u64)));
        }

        self
    }

    /// Finalizes and returns the constructed `Select` AST.
    pub fn build(self) -> Select {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        pagination::coordinator::Pagination,
        query::{
            ast::{
                common::{OrderDir, TableRef},
                expr::{BinaryOperator, Expr, Ident},
            },
            builder::select::SelectBuilder,
        },
    };
    use model::{core::value::Value, pagination::cursor::Cursor};

    fn ident(name: &str) -> Expr {
        Expr::Identifier(Ident {
            name: name.to_string(),
        })
    }

    fn value(val: Value) -> Expr {
        Expr::Value(val)
    }

    fn table(name: &str) -> TableRef {
        TableRef::new(name)
    }

    #[test]
    fn test_build_simple_select() {
        let ast = SelectBuilder::new()
            .select(vec![ident("id"), ident("title")])
            .from(table("products"))
            .build();

        assert_eq!(ast.columns, vec![ident("id"), ident("title")]);
        assert_eq!(ast.from.unwrap().table.name, "products");
        assert!(ast.where_clause.is_none());
    }

    #[test]
    fn test_where_clauses_are_combined_with_and() {
        let first = Expr::binary(ident("a"), BinaryOperator::Eq, value(Value::Int(1)));
        let second = Expr::binary(ident("b"), BinaryOperator::Gt, value(Value::Int(2)));

        let ast = SelectBuilder::new()
            .select(vec![ident("a")])
            .from(table("t"))
            .where_clause(first.clone())
            .where_clause(second.clone())
            .build();

        assert_eq!(ast.where_clause, Some(first.and(second)));
    }

    #[test]
    fn test_paginate_first_page_adds_order_and_limit_only() {
        let cursor = Cursor::decode("+title,-id", "").unwrap();
        let page = Pagination::from_cursor(&cursor, 2).unwrap();

        let ast = SelectBuilder::new()
            .select(vec![ident("id"), ident("title")])
            .from(table("products"))
            .paginate(&page)
            .build();

        assert!(ast.where_clause.is_none());
        assert_eq!(ast.order_by.len(), 2);
        assert_eq!(ast.order_by[0].expr, ident("title"));
        assert_eq!(ast.order_by[0].direction, Some(OrderDir::Asc));
        assert_eq!(ast.order_by[1].direction, Some(OrderDir::Desc));
        assert_eq!(ast.limit, Some(value(Value::Uint(2))));
    }

    #[test]
    fn test_paginate_unbounded_has_no_limit() {
        let cursor = Cursor::decode("+id", "")
            .unwrap()
            .with_values([Some(Value::Int(10))]);
        let page = Pagination::unbounded(&cursor);

        let ast = SelectBuilder::new()
            .select(vec![ident("id")])
            .from(table("products"))
            .paginate(&page)
            .build();

        assert_eq!(
            ast.where_clause,
            Some(Expr::binary(
                ident("id"),
                BinaryOperator::Gt,
                value(Value::Int(10))
            ))
        );
        assert!(ast.limit.is_none());
    }
}
