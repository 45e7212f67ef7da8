//! Keyset predicate construction.
//!
//! For sort keys `k1, k2, …, kn` with last-seen values `v1, v2, …, vn` the
//! predicate selects rows strictly after the cursor in lexicographic order:
//!
//! ```text
//! k1 > v1 OR (k1 = v1 AND (k2 > v2 OR (k2 = v2 AND (… kn > vn))))
//! ```
//!
//! with `<` in place of `>` for descending keys. The tree is built from the
//! first key to the last and holds no query-builder vocabulary; `to_expr`
//! lowers it to the statement AST in one step.

use crate::query::{
    ast::expr::{BinaryOperator, Expr},
    ident, value,
};
use model::{
    core::value::Value,
    pagination::cursor::{CursorPosition, SortDirection},
    records::row::Row,
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Gt,
    Lt,
    Eq,
}

impl CompareOp {
    fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Eq => "=",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Eq => ordering == Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Matches every row.
    True,
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn compare(column: &str, op: CompareOp, value: Value) -> Self {
        Predicate::Compare {
            column: column.to_string(),
            op,
            value,
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn is_trivial(&self) -> bool {
        matches!(self, Predicate::True)
    }

    /// Rebuilds the tree with every compared value passed through `f`.
    pub fn try_map_values<E, F>(&self, f: &mut F) -> Result<Predicate, E>
    where
        F: FnMut(&str, &Value) -> Result<Value, E>,
    {
        Ok(match self {
            Predicate::True => Predicate::True,
            Predicate::Compare { column, op, value } => Predicate::Compare {
                column: column.clone(),
                op: *op,
                value: f(column, value)?,
            },
            Predicate::And(left, right) => left.try_map_values(f)?.and(right.try_map_values(f)?),
            Predicate::Or(left, right) => left.try_map_values(f)?.or(right.try_map_values(f)?),
        })
    }

    /// Lowers the predicate to a statement expression. `None` stands for a
    /// condition that holds for every row.
    pub fn to_expr(&self) -> Option<Expr> {
        match self {
            Predicate::True => None,
            Predicate::Compare { column, op, value: v } => {
                let op = match op {
                    CompareOp::Gt => BinaryOperator::Gt,
                    CompareOp::Lt => BinaryOperator::Lt,
                    CompareOp::Eq => BinaryOperator::Eq,
                };
                Some(Expr::binary(ident(column), op, value(v.clone())))
            }
            Predicate::And(left, right) => match (left.to_expr(), right.to_expr()) {
                (Some(l), Some(r)) => Some(l.and(r)),
                (l, None) => l,
                (None, r) => r,
            },
            Predicate::Or(left, right) => match (left.to_expr(), right.to_expr()) {
                (Some(l), Some(r)) => Some(l.or(r)),
                _ => None,
            },
        }
    }

    /// Evaluates the predicate against a row. A comparison against a missing
    /// field, a NULL, or an incomparable value does not match.
    pub fn matches<R: Row + ?Sized>(&self, row: &R) -> bool {
        match self {
            Predicate::True => true,
            Predicate::Compare { column, op, value } => row
                .field_value(column)
                .and_then(|field| field.compare(value))
                .is_some_and(|ordering| op.holds(ordering)),
            Predicate::And(left, right) => left.matches(row) && right.matches(row),
            Predicate::Or(left, right) => left.matches(row) || right.matches(row),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::True => f.write_str("TRUE"),
            Predicate::Compare { column, op, value } => {
                write!(f, "{column} {} {value}", op.symbol())
            }
            Predicate::And(left, right) => write!(f, "({left} AND {right})"),
            Predicate::Or(left, right) => write!(f, "({left} OR {right})"),
        }
    }
}

/// Builds the "strictly after the cursor" predicate for `positions`.
///
/// A position without a value adds no constraint: the builder moves straight
/// on to the remaining positions. An all-absent cursor therefore yields
/// [`Predicate::True`].
///
/// Rows are neither skipped nor repeated across pages only if the full key
/// sequence is unique per row (e.g. it ends with a primary key); that is the
/// caller's responsibility.
pub fn build(positions: &[CursorPosition]) -> Predicate {
    let Some((head, tail)) = positions.split_first() else {
        return Predicate::True;
    };

    let Some(value) = &head.value else {
        return build(tail);
    };

    let op = match head.direction {
        SortDirection::Ascending => CompareOp::Gt,
        SortDirection::Descending => CompareOp::Lt,
    };
    let cmp = Predicate::compare(&head.column, op, value.clone());

    if tail.is_empty() {
        return cmp;
    }

    let eq = Predicate::compare(&head.column, CompareOp::Eq, value.clone());
    cmp.or(eq.and(build(tail)))
}
