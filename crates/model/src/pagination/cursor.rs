use crate::{
    core::value::Value,
    pagination::{codec, error::PaginationError, settings::PaginationSettings},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Order-spec prefix for this direction.
    pub fn prefix(&self) -> char {
        match self {
            SortDirection::Ascending => '+',
            SortDirection::Descending => '-',
        }
    }
}

/// One column of an order spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.prefix(), self.column)
    }
}

/// A sort key together with the value of the last row seen on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub column: String,
    pub direction: SortDirection,
    /// `None` until a page has been read: no constraint on this key.
    pub value: Option<Value>,
}

impl CursorPosition {
    pub fn new(column: &str, direction: SortDirection) -> Self {
        CursorPosition {
            column: column.to_string(),
            direction,
            value: None,
        }
    }

    pub fn with_value(&self, value: Option<Value>) -> Self {
        CursorPosition {
            column: self.column.clone(),
            direction: self.direction,
            value,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey {
            column: self.column.clone(),
            direction: self.direction,
        }
    }
}

/// Resumable position within an ordered result set.
///
/// Positions keep the left-to-right order of the order spec they were
/// decoded against; the first position is the primary sort key. A cursor is
/// never modified: advancing produces a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    positions: Vec<CursorPosition>,
}

impl Cursor {
    pub fn new(positions: Vec<CursorPosition>) -> Self {
        Cursor { positions }
    }

    /// Decodes a cursor from an order spec (e.g. `"+title,+id"`) and a token
    /// previously produced by [`Cursor::encode`] under the same order spec.
    /// An empty token yields the first-page cursor.
    pub fn decode(order: &str, token: &str) -> Result<Self, PaginationError> {
        Self::decode_with(order, token, &PaginationSettings::default())
    }

    pub fn decode_with(
        order: &str,
        token: &str,
        settings: &PaginationSettings,
    ) -> Result<Self, PaginationError> {
        let positions = required_positions(order)?;
        let positions = codec::decode_values(token, &positions, None, settings.max_token_len)?;
        let cursor = Cursor::new(positions);

        debug!(order, keys = cursor.len(), bound = cursor.is_bound(), "Decoded cursor");
        Ok(cursor)
    }

    /// Opaque token for this cursor. Empty when the cursor carries no values.
    pub fn encode(&self) -> String {
        codec::encode(&self.positions)
    }

    pub fn positions(&self) -> &[CursorPosition] {
        &self.positions
    }

    pub fn sort_keys(&self) -> Vec<SortKey> {
        self.positions.iter().map(CursorPosition::sort_key).collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True when every position carries a value (the cursor points past a row).
    pub fn is_bound(&self) -> bool {
        !self.positions.is_empty() && self.positions.iter().all(|p| p.value.is_some())
    }

    /// True when no position carries a value. First-page and exhausted
    /// cursors both look like this.
    pub fn is_unbound(&self) -> bool {
        self.positions.iter().all(|p| p.value.is_none())
    }

    /// Same sort keys with every value dropped.
    pub fn cleared(&self) -> Self {
        Cursor::new(self.positions.iter().map(|p| p.with_value(None)).collect())
    }

    /// Same sort keys with `values` substituted in order.
    ///
    /// Extra values are ignored and missing ones read as absent; callers that
    /// need a strict count go through the token decoder instead.
    pub fn with_values<I>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        let mut values = values.into_iter();
        Cursor::new(
            self.positions
                .iter()
                .map(|p| p.with_value(values.next().flatten()))
                .collect(),
        )
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

pub(crate) fn required_positions(order: &str) -> Result<Vec<CursorPosition>, PaginationError> {
    let positions = codec::positions_from_order_spec(order)?;
    if positions.is_empty() {
        return Err(PaginationError::InvalidOrderSpec(format!(
            "'{order}' names no sort keys"
        )));
    }
    Ok(positions)
}
