//! Cursor token codec.
//!
//! A token is the base64url (unpadded) encoding of a JSON array holding one
//! scalar per sort key, in order-spec order. Column names and directions are
//! not part of the token; they are re-derived from the order spec on every
//! decode, so a token is only meaningful next to the order spec it was
//! produced under.

use crate::{
    core::value::Value,
    pagination::{
        cursor::{CursorPosition, SortDirection},
        error::PaginationError,
        settings::PaginationSettings,
    },
    schema::entity::EntitySchema,
};
use base64::{Engine, engine::general_purpose};
use serde_json::Value as JsonValue;

const SEPARATOR: char = ',';
const ASC: char = '+';
const DESC: char = '-';

/// Parses a comma-separated order spec such as `"+title, -created_at,id"`.
///
/// Fields are trimmed and empty fields skipped; a missing prefix means
/// ascending. Every returned position has no value.
pub fn positions_from_order_spec(order: &str) -> Result<Vec<CursorPosition>, PaginationError> {
    let mut positions = Vec::new();

    for field in order.split(SEPARATOR) {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }

        let (direction, column) = if let Some(rest) = field.strip_prefix(ASC) {
            (SortDirection::Ascending, rest)
        } else if let Some(rest) = field.strip_prefix(DESC) {
            (SortDirection::Descending, rest)
        } else {
            (SortDirection::Ascending, field)
        };

        let column = column.trim();
        if column.is_empty() {
            return Err(PaginationError::InvalidOrderSpec(format!(
                "'{field}' has a direction but no column"
            )));
        }

        positions.push(CursorPosition::new(column, direction));
    }

    Ok(positions)
}

/// Merges the values carried by `token` into `positions`.
///
/// An empty token leaves every value absent (first page). Otherwise the token
/// must decode to exactly one scalar per position.
///
/// Without a schema each scalar keeps its JSON type: numbers come back as
/// `Int` where they fit, and uuids, dates and timestamps as `String`.
pub fn values_from_token(
    token: &str,
    positions: &[CursorPosition],
) -> Result<Vec<CursorPosition>, PaginationError> {
    decode_values(
        token,
        positions,
        None,
        PaginationSettings::default().max_token_len,
    )
}

/// Serializes the values of `positions` into an opaque token.
///
/// Returns an empty string when there is nothing to resume from: no
/// positions, or no position carrying a value.
pub fn encode(positions: &[CursorPosition]) -> String {
    if positions.iter().all(|p| p.value.is_none()) {
        return String::new();
    }

    let values = positions
        .iter()
        .map(|p| p.value.as_ref().map_or(JsonValue::Null, Value::to_json))
        .collect();
    let payload = JsonValue::Array(values).to_string();

    general_purpose::URL_SAFE_NO_PAD.encode(payload)
}

pub(crate) fn decode_values(
    token: &str,
    positions: &[CursorPosition],
    schema: Option<&EntitySchema>,
    max_token_len: usize,
) -> Result<Vec<CursorPosition>, PaginationError> {
    if token.is_empty() {
        return Ok(positions.iter().map(|p| p.with_value(None)).collect());
    }

    if token.len() > max_token_len {
        return Err(PaginationError::InvalidCursorToken(format!(
            "token is {} bytes long (max {max_token_len})",
            token.len()
        )));
    }

    let scalars = decode_payload(token)?;
    if scalars.len() != positions.len() {
        return Err(PaginationError::InvalidCursorToken(format!(
            "token holds {} values but the order spec has {} keys",
            scalars.len(),
            positions.len()
        )));
    }

    positions
        .iter()
        .zip(scalars.iter())
        .map(|(position, scalar)| {
            let value = decode_scalar(scalar, &position.column, schema)?;
            Ok(position.with_value(value))
        })
        .collect()
}

fn decode_payload(token: &str) -> Result<Vec<JsonValue>, PaginationError> {
    let mut padded = token.to_string();
    let remainder = padded.len() % 4;
    if remainder != 0 {
        padded.push_str(&"=".repeat(4 - remainder));
    }

    let data = general_purpose::URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| PaginationError::InvalidCursorToken(format!("malformed base64: {e}")))?;

    let payload: JsonValue = serde_json::from_slice(&data)
        .map_err(|e| PaginationError::InvalidCursorToken(format!("malformed payload: {e}")))?;

    match payload {
        JsonValue::Array(values) => Ok(values),
        other => Err(PaginationError::InvalidCursorToken(format!(
            "expected an array of values, found {other}"
        ))),
    }
}

fn decode_scalar(
    scalar: &JsonValue,
    column: &str,
    schema: Option<&EntitySchema>,
) -> Result<Option<Value>, PaginationError> {
    if scalar.is_null() {
        return Ok(None);
    }

    let data_type = schema.and_then(|s| s.data_type(column));
    let value = match data_type {
        Some(data_type) => Value::from_json_typed(scalar, data_type),
        None => Value::from_json(scalar),
    };

    value
        .map(Some)
        .map_err(|e| PaginationError::InvalidCursorToken(format!("column '{column}': {e}")))
}
