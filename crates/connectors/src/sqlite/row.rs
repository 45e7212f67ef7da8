use crate::{
    error::AdapterError,
    sqlite::{DATE_FORMAT, TIMESTAMP_FORMAT},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::{
    core::{data_type::DataType, value::Value},
    records::row::{FieldValue, RowData},
    schema::entity::EntitySchema,
};
use rusqlite::types::ValueRef;
use uuid::Uuid;

/// Reads a result row whose columns are the schema's fields, in order.
pub fn decode_row(row: &rusqlite::Row<'_>, schema: &EntitySchema) -> Result<RowData, AdapterError> {
    let field_values = schema
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| -> Result<FieldValue, AdapterError> {
            let value = decode_value(row.get_ref(idx)?, field.data_type)
                .map_err(|e| AdapterError::Decode(format!("{}.{}: {e}", schema.name, field.name)))?;
            Ok(FieldValue {
                name: field.name.clone(),
                value: Some(value),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RowData::new(&schema.name, field_values))
}

/// Converts one stored column to a value of its declared type.
pub fn decode_value(raw: ValueRef<'_>, data_type: DataType) -> Result<Value, String> {
    let mismatch = || format!("expected {data_type}, found {:?}", raw.data_type());

    match (data_type, raw) {
        (_, ValueRef::Null) => Ok(Value::Null),
        (DataType::Int, ValueRef::Integer(v)) => Ok(Value::Int(v)),
        (DataType::Uint, ValueRef::Integer(v)) => u64::try_from(v)
            .map(Value::Uint)
            .map_err(|_| format!("{v} is negative")),
        (DataType::Float, ValueRef::Real(v)) => Ok(Value::Float(v)),
        (DataType::Float, ValueRef::Integer(v)) => Ok(Value::Float(v as f64)),
        (DataType::Boolean, ValueRef::Integer(v)) => Ok(Value::Boolean(v != 0)),
        (DataType::String, ValueRef::Text(bytes)) => Ok(Value::String(text(bytes)?.to_string())),
        (DataType::Uuid, ValueRef::Text(bytes)) => {
            let text = text(bytes)?;
            Uuid::parse_str(text)
                .map(Value::Uuid)
                .map_err(|e| format!("invalid uuid '{text}': {e}"))
        }
        (DataType::Uuid, ValueRef::Blob(bytes)) => Uuid::from_slice(bytes)
            .map(Value::Uuid)
            .map_err(|e| format!("invalid uuid blob: {e}")),
        (DataType::Date, ValueRef::Text(bytes)) => {
            let text = text(bytes)?;
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|e| format!("invalid date '{text}': {e}"))
        }
        (DataType::Timestamp, ValueRef::Text(bytes)) => parse_timestamp(text(bytes)?),
        _ => Err(mismatch()),
    }
}

fn text(bytes: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|e| format!("invalid utf-8: {e}"))
}

fn parse_timestamp(text: &str) -> Result<Value, String> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
        return Ok(Value::Timestamp(ts.and_utc()));
    }
    DateTime::parse_from_rfc3339(text)
        .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
        .map_err(|e| format!("invalid timestamp '{text}': {e}"))
}
