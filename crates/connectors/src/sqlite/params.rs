use crate::{
    error::AdapterError,
    sqlite::{DATE_FORMAT, TIMESTAMP_FORMAT},
};
use model::core::value::Value;
use rusqlite::types::Value as SqlValue;

/// Converts a value into its SQLite storage form.
///
/// Uuids, dates and timestamps are stored as text so that SQLite's text
/// ordering agrees with [`Value::compare`].
pub fn to_sql_value(value: Value) -> Result<SqlValue, AdapterError> {
    let param = match value {
        Value::Int(v) => SqlValue::Integer(v),
        Value::Uint(v) => SqlValue::Integer(
            i64::try_from(v).map_err(|_| AdapterError::Encode(format!("{v} overflows INTEGER")))?,
        ),
        Value::Float(v) => SqlValue::Real(v),
        Value::String(v) => SqlValue::Text(v),
        Value::Boolean(v) => SqlValue::Integer(i64::from(v)),
        Value::Uuid(v) => SqlValue::Text(v.hyphenated().to_string()),
        Value::Date(v) => SqlValue::Text(v.format(DATE_FORMAT).to_string()),
        Value::Timestamp(v) => SqlValue::Text(v.format(TIMESTAMP_FORMAT).to_string()),
        Value::Null => SqlValue::Null,
    };
    Ok(param)
}

pub fn to_sql_values(values: Vec<Value>) -> Result<Vec<SqlValue>, AdapterError> {
    values.into_iter().map(to_sql_value).collect()
}
