use crate::core::data_type::DataType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::{cmp::Ordering, fmt};
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed-width text form of timestamps, shared by cursor tokens and stores
/// that keep timestamps as text. Sorts chronologically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Boolean(bool),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Null,
}

/// Structural equality, except that `Int` and `Uint` holding the same number
/// are equal: the token payload carries no signedness.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Uint(a), Uint(b)) => a == b,
            (Int(a), Uint(b)) | (Uint(b), Int(a)) => u64::try_from(*a).is_ok_and(|a| a == *b),
            (Float(a), Float(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (Uuid(a), Uuid(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Null, Null) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Orders two values the way a database would compare them.
    ///
    /// Returns `None` when the pair has no meaningful order (mismatched types,
    /// NULL on either side, NaN).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (Uint(a), Uint(b)) => Some(a.cmp(b)),
            (Int(a), Uint(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Uint(a), Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (Uint(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Uint(b)) => a.partial_cmp(&(*b as f64)),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            // Untyped cursors carry uuids as their hyphenated text.
            (Uuid(a), String(b)) => Some(a.hyphenated().to_string().as_str().cmp(b.as_str())),
            (String(a), Uuid(b)) => Some(a.as_str().cmp(b.hyphenated().to_string().as_str())),
            (Date(a), Date(b)) => Some(a.cmp(b)),
            (Date(a), String(b)) => parse_date(b).map(|b| a.cmp(&b)),
            (String(a), Date(b)) => parse_date(a).map(|a| a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (Timestamp(a), String(b)) => parse_timestamp(b).map(|b| a.cmp(&b)),
            (String(a), Timestamp(b)) => parse_timestamp(a).map(|a| a.cmp(b)),
            _ => None,
        }
    }

    /// Converts a value read without a type hint into `data_type`.
    ///
    /// Text parses into uuids, dates and timestamps, and non-negative
    /// integers widen to unsigned. Every other pair is returned unchanged.
    pub fn coerce(self, data_type: DataType) -> Result<Value, String> {
        match (self, data_type) {
            (Value::String(s), DataType::Uuid | DataType::Date | DataType::Timestamp) => {
                Value::from_json_typed(&JsonValue::String(s), data_type)
            }
            (Value::Int(v), DataType::Uint) if v >= 0 => Ok(Value::Uint(v as u64)),
            (value, _) => Ok(value),
        }
    }

    pub fn equal(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Int(_) => Some(DataType::Int),
            Value::Uint(_) => Some(DataType::Uint),
            Value::Float(_) => Some(DataType::Float),
            Value::String(_) => Some(DataType::String),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Uuid(_) => Some(DataType::Uuid),
            Value::Date(_) => Some(DataType::Date),
            Value::Timestamp(_) => Some(DataType::Timestamp),
            Value::Null => None,
        }
    }

    /// Wire form of the value inside a cursor token.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Int(v) => JsonValue::from(*v),
            Value::Uint(v) => JsonValue::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(v) => JsonValue::String(v.clone()),
            Value::Boolean(v) => JsonValue::Bool(*v),
            Value::Uuid(v) => JsonValue::String(v.hyphenated().to_string()),
            Value::Date(v) => JsonValue::String(v.format(DATE_FORMAT).to_string()),
            Value::Timestamp(v) => JsonValue::String(v.format(TIMESTAMP_FORMAT).to_string()),
            Value::Null => JsonValue::Null,
        }
    }

    /// Reads a JSON scalar back into its natural value, with no type hint.
    pub fn from_json(json: &JsonValue) -> Result<Self, String> {
        match json {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::Uint(u))
                } else {
                    n.as_f64()
                        .map(Value::Float)
                        .ok_or_else(|| format!("unsupported number: {n}"))
                }
            }
            JsonValue::String(s) => Ok(Value::String(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => {
                Err(format!("expected a scalar, found {json}"))
            }
        }
    }

    /// Reads a JSON scalar as a value of the declared column type.
    pub fn from_json_typed(json: &JsonValue, data_type: DataType) -> Result<Self, String> {
        if json.is_null() {
            return Ok(Value::Null);
        }

        let mismatch = || format!("expected {data_type}, found {json}");

        match data_type {
            DataType::Int => json.as_i64().map(Value::Int).ok_or_else(mismatch),
            DataType::Uint => json.as_u64().map(Value::Uint).ok_or_else(mismatch),
            DataType::Float => json.as_f64().map(Value::Float).ok_or_else(mismatch),
            DataType::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(mismatch),
            DataType::String => json
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(mismatch),
            DataType::Uuid => {
                let text = json.as_str().ok_or_else(mismatch)?;
                Uuid::parse_str(text)
                    .map(Value::Uuid)
                    .map_err(|e| format!("invalid uuid '{text}': {e}"))
            }
            DataType::Date => {
                let text = json.as_str().ok_or_else(mismatch)?;
                NaiveDate::parse_from_str(text, DATE_FORMAT)
                    .map(Value::Date)
                    .map_err(|e| format!("invalid date '{text}': {e}"))
            }
            DataType::Timestamp => {
                let text = json.as_str().ok_or_else(mismatch)?;
                DateTime::parse_from_rfc3339(text)
                    .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
                    .map_err(|e| format!("invalid timestamp '{text}': {e}"))
            }
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "'{v}'"),
            Value::Date(v) => write!(f, "'{}'", v.format(DATE_FORMAT)),
            Value::Timestamp(v) => write!(f, "'{}'", v.format(TIMESTAMP_FORMAT)),
            Value::Null => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compare_mixed_integers() {
        assert_eq!(Value::Int(-1).compare(&Value::Uint(1)), Some(Ordering::Less));
        assert_eq!(Value::Uint(u64::MAX).compare(&Value::Int(0)), Some(Ordering::Greater));
        assert_eq!(Value::Int(2).compare(&Value::Float(2.0)), Some(Ordering::Equal));
    }

    #[test]
    fn test_compare_null_is_unordered() {
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
        assert!(!Value::Null.equal(&Value::Null));
    }

    #[test]
    fn test_compare_uuid_against_its_text() {
        let id = Uuid::parse_str("5c1a2f0e-9d44-4b8a-8f4e-2f6f3d8a9b10").unwrap();
        let text = Value::String("5c1a2f0e-9d44-4b8a-8f4e-2f6f3d8a9b10".to_string());
        assert!(Value::Uuid(id).equal(&text));
        assert!(text.equal(&Value::Uuid(id)));
    }

    #[test]
    fn test_compare_timestamp_and_date_against_text() {
        let ts: DateTime<Utc> = "2024-05-01T09:00:00Z".parse().unwrap();
        let same = Value::String("2024-05-01T09:00:00.000000Z".to_string());
        let later = Value::String("2024-05-01T09:01:00Z".to_string());
        assert!(Value::Timestamp(ts).equal(&same));
        assert_eq!(Value::Timestamp(ts).compare(&later), Some(Ordering::Less));
        assert_eq!(later.compare(&Value::Timestamp(ts)), Some(Ordering::Greater));
        assert_eq!(Value::Timestamp(ts).compare(&Value::from("yesterday")), None);

        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(date.equal(&Value::from("2024-05-01")));
        assert_eq!(date.compare(&Value::from("2024-04-30")), Some(Ordering::Greater));
    }

    #[test]
    fn test_timestamp_wire_form_is_fixed_width() {
        let ts: DateTime<Utc> = "2024-05-01T09:00:00Z".parse().unwrap();
        assert_eq!(Value::Timestamp(ts).to_json(), json!("2024-05-01T09:00:00.000000Z"));
        assert_eq!(Value::Timestamp(ts).to_string(), "'2024-05-01T09:00:00.000000Z'");
    }

    #[test]
    fn test_coerce_untyped_text() {
        let ts: DateTime<Utc> = "2024-05-01T09:00:00Z".parse().unwrap();
        assert_eq!(
            Value::from("2024-05-01T09:00:00.000000Z").coerce(DataType::Timestamp).unwrap(),
            Value::Timestamp(ts)
        );
        assert_eq!(
            Value::from("2024-05-01").coerce(DataType::Date).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        );
        assert!(matches!(
            Value::Int(5).coerce(DataType::Uint).unwrap(),
            Value::Uint(5)
        ));
        assert_eq!(Value::from("Hat").coerce(DataType::String).unwrap(), Value::from("Hat"));
        assert!(Value::from("soon").coerce(DataType::Timestamp).is_err());
    }

    #[test]
    fn test_int_and_uint_of_same_number_are_equal() {
        assert_eq!(Value::Int(5), Value::Uint(5));
        assert_eq!(Value::Uint(5), Value::Int(5));
        assert_ne!(Value::Int(-1), Value::Uint(u64::MAX));
        assert_ne!(Value::Int(5), Value::Float(5.0));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn test_from_json_natural_types() {
        assert_eq!(Value::from_json(&json!(7)).unwrap(), Value::Int(7));
        assert_eq!(Value::from_json(&json!(u64::MAX)).unwrap(), Value::Uint(u64::MAX));
        assert_eq!(Value::from_json(&json!(1.5)).unwrap(), Value::Float(1.5));
        assert_eq!(Value::from_json(&json!("Hat")).unwrap(), Value::from("Hat"));
        assert_eq!(Value::from_json(&json!(true)).unwrap(), Value::Boolean(true));
        assert!(Value::from_json(&json!([1])).is_err());
        assert!(Value::from_json(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_from_json_typed_restores_rich_types() {
        let ts: DateTime<Utc> = "2024-03-01T10:15:30.123456Z".parse().unwrap();
        let json = Value::Timestamp(ts).to_json();
        assert_eq!(
            Value::from_json_typed(&json, DataType::Timestamp).unwrap(),
            Value::Timestamp(ts)
        );

        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(Value::Date(date).to_json(), json!("2023-12-31"));
        assert_eq!(
            Value::from_json_typed(&json!("2023-12-31"), DataType::Date).unwrap(),
            Value::Date(date)
        );
    }

    #[test]
    fn test_from_json_typed_rejects_mismatch() {
        assert!(Value::from_json_typed(&json!("abc"), DataType::Int).is_err());
        assert!(Value::from_json_typed(&json!(-1), DataType::Uint).is_err());
        assert!(Value::from_json_typed(&json!("not-a-uuid"), DataType::Uuid).is_err());
        assert!(Value::from_json_typed(&json!(1), DataType::String).is_err());
    }

    #[test]
    fn test_non_finite_float_has_no_wire_form() {
        assert_eq!(Value::Float(f64::NAN).to_json(), JsonValue::Null);
    }
}
