use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// Named-field access over a result row.
///
/// Column names are matched case-sensitively against the sort keys of a
/// cursor. A field the row does not carry reads as `None`.
pub trait Row {
    fn field_value(&self, column: &str) -> Option<Value>;
}

impl<R: Row + ?Sized> Row for &R {
    fn field_value(&self, column: &str) -> Option<Value> {
        (**self).field_value(column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub value: Option<Value>,
}

impl FieldValue {
    pub fn new(name: &str, value: impl Into<Value>) -> Self {
        FieldValue {
            name: name.to_string(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values.iter().find(|f| f.name == field)
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .and_then(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }
}

impl Row for RowData {
    fn field_value(&self, column: &str) -> Option<Value> {
        self.get(column).and_then(|f| f.value.clone())
    }
}
