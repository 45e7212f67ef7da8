use serde::{Deserialize, Serialize};
use std::fmt;

/// Column types known to the entity schema registry.
///
/// Cursor tokens carry plain JSON scalars; the declared type of a sort column
/// is what turns `"0b7e…"` back into a `Value::Uuid` rather than a string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Uint,
    Float,
    String,
    Boolean,
    Uuid,
    Date,
    Timestamp,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "int",
            DataType::Uint => "uint",
            DataType::Float => "float",
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Uuid => "uuid",
            DataType::Date => "date",
            DataType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}
