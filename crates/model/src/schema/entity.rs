use crate::{
    core::data_type::DataType,
    pagination::{
        codec,
        cursor::{Cursor, required_positions},
        error::PaginationError,
        settings::PaginationSettings,
    },
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub data_type: DataType,
}

/// Field registry for one entity.
///
/// Built once and passed by reference wherever a cursor for the entity is
/// decoded. It restricts order specs to declared columns and gives token
/// scalars their declared types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl EntitySchema {
    pub fn new(name: &str) -> Self {
        EntitySchema {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Declares a field. Redeclaring a name replaces its type.
    pub fn field(mut self, name: &str, data_type: DataType) -> Self {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.data_type = data_type,
            None => self.fields.push(FieldDef {
                name: name.to_string(),
                data_type,
            }),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn data_type(&self, name: &str) -> Option<DataType> {
        self.get(name).map(|f| f.data_type)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Decodes a cursor for this entity. Every sort column must be a declared
    /// field, and every token value must fit its column's type.
    pub fn decode_cursor(&self, order: &str, token: &str) -> Result<Cursor, PaginationError> {
        self.decode_cursor_with(order, token, &PaginationSettings::default())
    }

    pub fn decode_cursor_with(
        &self,
        order: &str,
        token: &str,
        settings: &PaginationSettings,
    ) -> Result<Cursor, PaginationError> {
        let positions = required_positions(order)?;

        if let Some(unknown) = positions.iter().find(|p| self.get(&p.column).is_none()) {
            return Err(PaginationError::InvalidOrderSpec(format!(
                "'{}' is not a field of {}",
                unknown.column, self.name
            )));
        }

        let positions =
            codec::decode_values(token, &positions, Some(self), settings.max_token_len)?;
        let cursor = Cursor::new(positions);

        debug!(
            entity = %self.name,
            order,
            bound = cursor.is_bound(),
            "Decoded entity cursor"
        );
        Ok(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn product() -> EntitySchema {
        EntitySchema::new("product")
            .field("id", DataType::Uuid)
            .field("title", DataType::String)
            .field("created_at", DataType::Timestamp)
    }

    #[test]
    fn test_rejects_unknown_sort_column() {
        let err = product().decode_cursor("+title,+price", "").unwrap_err();
        assert_eq!(
            err,
            PaginationError::InvalidOrderSpec("'price' is not a field of product".into())
        );
    }

    #[test]
    fn test_round_trip_restores_declared_types() {
        let schema = product();
        let id = Uuid::new_v4();
        let created: DateTime<Utc> = "2021-06-01T08:00:00.5Z".parse().unwrap();

        let bound = schema
            .decode_cursor("-created_at,+id", "")
            .unwrap()
            .with_values([Some(Value::Timestamp(created)), Some(Value::Uuid(id))]);

        let decoded = schema.decode_cursor("-created_at,+id", &bound.encode()).unwrap();
        assert_eq!(decoded, bound);
    }

    #[test]
    fn test_rejects_value_of_wrong_type() {
        let schema = product();
        let token = Cursor::decode("+id", "")
            .unwrap()
            .with_values([Some(Value::Int(5))])
            .encode();

        let err = schema.decode_cursor("+id", &token).unwrap_err();
        assert!(matches!(err, PaginationError::InvalidCursorToken(_)));
    }

    #[test]
    fn test_redeclared_field_replaces_type() {
        let schema = product().field("title", DataType::Int);
        assert_eq!(schema.data_type("title"), Some(DataType::Int));
        assert_eq!(schema.column_names(), vec!["id", "title", "created_at"]);
    }
}
