use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// Any SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored value could not be read back as its declared type.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A value has no representation in the target store.
    #[error("Encode error: {0}")]
    Encode(String),

    /// A column used by the query is not declared by the entity schema.
    #[error("Unknown column '{column}' for entity {entity}")]
    UnknownColumn { entity: String, column: String },

    /// Another thread panicked while holding the connection.
    #[error("Connection lock poisoned")]
    LockPoisoned,
}
