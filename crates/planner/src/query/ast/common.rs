//! Defines common, reusable AST nodes for building SQL queries.

use model::pagination::cursor::SortDirection;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        TableRef {
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl From<SortDirection> for OrderDir {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => OrderDir::Asc,
            SortDirection::Descending => OrderDir::Desc,
        }
    }
}
