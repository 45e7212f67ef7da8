pub mod create_table;
pub mod insert;
pub mod select;
