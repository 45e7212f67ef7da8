pub mod codec;
pub mod cursor;
pub mod error;
pub mod settings;
