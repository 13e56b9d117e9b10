pub mod reader;
pub mod schema;

pub use reader::read_csv;
pub use schema::{validate, ValidatedTable};
