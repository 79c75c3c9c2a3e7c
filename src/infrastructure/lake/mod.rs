pub mod catalog;
pub mod helper;
pub mod writer;

pub use catalog::{FileCatalog, SchemaRegistryCatalog};
pub use writer::{read_table, ParquetLakeWriter};
