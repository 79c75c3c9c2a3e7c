// Parquet row encoding and catalog schemas for lake tables
pub mod parquet_converter;
pub mod schema_helper;

pub use parquet_converter::ParquetConverter;
pub use schema_helper::SchemaHelper;
