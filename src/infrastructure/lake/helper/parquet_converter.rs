use std::fs::File;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use parquet::basic::Compression;
use parquet::column::writer::ColumnWriter;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::record::Field;
use parquet::schema::parser::parse_message_type;
use parquet::schema::types::Type as ParquetType;

use crate::domain::constants::TIME_COLUMN;
use crate::domain::errors::LoadError;
use crate::domain::model::record::{PriceColumn, PriceRecord};
use crate::domain::model::table::TableDefinition;

use super::schema_helper::{DOUBLE_TYPE, TIMESTAMP_TYPE};

/// Converter between price records and Parquet files
pub struct ParquetConverter;

impl ParquetConverter {
    /// Parquet message type for a table: `DOUBLE` per price column,
    /// `TIME` as `TIMESTAMP(MICROS, UTC)`
    pub fn schema(definition: &TableDefinition) -> Result<Arc<ParquetType>, LoadError> {
        let mut message = format!("message {} {{\n", definition.table);
        for column in &definition.columns {
            let line = match column.data_type.as_str() {
                DOUBLE_TYPE => format!("  REQUIRED DOUBLE {};\n", column.name),
                TIMESTAMP_TYPE => format!("  REQUIRED INT64 {} (TIMESTAMP(MICROS,true));\n", column.name),
                other => {
                    return Err(LoadError::Catalog(format!(
                        "unsupported column type {} for {}",
                        other, column.name
                    )))
                }
            };
            message.push_str(&line);
        }
        message.push('}');

        debug!("Parquet schema for {}: {}", definition.qualified_name(), message);
        Ok(Arc::new(parse_message_type(&message)?))
    }

    /// Encode one record as a complete Parquet file with a single row group
    pub fn encode(schema: Arc<ParquetType>, record: &PriceRecord) -> Result<Vec<u8>, LoadError> {
        let props = Arc::new(
            WriterProperties::builder()
                .set_compression(Compression::SNAPPY)
                .build(),
        );
        let mut writer = SerializedFileWriter::new(Vec::new(), schema, props)?;
        let mut row_group = writer.next_row_group()?;

        // Columns come back in schema order: prices first, TIME last
        let mut index = 0;
        while let Some(mut column) = row_group.next_column()? {
            match (column.untyped(), record.columns.get(index)) {
                (ColumnWriter::DoubleColumnWriter(w), Some(price)) => {
                    w.write_batch(&[price.value], None, None)?;
                }
                (ColumnWriter::Int64ColumnWriter(w), None) => {
                    w.write_batch(&[record.time.timestamp_micros()], None, None)?;
                }
                _ => {
                    return Err(LoadError::Catalog(format!(
                        "column {} of the schema does not match record {}",
                        index, record
                    )))
                }
            }
            column.close()?;
            index += 1;
        }
        if index != record.columns.len() + 1 {
            return Err(LoadError::Catalog(format!(
                "schema has {} columns, record {} has {}",
                index,
                record,
                record.columns.len() + 1
            )));
        }
        row_group.close()?;

        // Writes the footer and hands the buffer back
        Ok(writer.into_inner()?)
    }

    /// Read every row of one Parquet file
    pub fn decode(file: File) -> Result<Vec<PriceRecord>, LoadError> {
        let reader = SerializedFileReader::new(file)?;
        let mut records = Vec::new();

        for row in reader.get_row_iter(None)? {
            let row = row?;
            let mut columns = Vec::new();
            let mut time = None;

            for (name, field) in row.get_column_iter() {
                match field {
                    Field::TimestampMicros(micros) | Field::Long(micros) if name == TIME_COLUMN => {
                        time = Some(Self::micros_to_datetime(*micros)?);
                    }
                    Field::Double(value) if name != TIME_COLUMN => columns.push(PriceColumn {
                        name: name.clone(),
                        value: *value,
                    }),
                    other => {
                        return Err(LoadError::Catalog(format!(
                            "unexpected value for column {}: {:?}",
                            name, other
                        )))
                    }
                }
            }

            let time = time.ok_or_else(|| LoadError::Catalog(format!("row has no {} column", TIME_COLUMN)))?;
            records.push(PriceRecord::new(columns, time));
        }

        Ok(records)
    }

    fn micros_to_datetime(micros: i64) -> Result<DateTime<Utc>, LoadError> {
        let seconds = micros.div_euclid(1_000_000);
        let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
        DateTime::from_timestamp(seconds, nanos)
            .ok_or_else(|| LoadError::Catalog(format!("invalid timestamp: {}", micros)))
    }
}
