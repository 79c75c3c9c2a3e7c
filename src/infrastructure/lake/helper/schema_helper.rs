use apache_avro::Schema;
use serde_json::{json, Value};

use crate::domain::constants::{PARTITION_KEY, TIME_COLUMN};
use crate::domain::errors::LoadError;
use crate::domain::model::record::PriceRecord;
use crate::domain::model::table::{ColumnDefinition, TableDefinition};

pub(crate) const DOUBLE_TYPE: &str = "double";
pub(crate) const TIMESTAMP_TYPE: &str = "timestamp";
pub(crate) const FILE_FORMAT: &str = "parquet";

/// Builds catalog entries for lake tables and the Avro schemas registered for them
pub struct SchemaHelper {
    database: String,
    table: String,
}

impl SchemaHelper {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }

    /// Catalog entry for the table a record would be written to
    pub fn table_definition(&self, record: &PriceRecord, location: &str, partitioned: bool) -> TableDefinition {
        let mut columns: Vec<ColumnDefinition> = record
            .columns
            .iter()
            .map(|c| ColumnDefinition {
                name: c.name.clone(),
                data_type: DOUBLE_TYPE.to_string(),
            })
            .collect();
        columns.push(ColumnDefinition {
            name: TIME_COLUMN.to_string(),
            data_type: TIMESTAMP_TYPE.to_string(),
        });

        TableDefinition {
            database: self.database.clone(),
            table: self.table.clone(),
            location: location.to_string(),
            format: FILE_FORMAT.to_string(),
            columns,
            partition_keys: if partitioned {
                vec![PARTITION_KEY.to_string()]
            } else {
                Vec::new()
            },
        }
    }

    /// Avro schema JSON for a table definition
    pub fn schema_json(definition: &TableDefinition) -> Result<String, LoadError> {
        let fields = definition
            .columns
            .iter()
            .map(|c| match c.data_type.as_str() {
                DOUBLE_TYPE => Ok(json!({"name": c.name, "type": "double"})),
                TIMESTAMP_TYPE => Ok(json!({
                    "name": c.name,
                    "type": {"type": "long", "logicalType": "timestamp-micros"}
                })),
                other => Err(LoadError::Catalog(format!(
                    "unsupported column type {} for {}",
                    other, c.name
                ))),
            })
            .collect::<Result<Vec<Value>, LoadError>>()?;

        let schema = json!({
            "type": "record",
            "name": definition.table,
            "namespace": definition.database,
            "fields": fields,
        });
        Ok(schema.to_string())
    }

    /// Parsed Avro schema for a table definition
    pub fn schema(definition: &TableDefinition) -> Result<Schema, LoadError> {
        let schema_json = Self::schema_json(definition)?;
        Ok(Schema::parse_str(&schema_json)?)
    }

    /// Field names of a record schema, in order
    pub fn field_names(schema: &Schema) -> Vec<String> {
        match schema {
            Schema::Record(record) => record.fields.iter().map(|f| f.name.clone()).collect(),
            _ => Vec::new(),
        }
    }
}
