use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Catalog entry describing a lake table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub database: String,
    pub table: String,
    pub location: String,
    pub format: String,
    pub columns: Vec<ColumnDefinition>,
    pub partition_keys: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

impl TableDefinition {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Fully qualified name, e.g. `default.crypto`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }
}

/// Where an append landed
#[derive(Clone, Debug, PartialEq)]
pub struct AppendReceipt {
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
}
