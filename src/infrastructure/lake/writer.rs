use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::LoadError;
use crate::domain::model::record::PriceRecord;
use crate::domain::model::table::AppendReceipt;
use crate::domain::traits::{Catalog, LakeSink};
use crate::infrastructure::lake::helper::{ParquetConverter, SchemaHelper};

const PART_EXTENSION: &str = "parquet";

/// Append-only lake table made of Parquet files.
///
/// Layout: `<root>/<table>/dt=YYYY-MM-DD/part-<uuid>.parquet`, one file per
/// append. Files are written under a temporary name and renamed into place,
/// so readers never observe a half-written row.
pub struct ParquetLakeWriter {
    root: PathBuf,
    table: String,
    partition_by_date: bool,
    schema_helper: SchemaHelper,
    catalog: Arc<dyn Catalog>,

    /// Columns already checked against the catalog
    verified_columns: RwLock<Option<Vec<String>>>,
}

impl ParquetLakeWriter {
    pub fn new(
        root: impl Into<PathBuf>,
        database: &str,
        table: &str,
        partition_by_date: bool,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        Self {
            root: root.into(),
            table: table.to_string(),
            partition_by_date,
            schema_helper: SchemaHelper::new(database, table),
            catalog,
            verified_columns: RwLock::new(None),
        }
    }

    pub fn table_location(&self) -> PathBuf {
        self.root.join(&self.table)
    }

    fn is_verified(&self, columns: &[String]) -> bool {
        match self.verified_columns.read() {
            Ok(cache) => cache.as_deref() == Some(columns),
            Err(_) => false,
        }
    }

    fn mark_verified(&self, columns: Vec<String>) {
        match self.verified_columns.write() {
            Ok(mut cache) => *cache = Some(columns),
            Err(_) => warn!("Schema cache lock poisoned, catalog will be checked again"),
        }
    }
}

#[async_trait]
impl LakeSink for ParquetLakeWriter {
    async fn append(&self, record: &PriceRecord) -> Result<AppendReceipt, LoadError> {
        let location = self.table_location();
        let definition = self.schema_helper.table_definition(
            record,
            &location.display().to_string(),
            self.partition_by_date,
        );

        // Register or verify the table once per column set
        let columns = definition.column_names();
        if !self.is_verified(&columns) {
            self.catalog.ensure_table(&definition).await?;
            self.mark_verified(columns);
        }

        // Encode the row before touching the filesystem
        let schema = ParquetConverter::schema(&definition)?;
        let payload = ParquetConverter::encode(schema, record)?;

        let dir = if self.partition_by_date {
            location.join(record.partition())
        } else {
            location
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| LoadError::io(&dir, e))?;

        // Write under a hidden temp name, then move into place
        let part = Uuid::new_v4();
        let tmp = dir.join(format!(".part-{}.{}.tmp", part, PART_EXTENSION));
        let path = dir.join(format!("part-{}.{}", part, PART_EXTENSION));
        tokio::fs::write(&tmp, &payload)
            .await
            .map_err(|e| LoadError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| LoadError::io(&path, e))?;

        debug!("Wrote {} bytes to {}", payload.len(), path.display());
        info!("Table {} in data lake successfully updated", self.table);

        Ok(AppendReceipt {
            table: self.table.clone(),
            path,
            rows: record.row_count(),
        })
    }
}

/// Read every row of a lake table, ordered by `TIME`
pub fn read_table(root: impl AsRef<Path>, table: &str) -> Result<Vec<PriceRecord>, LoadError> {
    let mut files = Vec::new();
    collect_part_files(&root.as_ref().join(table), &mut files)?;

    let mut records = Vec::new();
    for path in files {
        let file = std::fs::File::open(&path).map_err(|e| LoadError::io(&path, e))?;
        records.extend(ParquetConverter::decode(file)?);
    }

    // File names are random, so order by observation time instead
    records.sort_by_key(|record| record.time);
    Ok(records)
}

fn collect_part_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(LoadError::io(dir, e)),
    };

    for entry in entries {
        let path = entry.map_err(|e| LoadError::io(dir, e))?.path();
        if path.is_dir() {
            collect_part_files(&path, files)?;
        } else if path.extension().map_or(false, |ext| ext == PART_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}
