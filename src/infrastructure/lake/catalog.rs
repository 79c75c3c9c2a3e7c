use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, StatusCode};

use crate::domain::errors::LoadError;
use crate::domain::model::table::TableDefinition;
use crate::domain::traits::Catalog;
use crate::infrastructure::lake::helper::SchemaHelper;

/// Table definitions stored as JSON next to the data:
/// `<root>/_catalog/<database>/<table>.json`
pub struct FileCatalog {
    root: PathBuf,
}

impl FileCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn entry_path(&self, database: &str, table: &str) -> PathBuf {
        self.root
            .join("_catalog")
            .join(database)
            .join(format!("{}.json", table))
    }

    /// Read the registered definition, if any
    pub async fn lookup(&self, database: &str, table: &str) -> Result<Option<TableDefinition>, LoadError> {
        let path = self.entry_path(database, table);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LoadError::io(&path, e)),
        }
    }

    async fn register(&self, table: &TableDefinition, path: &Path) -> Result<(), LoadError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LoadError::io(parent, e))?;
        }

        // Same temp-then-rename step as the data files
        let content = serde_json::to_string_pretty(table)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| LoadError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| LoadError::io(path, e))?;

        info!("Registered table {} at {}", table.qualified_name(), table.location);
        Ok(())
    }
}

#[async_trait]
impl Catalog for FileCatalog {
    async fn ensure_table(&self, table: &TableDefinition) -> Result<(), LoadError> {
        match self.lookup(&table.database, &table.table).await? {
            // Known table: the column set must not change
            Some(existing) => {
                let expected = existing.column_names();
                let found = table.column_names();
                if expected != found {
                    return Err(LoadError::SchemaMismatch {
                        table: table.qualified_name(),
                        expected,
                        found,
                    });
                }
                debug!("Table {} already registered", table.qualified_name());
                Ok(())
            }
            // First append creates the entry
            None => {
                let path = self.entry_path(&table.database, &table.table);
                self.register(table, &path).await
            }
        }
    }
}

/// Table definitions kept as Avro schemas in a Confluent-style schema registry,
/// under the subject `<database>.<table>-value`
pub struct SchemaRegistryCatalog {
    client: Client,
    schema_registry_url: String,
}

impl SchemaRegistryCatalog {
    pub fn new(schema_registry_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            schema_registry_url: schema_registry_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn subject(table: &TableDefinition) -> String {
        format!("{}-value", table.qualified_name())
    }

    /// Latest registered schema for the subject, `None` if the subject is unknown
    async fn latest_schema(&self, subject: &str) -> Result<Option<String>, LoadError> {
        let url = format!("{}/subjects/{}/versions/latest", self.schema_registry_url, subject);
        let response = self.client.get(&url).send().await?;

        // 404 means the subject was never registered
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(LoadError::Catalog(format!(
                "schema lookup for {} failed with status {}: {}",
                subject, status, error_text
            )));
        }

        // The schema itself comes back as an escaped JSON string
        let schema_info = response.json::<serde_json::Value>().await?;
        let schema = schema_info["schema"]
            .as_str()
            .ok_or_else(|| LoadError::Catalog(format!("registry response for {} has no schema", subject)))?;
        Ok(Some(schema.to_string()))
    }

    /// Register a schema and return its id
    async fn register_schema(&self, subject: &str, schema_content: &str) -> Result<i64, LoadError> {
        let register_url = format!("{}/subjects/{}/versions", self.schema_registry_url, subject);
        info!("Registering schema for subject: {}", subject);

        let schema_request = serde_json::json!({
            "schema": schema_content
        });

        let response = self
            .client
            .post(&register_url)
            .json(&schema_request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let registration_result = response.json::<serde_json::Value>().await?;
            let schema_id = registration_result["id"].as_i64().unwrap_or(0);
            info!("Schema registration successful with ID: {}", schema_id);
            Ok(schema_id)
        } else {
            let error_text = response.text().await?;
            error!(
                "Schema registration failed with status: {}, error: {}",
                status, error_text
            );
            Err(LoadError::Catalog(format!("failed to register schema: {}", error_text)))
        }
    }
}

#[async_trait]
impl Catalog for SchemaRegistryCatalog {
    async fn ensure_table(&self, table: &TableDefinition) -> Result<(), LoadError> {
        let subject = Self::subject(table);
        let schema_content = SchemaHelper::schema_json(table)?;

        match self.latest_schema(&subject).await? {
            // Compare field names of the registered schema
            Some(existing) => {
                let existing = apache_avro::Schema::parse_str(&existing)?;
                let expected = SchemaHelper::field_names(&existing);
                let found = table.column_names();
                if expected != found {
                    return Err(LoadError::SchemaMismatch {
                        table: table.qualified_name(),
                        expected,
                        found,
                    });
                }
                debug!("Found existing schema for {}", subject);
                Ok(())
            }
            None => {
                self.register_schema(&subject, &schema_content).await?;
                Ok(())
            }
        }
    }
}
