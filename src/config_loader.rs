use anyhow::{anyhow, Result};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::domain::constants::*;

/// Top-level configuration structure containing all config sections
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub lake: LakeConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub app: AppInfo,
}

/// Price API settings
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    #[serde(default = "default_quote_currencies")]
    pub quote_currencies: Vec<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Lake dataset location
#[derive(Debug, Clone, Deserialize)]
pub struct LakeConfig {
    #[serde(default = "default_lake_path")]
    pub path: String,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_true")]
    pub partition_by_date: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    File,
    SchemaRegistry,
}

/// Where table definitions are registered
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_kind")]
    pub kind: CatalogKind,

    #[serde(default = "default_schema_registry_url")]
    pub schema_registry_url: String,

    #[serde(default = "default_schema_registry_url_internal")]
    pub schema_registry_url_internal: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Threshold alert settings
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_alert_asset")]
    pub asset: String,

    #[serde(default = "default_alert_currency")]
    pub currency: String,

    #[serde(default = "default_threshold_block")]
    pub threshold_block: String,

    #[serde(default = "default_blocks_file")]
    pub blocks_file: String,

    #[serde(default = "default_webhook_env")]
    pub webhook_env: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Application information
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppInfo {
    #[serde(default)]
    pub rust_running_in_docker: bool,
}

fn default_base_url() -> String {
    PRICE_API_URL.to_string()
}

fn default_assets() -> Vec<String> {
    BASE_ASSETS.iter().map(|s| s.to_string()).collect()
}

fn default_quote_currencies() -> Vec<String> {
    QUOTE_CURRENCIES.iter().map(|s| s.to_string()).collect()
}

fn default_timeout_ms() -> u64 {
    HTTP_TIMEOUT_MS
}

fn default_lake_path() -> String {
    LAKE_PATH.to_string()
}

fn default_table() -> String {
    LAKE_TABLE.to_string()
}

fn default_database() -> String {
    CATALOG_DATABASE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_catalog_kind() -> CatalogKind {
    CatalogKind::File
}

fn default_schema_registry_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_schema_registry_url_internal() -> String {
    "http://schema-registry:8081".to_string()
}

fn default_alert_asset() -> String {
    ALERT_ASSET.to_string()
}

fn default_alert_currency() -> String {
    ALERT_CURRENCY.to_string()
}

fn default_threshold_block() -> String {
    THRESHOLD_BLOCK.to_string()
}

fn default_blocks_file() -> String {
    BLOCKS_FILE.to_string()
}

fn default_webhook_env() -> String {
    WEBHOOK_ENV.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            assets: default_assets(),
            quote_currencies: default_quote_currencies(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            path: default_lake_path(),
            table: default_table(),
            database: default_database(),
            partition_by_date: true,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            kind: default_catalog_kind(),
            schema_registry_url: default_schema_registry_url(),
            schema_registry_url_internal: default_schema_registry_url_internal(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            asset: default_alert_asset(),
            currency: default_alert_currency(),
            threshold_block: default_threshold_block(),
            blocks_file: default_blocks_file(),
            webhook_env: default_webhook_env(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config_str = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config = Self::from_toml(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        info!("Loaded configuration from {}", path.display());
        debug!("Running in Docker: {}", config.app.rust_running_in_docker);

        Ok(config)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(config_str)?;
        Ok(config)
    }

    /// Schema Registry URL based on Docker status
    pub fn schema_registry_url(&self) -> &str {
        if self.app.rust_running_in_docker {
            &self.catalog.schema_registry_url_internal
        } else {
            &self.catalog.schema_registry_url
        }
    }
}
