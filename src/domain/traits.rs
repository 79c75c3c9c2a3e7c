use async_trait::async_trait;

use crate::domain::errors::{ConfigError, FetchError, LoadError, NotifyError};
use crate::domain::model::quote::PriceQuote;
use crate::domain::model::record::PriceRecord;
use crate::domain::model::table::{AppendReceipt, TableDefinition};

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> Result<PriceQuote, FetchError>;
}

#[async_trait]
pub trait LakeSink: Send + Sync {
    /// Append exactly one row. Never overwrites or deduplicates.
    async fn append(&self, record: &PriceRecord) -> Result<AppendReceipt, LoadError>;
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Register the table on first use, otherwise check the columns still match
    async fn ensure_table(&self, table: &TableDefinition) -> Result<(), LoadError>;
}

#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Named configuration values, read fresh on every call
pub trait BlockStore: Send + Sync {
    fn load(&self, name: &str) -> Result<String, ConfigError>;
}
