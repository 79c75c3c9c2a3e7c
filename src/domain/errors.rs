use thiserror::Error;

/// Failures talking to the price source
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("price request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("price source returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("price source rejected the request: {0}")]
    Api(String),

    #[error("price response is not a valid quote: {0}")]
    Parse(String),

    #[error("invalid price source url: {0}")]
    Url(#[from] url::ParseError),
}

/// The quote cannot be shaped into a uniform row
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("quote is empty")]
    EmptyQuote,

    #[error("asset {0} missing from quote")]
    MissingAsset(String),

    #[error("price for {asset}/{currency} missing from quote")]
    MissingPrice { asset: String, currency: String },

    #[error("price for {asset}/{currency} is not finite: {value}")]
    NonFinitePrice { asset: String, currency: String, value: f64 },

    #[error("symbol {0:?} cannot be used as a column name")]
    InvalidSymbol(String),
}

/// Failures appending to the lake dataset or its catalog
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("lake io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet encoding failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("avro schema error: {0}")]
    Avro(#[from] apache_avro::Error),

    #[error("table {table} schema mismatch: catalog has {expected:?}, record has {found:?}")]
    SchemaMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("catalog request failed: {0}")]
    CatalogTransport(#[from] reqwest::Error),

    #[error("catalog entry is corrupt: {0}")]
    CatalogFormat(#[from] serde_json::Error),
}

impl LoadError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Failures delivering an alert
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook rejected alert with status {status}: {body}")]
    Delivery { status: u16, body: String },

    #[error("price for {asset}/{currency} missing from quote")]
    PriceMissing { asset: String, currency: String },
}

/// Missing or unusable configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    #[error("configuration value {0:?} not found")]
    MissingBlock(String),

    #[error("configuration value {name:?} is not a valid threshold: {value:?}")]
    InvalidThreshold { name: String, value: String },

    #[error("failed to read configuration store {path}: {reason}")]
    Store { path: String, reason: String },

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Any failure that aborts one iteration of the flow
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
