// Fixed values of the price flow. Config defaults point at these so a run
// without config.toml behaves exactly like the stock deployment.
pub const PRICE_API_URL: &str = "https://min-api.cryptocompare.com/data/pricemulti";
pub const BASE_ASSETS: &[&str] = &["BTC", "ETH", "REP", "DASH"];
pub const QUOTE_CURRENCIES: &[&str] = &["USD"];

pub const LAKE_PATH: &str = "./lake";
pub const LAKE_TABLE: &str = "crypto";
pub const CATALOG_DATABASE: &str = "default";

/// Name of the timestamp column every record carries
pub const TIME_COLUMN: &str = "TIME";
/// Hive-style partition key derived from TIME
pub const PARTITION_KEY: &str = "dt";

pub const THRESHOLD_BLOCK: &str = "price";
pub const BLOCKS_FILE: &str = "./blocks.toml";
pub const ALERT_ASSET: &str = "BTC";
pub const ALERT_CURRENCY: &str = "USD";
pub const WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";

pub const HTTP_TIMEOUT_MS: u64 = 10_000;
