// Standard library imports
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// External crate imports
use anyhow::{Context, Result};
use dotenv::dotenv;
use log::{error, info, warn};
use tokio::sync::broadcast;

// Internal crate imports
use crypto_price_flow::config_loader::{AppConfig, CatalogKind};
use crypto_price_flow::domain::traits::{BlockStore, Catalog, LakeSink, PriceSource, WebhookSender};
use crypto_price_flow::flows::price_lake::*;
use crypto_price_flow::infrastructure::blocks::FileBlockStore;
use crypto_price_flow::infrastructure::exchange::cryptocompare::CryptoCompareClient;
use crypto_price_flow::infrastructure::lake::{FileCatalog, ParquetLakeWriter, SchemaRegistryCatalog};
use crypto_price_flow::infrastructure::notify::SlackWebhook;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Logger initialized");

    let config = load_config();

    // Webhook url is checked before anything touches the network
    let webhook = SlackWebhook::from_env_var(
        &config.alert.webhook_env,
        Duration::from_millis(config.alert.timeout_ms),
    )
    .with_context(|| format!("{} must be set", config.alert.webhook_env))?;

    let pipeline = build_pipeline(&config, Arc::new(webhook))?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    // Ctrl+C stops the loop between iterations
    tokio::spawn(forward_stop_signal(tokio::signal::ctrl_c(), shutdown_tx));

    let mut scheduler = Scheduler::new(ImmediateTicker);
    if let Err(e) = scheduler.run(&pipeline, shutdown_rx).await {
        error!("Price flow stopped: {}", e);
        return Err(e.into());
    }

    info!("Exiting program");
    Ok(())
}

/// Config file next to the binary's parent first, then the working directory,
/// then built-in defaults
fn load_config() -> AppConfig {
    for path in [Path::new("../config.toml"), Path::new("./config.toml")] {
        if !path.exists() {
            continue;
        }
        match AppConfig::from_file(path) {
            Ok(config) => return config,
            Err(e) => warn!("Failed to load config from {}: {}", path.display(), e),
        }
    }
    info!("No usable config.toml found, using built-in defaults");
    AppConfig::default()
}

fn build_pipeline(config: &AppConfig, webhook: Arc<dyn WebhookSender>) -> Result<PricePipeline> {
    let source: Arc<dyn PriceSource> = Arc::new(
        CryptoCompareClient::new(
            &config.source.base_url,
            &config.source.assets,
            &config.source.quote_currencies,
            Duration::from_millis(config.source.timeout_ms),
        )
        .context("Failed to create price client")?,
    );

    let catalog: Arc<dyn Catalog> = match config.catalog.kind {
        CatalogKind::File => Arc::new(FileCatalog::new(&config.lake.path)),
        CatalogKind::SchemaRegistry => Arc::new(
            SchemaRegistryCatalog::new(
                config.schema_registry_url(),
                Duration::from_millis(config.catalog.timeout_ms),
            )
            .context("Failed to create schema registry client")?,
        ),
    };
    info!(
        "Lake table {}.{} at {} ({:?} catalog)",
        config.lake.database, config.lake.table, config.lake.path, config.catalog.kind
    );

    let sink: Arc<dyn LakeSink> = Arc::new(ParquetLakeWriter::new(
        &config.lake.path,
        &config.lake.database,
        &config.lake.table,
        config.lake.partition_by_date,
        catalog,
    ));

    let thresholds: Arc<dyn BlockStore> = Arc::new(FileBlockStore::new(&config.alert.blocks_file));
    let notifier = ThresholdNotifier::new(
        WatchedPrice {
            asset: config.alert.asset.clone(),
            currency: config.alert.currency.clone(),
            threshold_block: config.alert.threshold_block.clone(),
        },
        thresholds,
        webhook,
    );

    let transformer = RecordTransformer::new(
        config.source.assets.clone(),
        config.source.quote_currencies.clone(),
    );

    Ok(PricePipeline::new(source, transformer, sink, notifier))
}
