mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use tokio::sync::broadcast;

use crypto_price_flow::domain::errors::{LoadError, PipelineError, TransformError};
use crypto_price_flow::domain::model::alert::AlertOutcome;
use crypto_price_flow::domain::traits::{LakeSink, PriceSource};
use crypto_price_flow::flows::price_lake::*;
use crypto_price_flow::infrastructure::blocks::MemoryBlockStore;
use crypto_price_flow::infrastructure::lake::{read_table, FileCatalog, ParquetLakeWriter};

fn scenario_quote() -> serde_json::Value {
    json!({"BTC": {"USD": 25000}, "ETH": {"USD": 1600}})
}

fn build(
    source: Arc<dyn PriceSource>,
    sink: Arc<dyn LakeSink>,
    threshold: &str,
    webhook: Arc<common::RecordingWebhook>,
) -> PricePipeline {
    let notifier = ThresholdNotifier::new(
        WatchedPrice {
            asset: "BTC".to_string(),
            currency: "USD".to_string(),
            threshold_block: "price".to_string(),
        },
        Arc::new(MemoryBlockStore::with_value("price", threshold)),
        webhook,
    );
    let transformer = RecordTransformer::new(
        vec!["BTC".to_string(), "ETH".to_string()],
        vec!["USD".to_string()],
    );
    PricePipeline::new(source, transformer, sink, notifier)
}

fn lake_sink(root: &std::path::Path) -> Arc<ParquetLakeWriter> {
    Arc::new(ParquetLakeWriter::new(
        root,
        "default",
        "crypto",
        true,
        Arc::new(FileCatalog::new(root)),
    ))
}

#[tokio::test]
async fn test_breach_writes_row_and_alerts() -> Result<()> {
    let root = common::temp_lake();
    let webhook = common::RecordingWebhook::new();
    let pipeline = build(
        common::StaticSource::new(common::quote(scenario_quote())),
        lake_sink(&root),
        "30000",
        webhook.clone(),
    );

    let report = pipeline.run_once().await?;

    assert!(matches!(report.alert, AlertOutcome::Sent(_)));
    let messages = webhook.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("25000") && messages[0].contains("30000"));

    let rows = read_table(&root, "crypto")?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value("BTC_USD"), Some(25000.0));
    assert_eq!(rows[0].value("ETH_USD"), Some(1600.0));

    std::fs::remove_dir_all(&root).ok();
    Ok(())
}

#[tokio::test]
async fn test_no_breach_writes_row_without_alert() -> Result<()> {
    let root = common::temp_lake();
    let webhook = common::RecordingWebhook::new();
    let pipeline = build(
        common::StaticSource::new(common::quote(scenario_quote())),
        lake_sink(&root),
        "20000",
        webhook.clone(),
    );

    let report = pipeline.run_once().await?;

    assert!(matches!(report.alert, AlertOutcome::Skipped { .. }));
    assert!(webhook.messages().is_empty());
    assert_eq!(read_table(&root, "crypto")?.len(), 1);

    std::fs::remove_dir_all(&root).ok();
    Ok(())
}

#[tokio::test]
async fn test_identical_iterations_append_independent_rows() -> Result<()> {
    let root = common::temp_lake();
    let pipeline = build(
        common::StaticSource::new(common::quote(scenario_quote())),
        lake_sink(&root),
        "20000",
        common::RecordingWebhook::new(),
    );

    pipeline.run_once().await?;
    pipeline.run_once().await?;

    let rows = read_table(&root, "crypto")?;
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0].time, rows[1].time);

    std::fs::remove_dir_all(&root).ok();
    Ok(())
}

#[tokio::test]
async fn test_failed_load_stops_before_notifier() {
    let sink = common::FailingSink::new();
    let webhook = common::RecordingWebhook::new();
    let pipeline = build(
        common::StaticSource::new(common::quote(scenario_quote())),
        sink.clone(),
        "30000",
        webhook.clone(),
    );

    let err = pipeline.run_once().await.unwrap_err();

    assert!(matches!(err, PipelineError::Load(LoadError::Catalog(_))));
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 1);
    assert!(webhook.messages().is_empty());
}

#[tokio::test]
async fn test_malformed_quote_writes_nothing() {
    let root = common::temp_lake();
    let webhook = common::RecordingWebhook::new();
    let pipeline = build(
        common::StaticSource::new(common::quote(json!({"BTC": {"USD": 25000}}))),
        lake_sink(&root),
        "30000",
        webhook.clone(),
    );

    let err = pipeline.run_once().await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Transform(TransformError::MissingAsset(_))
    ));
    assert!(read_table(&root, "crypto").unwrap().is_empty());
    assert!(webhook.messages().is_empty());
}

#[tokio::test]
async fn test_scheduler_stops_on_signal_sent_before_start() -> Result<()> {
    let source = common::StaticSource::new(common::quote(scenario_quote()));
    let pipeline = build(
        source.clone(),
        common::FailingSink::new(),
        "30000",
        common::RecordingWebhook::new(),
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    shutdown_tx.send(())?;

    Scheduler::new(ImmediateTicker).run(&pipeline, shutdown_rx).await?;
    assert_eq!(source.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_scheduler_returns_first_iteration_error() {
    let pipeline = build(
        Arc::new(common::FailingSource),
        common::FailingSink::new(),
        "30000",
        common::RecordingWebhook::new(),
    );
    let (_shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

    let err = Scheduler::new(ImmediateTicker)
        .run(&pipeline, shutdown_rx)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(_)));
}

#[tokio::test]
async fn test_scheduler_repeats_until_stopped() -> Result<()> {
    let root = common::temp_lake();
    let source = common::StaticSource::new(common::quote(scenario_quote()));
    let pipeline = Arc::new(build(
        source.clone(),
        lake_sink(&root),
        "20000",
        common::RecordingWebhook::new(),
    ));

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let handle = tokio::spawn({
        let pipeline = pipeline.clone();
        async move {
            Scheduler::new(IntervalTicker::new(Duration::from_millis(10)))
                .run(&pipeline, shutdown_rx)
                .await
        }
    });

    while source.calls() < 3 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    shutdown_tx.send(())?;
    handle.await??;

    // Every started iteration ran to completion
    let calls = source.calls();
    assert!(calls >= 3);
    assert_eq!(read_table(&root, "crypto")?.len(), calls);

    std::fs::remove_dir_all(&root).ok();
    Ok(())
}

#[tokio::test]
async fn test_failed_stop_listener_keeps_scheduler_running() -> Result<()> {
    let root = common::temp_lake();
    let source = common::StaticSource::new(common::quote(scenario_quote()));
    let pipeline = Arc::new(build(
        source.clone(),
        lake_sink(&root),
        "20000",
        common::RecordingWebhook::new(),
    ));

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let listener = tokio::spawn(forward_stop_signal(
        async { Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "no signal handler")) },
        shutdown_tx,
    ));
    let handle = tokio::spawn({
        let pipeline = pipeline.clone();
        async move {
            Scheduler::new(IntervalTicker::new(Duration::from_millis(10)))
                .run(&pipeline, shutdown_rx)
                .await
        }
    });

    while source.calls() < 3 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!handle.is_finished());

    // Ending the listener releases the sender, which closes the channel
    listener.abort();
    handle.await??;

    std::fs::remove_dir_all(&root).ok();
    Ok(())
}

#[tokio::test]
async fn test_stop_signal_is_forwarded_to_scheduler() -> Result<()> {
    let root = common::temp_lake();
    let pipeline = build(
        common::StaticSource::new(common::quote(scenario_quote())),
        lake_sink(&root),
        "20000",
        common::RecordingWebhook::new(),
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    forward_stop_signal(async { Ok(()) }, shutdown_tx).await;

    Scheduler::new(ImmediateTicker).run(&pipeline, shutdown_rx).await?;
    assert!(read_table(&root, "crypto")?.is_empty());

    std::fs::remove_dir_all(&root).ok();
    Ok(())
}

#[test]
fn test_missing_webhook_env_is_detected_at_startup() {
    use crypto_price_flow::domain::errors::ConfigError;
    use crypto_price_flow::infrastructure::notify::SlackWebhook;

    std::env::remove_var("PRICE_FLOW_PIPELINE_TEST_WEBHOOK");
    let result = SlackWebhook::from_env_var("PRICE_FLOW_PIPELINE_TEST_WEBHOOK", Duration::from_secs(1));
    assert!(matches!(result, Err(ConfigError::MissingEnv(_))));
}
