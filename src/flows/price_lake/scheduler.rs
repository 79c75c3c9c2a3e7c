use std::future::Future;

use async_trait::async_trait;
use log::{error, info, warn};
use tokio::sync::broadcast;
use tokio::time::{Duration, Interval, MissedTickBehavior};

use crate::domain::errors::PipelineError;

use super::pipeline::PricePipeline;

/// Paces iterations. `tick` resolves when the next iteration may start.
#[async_trait]
pub trait Ticker: Send {
    async fn tick(&mut self);
}

/// Back-to-back iterations; only yields to the runtime between them
pub struct ImmediateTicker;

#[async_trait]
impl Ticker for ImmediateTicker {
    async fn tick(&mut self) {
        tokio::task::yield_now().await;
    }
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Fixed period between iteration starts
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// A zero period is raised to one millisecond
    pub fn new(period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Drives the pipeline until a stop signal arrives or an iteration fails
pub struct Scheduler<T: Ticker> {
    ticker: T,
}

impl<T: Ticker> Scheduler<T> {
    pub fn new(ticker: T) -> Self {
        Self { ticker }
    }

    /// The stop signal is only observed between iterations; a running
    /// iteration always completes or fails on its own. A closed channel
    /// counts as a stop.
    pub async fn run(
        &mut self,
        pipeline: &PricePipeline,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), PipelineError> {
        info!("Price flow scheduler started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    info!("Scheduler received shutdown signal");
                    return Ok(());
                }
                _ = self.ticker.tick() => {}
            }

            if let Err(e) = pipeline.run_once().await {
                error!("Price flow iteration failed: {}", e);
                return Err(e);
            }
        }
    }
}

/// Forward one stop signal (e.g. Ctrl+C) into the shutdown channel.
///
/// If the signal source fails the sender is held until this task ends, so
/// the channel stays open and the scheduler keeps running.
pub async fn forward_stop_signal<F>(signal: F, shutdown_tx: broadcast::Sender<()>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            warn!("Stop signal received. Stopping after the current iteration...");
            if let Err(e) = shutdown_tx.send(()) {
                error!("Failed to send shutdown signal: {}", e);
            }
        }
        Err(e) => {
            error!("Failed to listen for stop signal: {}. Running until the process is killed", e);
            std::future::pending::<()>().await;
            drop(shutdown_tx);
        }
    }
}
