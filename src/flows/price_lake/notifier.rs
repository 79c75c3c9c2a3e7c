use std::sync::Arc;

use log::info;

use crate::domain::errors::{NotifyError, PipelineError};
use crate::domain::model::alert::{breaches_threshold, AlertMessage, AlertOutcome};
use crate::domain::model::quote::PriceQuote;
use crate::domain::traits::{BlockStore, WebhookSender};
use crate::infrastructure::blocks::load_threshold;

/// Which price is watched and where its threshold lives
#[derive(Clone, Debug)]
pub struct WatchedPrice {
    pub asset: String,
    pub currency: String,
    pub threshold_block: String,
}

/// Sends an alert whenever the watched price is below the configured threshold.
/// Every breaching iteration alerts again; nothing is remembered between calls.
pub struct ThresholdNotifier {
    watched: WatchedPrice,
    thresholds: Arc<dyn BlockStore>,
    webhook: Arc<dyn WebhookSender>,
}

impl ThresholdNotifier {
    pub fn new(watched: WatchedPrice, thresholds: Arc<dyn BlockStore>, webhook: Arc<dyn WebhookSender>) -> Self {
        Self {
            watched,
            thresholds,
            webhook,
        }
    }

    /// Decide for one price/threshold pair; no I/O
    pub fn evaluate(price: f64, threshold: f64) -> Option<AlertMessage> {
        if breaches_threshold(price, threshold) {
            Some(AlertMessage::new(price, threshold))
        } else {
            None
        }
    }

    /// Check the raw quote against the latest threshold and alert on breach
    pub async fn check(&self, quote: &PriceQuote) -> Result<AlertOutcome, PipelineError> {
        let threshold = load_threshold(self.thresholds.as_ref(), &self.watched.threshold_block)?;
        let price = quote
            .price(&self.watched.asset, &self.watched.currency)
            .ok_or_else(|| NotifyError::PriceMissing {
                asset: self.watched.asset.clone(),
                currency: self.watched.currency.clone(),
            })?;

        match Self::evaluate(price, threshold) {
            Some(message) => {
                let text = message.to_string();
                info!("{}", text);
                self.webhook.send(&text).await?;
                Ok(AlertOutcome::Sent(message))
            }
            None => {
                info!("Current price ({}) is too high. Skipping alert", price);
                Ok(AlertOutcome::Skipped { price, threshold })
            }
        }
    }
}
