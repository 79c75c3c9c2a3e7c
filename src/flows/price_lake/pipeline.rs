use std::sync::Arc;

use log::info;

use crate::domain::errors::PipelineError;
use crate::domain::model::alert::AlertOutcome;
use crate::domain::model::table::AppendReceipt;
use crate::domain::traits::{LakeSink, PriceSource};

use super::notifier::ThresholdNotifier;
use super::transformer::RecordTransformer;

/// Result of one successful iteration
#[derive(Clone, Debug, PartialEq)]
pub struct IterationReport {
    pub receipt: AppendReceipt,
    pub alert: AlertOutcome,
}

/// Fetch -> transform -> load, then the threshold check on the raw quote.
///
/// Fails fast: the first failing step ends the iteration, so a failed load
/// means no alert is evaluated for that quote.
pub struct PricePipeline {
    source: Arc<dyn PriceSource>,
    transformer: RecordTransformer,
    sink: Arc<dyn LakeSink>,
    notifier: ThresholdNotifier,
}

impl PricePipeline {
    pub fn new(
        source: Arc<dyn PriceSource>,
        transformer: RecordTransformer,
        sink: Arc<dyn LakeSink>,
        notifier: ThresholdNotifier,
    ) -> Self {
        Self {
            source,
            transformer,
            sink,
            notifier,
        }
    }

    pub async fn run_once(&self) -> Result<IterationReport, PipelineError> {
        let quote = self.source.fetch().await?;
        let record = self.transformer.transform(&quote)?;
        let receipt = self.sink.append(&record).await?;

        // Reads the fetched quote, not the stored record
        let alert = self.notifier.check(&quote).await?;

        info!("Price flow iteration finished, wrote {}", receipt.path.display());
        Ok(IterationReport { receipt, alert })
    }
}
