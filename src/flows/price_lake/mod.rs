//! Real-time price flow
//!
//! Fetches spot prices, appends them to the lake table and alerts when the
//! watched price drops below its threshold, once per scheduler tick.

mod notifier;
mod pipeline;
mod scheduler;
mod transformer;

pub use notifier::{ThresholdNotifier, WatchedPrice};
pub use pipeline::{IterationReport, PricePipeline};
pub use scheduler::{forward_stop_signal, ImmediateTicker, IntervalTicker, Scheduler, Ticker};
pub use transformer::RecordTransformer;
