//! Supplier task: delivers a fixed number of items with a pacing delay.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::store::{AddOutcome, Store};

const DEFAULT_PACE: Duration = Duration::from_secs(2);

/// What the supplier accomplished by the time its loop ended.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct SupplierReport {
    pub delivered: u64,
    pub rejected: u64,
    pub cancelled: bool,
}

/// Bounded producer: attempts exactly `limit` deliveries, pacing between
/// them, regardless of store state.
pub struct Supplier {
    store: Arc<Store>,
    limit: u64,
    pace: Duration,
}

impl Supplier {
    pub fn new(store: Arc<Store>, limit: u64) -> Self {
        Self {
            store,
            limit,
            pace: DEFAULT_PACE,
        }
    }

    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Run the delivery loop. Cancellation aborts early and is recorded in
    /// the report rather than swallowed.
    pub async fn run(self, cancel: CancellationToken) -> SupplierReport {
        let mut report = SupplierReport::default();

        for delivery in 1..=self.limit {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!(delivery, "supplier cancelled before delivery");
                    report.cancelled = true;
                    break;
                }
                outcome = self.store.add_item() => outcome,
            };

            tracing::debug!(delivery, outcome = outcome.as_str(), "delivery attempt");
            match outcome {
                AddOutcome::Added { count } => {
                    report.delivered += 1;
                    tracing::info!(count, "supplier delivered an item");
                }
                AddOutcome::Closed => {
                    report.rejected += 1;
                    tracing::warn!("store closed, delivery dropped");
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(delivery, "supplier cancelled during pause");
                    report.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(self.pace) => {}
            }
        }

        tracing::info!(
            delivered = report.delivered,
            rejected = report.rejected,
            "supplier finished"
        );
        report
    }
}
