//! Customer task: takes items on a pacing timer until cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::store::{Store, TakeOutcome};

const DEFAULT_PACE: Duration = Duration::from_secs(3);

/// What the customer observed by the time it was cancelled.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct CustomerReport {
    pub taken: u64,
    pub empty_visits: u64,
    pub after_hours_visits: u64,
    pub closed_visits: u64,
}

/// Unbounded consumer: retries on its own timer (an empty store is an
/// outcome, not a wait) and stops within one pacing delay of cancellation.
pub struct Customer {
    store: Arc<Store>,
    pace: Duration,
}

impl Customer {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            pace: DEFAULT_PACE,
        }
    }

    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    pub async fn run(self, cancel: CancellationToken) -> CustomerReport {
        let mut report = CustomerReport::default();

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.store.take_item() => outcome,
            };

            tracing::debug!(outcome = outcome.as_str(), "pickup attempt");
            match outcome {
                TakeOutcome::Taken { count } => {
                    report.taken += 1;
                    tracing::info!(count, "customer took an item");
                }
                TakeOutcome::Empty => {
                    report.empty_visits += 1;
                    tracing::info!("store empty, nothing to take");
                }
                TakeOutcome::OutsideHours => {
                    report.after_hours_visits += 1;
                    tracing::info!("pickups not permitted at this hour");
                }
                TakeOutcome::Closed => {
                    report.closed_visits += 1;
                    tracing::info!("store closed, customer turned away");
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.pace) => {}
            }
        }

        tracing::info!(taken = report.taken, "customer stopped");
        report
    }
}
