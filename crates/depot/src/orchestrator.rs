//! Orchestrator: wires the supplier and customer to one shared store and
//! drives the shutdown sequence.
//!
//! Sequence: build the store, spawn both tasks, wait for the supplier to
//! finish (no timeout; an unresponsive supplier blocks the run), close the
//! store, cancel the customer, then wait for its acknowledgement and
//! assemble the summary.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, SystemClock, WorkingHours};
use crate::customer::{Customer, CustomerReport};
use crate::store::{Store, StoreError, StoreSnapshot};
use crate::supplier::{Supplier, SupplierReport};

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Config(#[from] StoreError),
    #[error("task panicked: {0}")]
    Join(String),
}

pub struct OrchestratorConfig {
    pub capacity: usize,
    pub supply_limit: u64,
    pub supply_pace: Duration,
    pub take_pace: Duration,
    pub hours: WorkingHours,
    pub clock: Arc<dyn Clock>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self {
            capacity: 10,
            supply_limit: 20,
            supply_pace: Duration::from_secs(2),
            take_pace: Duration::from_secs(3),
            hours: WorkingHours::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_supply_limit(mut self, limit: u64) -> Self {
        self.supply_limit = limit;
        self
    }

    pub fn with_supply_pace(mut self, pace: Duration) -> Self {
        self.supply_pace = pace;
        self
    }

    pub fn with_take_pace(mut self, pace: Duration) -> Self {
        self.take_pace = pace;
        self
    }

    pub fn with_hours(mut self, hours: WorkingHours) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Final accounting for one run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    pub supplied: u64,
    pub taken: u64,
    pub remaining: u64,
    pub supplier: SupplierReport,
    pub customer: CustomerReport,
    pub store: StoreSnapshot,
}

pub async fn run(config: OrchestratorConfig) -> Result<RunSummary, OrchestratorError> {
    let store = Arc::new(
        Store::new(config.capacity)?
            .with_hours(config.hours)
            .with_clock(Arc::clone(&config.clock)),
    );

    tracing::info!(
        capacity = config.capacity,
        supply_limit = config.supply_limit,
        "opening store"
    );

    let cancel = CancellationToken::new();

    let supplier = Supplier::new(Arc::clone(&store), config.supply_limit)
        .with_pace(config.supply_pace);
    let customer = Customer::new(Arc::clone(&store)).with_pace(config.take_pace);

    let supplier_task = tokio::spawn(supplier.run(cancel.child_token()));
    let customer_task = tokio::spawn(customer.run(cancel.child_token()));

    let supplier_report = match supplier_task.await {
        Ok(report) => report,
        Err(e) => {
            cancel.cancel();
            return Err(OrchestratorError::Join(e.to_string()));
        }
    };

    store.close();
    cancel.cancel();

    let customer_report = customer_task
        .await
        .map_err(|e| OrchestratorError::Join(e.to_string()))?;

    let snapshot = store.snapshot();
    tracing::info!(remaining = snapshot.count, "shutting down");

    Ok(RunSummary {
        supplied: supplier_report.delivered,
        taken: customer_report.taken,
        remaining: snapshot.count,
        supplier: supplier_report,
        customer: customer_report,
        store: snapshot,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::clock::FixedClock;

    fn clock_at(hour: u32) -> Arc<dyn Clock> {
        Arc::new(FixedClock(NaiveTime::from_hms_opt(hour, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn zero_capacity_fails_before_any_task_starts() {
        let config = OrchestratorConfig::new().with_capacity(0);
        assert!(matches!(
            run(config).await,
            Err(OrchestratorError::Config(StoreError::ZeroCapacity))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn supplier_and_customer_reconcile() {
        let config = OrchestratorConfig::new()
            .with_supply_limit(5)
            .with_clock(clock_at(12));

        let summary = run(config).await.unwrap();

        assert_eq!(summary.supplied, 5);
        assert_eq!(summary.remaining, summary.supplied - summary.taken);
        assert_eq!(summary.store.count, summary.remaining);
        assert!(!summary.store.open);
    }

    #[tokio::test(start_paused = true)]
    async fn after_hours_run_takes_nothing() {
        let config = OrchestratorConfig::new()
            .with_supply_limit(4)
            .with_clock(clock_at(2));

        let summary = run(config).await.unwrap();

        assert_eq!(summary.supplied, 4);
        assert_eq!(summary.taken, 0);
        assert_eq!(summary.remaining, 4);
        assert!(summary.customer.after_hours_visits > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn wide_window_run_lets_customer_drain() {
        // Supplier far slower than the customer: every delivery is picked up
        // before the next one lands.
        let config = OrchestratorConfig::new()
            .with_supply_limit(3)
            .with_supply_pace(Duration::from_secs(10))
            .with_take_pace(Duration::from_secs(1))
            .with_clock(clock_at(12));

        let summary = run(config).await.unwrap();

        assert_eq!(summary.supplied, 3);
        assert_eq!(summary.taken, 3);
        assert_eq!(summary.remaining, 0);
    }
}
