//! Store: shared item count and open/closed flag behind a permit gate.
//!
//! The gate bounds how many operations run concurrently; it does not bound
//! the item count. The count lives behind its own mutex since a gate wider
//! than one permit gives no mutual exclusion. `close()` is not synchronized
//! with in-flight permit holders: an operation already past its open-check
//! may complete after the store closes.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::clock::{Clock, SystemClock, WorkingHours};
use crate::permit::PermitGate;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store capacity must be positive")]
    ZeroCapacity,
}

/// Result of an `add_item` call. Normal control flow, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Item stored; `count` is the new total.
    Added { count: u64 },
    /// Store already closed; the delivery was dropped.
    Closed,
}

impl AddOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Closed => "closed",
        }
    }
}

/// Result of a `take_item` call. Normal control flow, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeOutcome {
    /// Item removed; `count` is the new total.
    Taken { count: u64 },
    /// Nothing to take. Callers retry on their own pacing timer.
    Empty,
    /// Pickups are not permitted at this hour.
    OutsideHours,
    /// Store already closed.
    Closed,
}

impl TakeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taken { .. } => "taken",
            Self::Empty => "empty",
            Self::OutsideHours => "outside_hours",
            Self::Closed => "closed",
        }
    }
}

/// Point-in-time view of the store for summaries and callers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreSnapshot {
    pub count: u64,
    pub capacity: usize,
    pub open: bool,
    pub added: u64,
    pub taken: u64,
    pub rejected_empty: u64,
    pub rejected_closed: u64,
    pub rejected_after_hours: u64,
}

#[derive(Default)]
struct Counters {
    added: AtomicU64,
    taken: AtomicU64,
    rejected_empty: AtomicU64,
    rejected_closed: AtomicU64,
    rejected_after_hours: AtomicU64,
}

/// Shared store. All access to the count goes through `add_item`/`take_item`;
/// the raw fields are never exposed.
pub struct Store {
    gate: PermitGate,
    count: StdMutex<u64>,
    open: AtomicBool,
    hours: WorkingHours,
    clock: Arc<dyn Clock>,
    counters: Counters,
}

impl Store {
    /// Create an open store whose gate holds `capacity` permits.
    pub fn new(capacity: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }

        Ok(Self {
            gate: PermitGate::new(capacity),
            count: StdMutex::new(0),
            open: AtomicBool::new(true),
            hours: WorkingHours::default(),
            clock: Arc::new(SystemClock),
            counters: Counters::default(),
        })
    }

    pub fn with_hours(mut self, hours: WorkingHours) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Add one item. Waits for a permit if `capacity` operations are already
    /// in flight; the permit is released on every exit path.
    pub async fn add_item(&self) -> AddOutcome {
        let Some(_permit) = self.gate.acquire().await else {
            return AddOutcome::Closed;
        };

        if !self.is_open() {
            self.counters.rejected_closed.fetch_add(1, Ordering::Relaxed);
            return AddOutcome::Closed;
        }

        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
        self.counters.added.fetch_add(1, Ordering::Relaxed);
        AddOutcome::Added { count: *count }
    }

    /// Take one item. Returns without blocking (and without a permit) when
    /// the store is closed or outside working hours; never waits for an item
    /// to appear.
    pub async fn take_item(&self) -> TakeOutcome {
        if !self.is_open() {
            self.counters.rejected_closed.fetch_add(1, Ordering::Relaxed);
            return TakeOutcome::Closed;
        }

        if !self.hours.contains(self.clock.time_of_day()) {
            self.counters
                .rejected_after_hours
                .fetch_add(1, Ordering::Relaxed);
            return TakeOutcome::OutsideHours;
        }

        let Some(_permit) = self.gate.acquire().await else {
            return TakeOutcome::Closed;
        };

        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        if *count > 0 {
            *count -= 1;
            self.counters.taken.fetch_add(1, Ordering::Relaxed);
            TakeOutcome::Taken { count: *count }
        } else {
            self.counters.rejected_empty.fetch_add(1, Ordering::Relaxed);
            TakeOutcome::Empty
        }
    }

    /// Close the store. Idempotent; returns whether this call performed the
    /// transition. The flag never reverts.
    pub fn close(&self) -> bool {
        let was_open = self.open.swap(false, Ordering::AcqRel);
        if was_open {
            tracing::info!("store closed");
        }
        was_open
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn count(&self) -> u64 {
        *self.count.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn capacity(&self) -> usize {
        self.gate.capacity()
    }

    pub fn available_permits(&self) -> usize {
        self.gate.available()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            count: self.count(),
            capacity: self.capacity(),
            open: self.is_open(),
            added: self.counters.added.load(Ordering::Relaxed),
            taken: self.counters.taken.load(Ordering::Relaxed),
            rejected_empty: self.counters.rejected_empty.load(Ordering::Relaxed),
            rejected_closed: self.counters.rejected_closed.load(Ordering::Relaxed),
            rejected_after_hours: self.counters.rejected_after_hours.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::clock::FixedClock;

    fn daytime_store(capacity: usize) -> Store {
        Store::new(capacity)
            .unwrap()
            .with_clock(Arc::new(FixedClock(
                NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            )))
    }

    fn night_store(capacity: usize) -> Store {
        Store::new(capacity)
            .unwrap()
            .with_clock(Arc::new(FixedClock(
                NaiveTime::from_hms_opt(2, 0, 0).unwrap(),
            )))
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(Store::new(0), Err(StoreError::ZeroCapacity)));
    }

    #[tokio::test]
    async fn take_from_empty_store_reports_empty() {
        let store = daytime_store(10);

        assert_eq!(store.take_item().await, TakeOutcome::Empty);
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn add_then_take_reports_running_counts() {
        let store = daytime_store(10);

        assert_eq!(store.add_item().await, AddOutcome::Added { count: 1 });
        assert_eq!(store.add_item().await, AddOutcome::Added { count: 2 });
        assert_eq!(store.add_item().await, AddOutcome::Added { count: 3 });
        assert_eq!(store.take_item().await, TakeOutcome::Taken { count: 2 });
    }

    #[tokio::test]
    async fn take_outside_hours_leaves_count_untouched() {
        let store = night_store(10);

        // Stock the store first; adding is not hour-gated.
        store.add_item().await;
        store.add_item().await;

        assert_eq!(store.take_item().await, TakeOutcome::OutsideHours);
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn closed_store_drops_additions() {
        let store = daytime_store(10);
        store.add_item().await;

        assert!(store.close());
        assert_eq!(store.add_item().await, AddOutcome::Closed);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn closed_store_turns_away_pickups() {
        let store = daytime_store(10);
        store.add_item().await;
        store.close();

        assert_eq!(store.take_item().await, TakeOutcome::Closed);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let store = daytime_store(10);

        assert!(store.close());
        assert!(!store.close());
        assert!(!store.is_open());
    }

    #[tokio::test]
    async fn count_is_not_capped_by_gate_capacity() {
        // The gate bounds concurrent operations, not stored items: sequential
        // adds each release their permit, so the count grows past capacity.
        let store = daytime_store(10);

        for i in 1..=20 {
            assert_eq!(store.add_item().await, AddOutcome::Added { count: i });
        }
        assert_eq!(store.count(), 20);
        assert_eq!(store.available_permits(), 10);
    }

    #[tokio::test]
    async fn operations_release_their_permits() {
        let store = daytime_store(3);

        store.add_item().await;
        store.take_item().await;
        store.take_item().await;
        assert_eq!(store.available_permits(), 3);
    }

    #[tokio::test]
    async fn snapshot_tallies_outcomes() {
        let store = daytime_store(10);

        store.add_item().await;
        store.add_item().await;
        store.take_item().await;
        store.take_item().await;
        store.take_item().await; // empty
        store.close();
        store.add_item().await; // rejected
        store.take_item().await; // rejected

        let snapshot = store.snapshot();
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.added, 2);
        assert_eq!(snapshot.taken, 2);
        assert_eq!(snapshot.rejected_empty, 1);
        assert_eq!(snapshot.rejected_closed, 2);
        assert!(!snapshot.open);
    }

    #[tokio::test]
    async fn after_hours_rejections_are_tallied() {
        let store = night_store(10);

        store.take_item().await;
        store.take_item().await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.rejected_after_hours, 2);
        assert_eq!(snapshot.taken, 0);
    }
}
