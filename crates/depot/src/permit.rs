//! Counting permit gate bounding concurrent store operations.
//!
//! The gate hands out unit tokens from a bounded channel pre-filled at
//! construction. A token returns to the channel when its [`Permit`] guard is
//! dropped, so release happens on every exit path. There is no FIFO guarantee
//! among waiters: whichever blocked acquirer holds the receiver lock next
//! gets the freed token.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};

/// Unit token flowing through the gate's channel.
struct PermitToken;

/// A held permit. Returns its token to the gate on drop.
pub struct Permit {
    gate_tx: mpsc::Sender<PermitToken>,
    available_count: Arc<AtomicUsize>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        // Tokens are conserved, so the buffer always has room; try_send only
        // fails if the gate itself was dropped first.
        if self.gate_tx.try_send(PermitToken).is_ok() {
            self.available_count.fetch_add(1, Ordering::Release);
        }
    }
}

/// Gate limiting how many operations may be in flight at once.
pub struct PermitGate {
    available_rx: Mutex<mpsc::Receiver<PermitToken>>,
    available_tx: mpsc::Sender<PermitToken>,
    capacity: usize,
    available_count: Arc<AtomicUsize>,
}

impl PermitGate {
    /// Create a gate with `capacity` permits, all initially available.
    pub fn new(capacity: usize) -> Self {
        // mpsc::channel panics on a zero buffer; Store validates capacity
        // upstream, so the max(1) only guards direct zero-capacity use.
        let (available_tx, available_rx) = mpsc::channel(capacity.max(1));
        let available_count = Arc::new(AtomicUsize::new(0));

        for _ in 0..capacity {
            if available_tx.try_send(PermitToken).is_ok() {
                available_count.fetch_add(1, Ordering::Release);
            }
        }

        Self {
            available_rx: Mutex::new(available_rx),
            available_tx,
            capacity,
            available_count,
        }
    }

    /// Acquire a permit, waiting until one is free.
    ///
    /// Cancel-safe: dropping the returned future before completion consumes
    /// no permit. `None` only if the gate's channel closed, which cannot
    /// happen while the gate is alive; callers may treat it as shutdown.
    pub async fn acquire(&self) -> Option<Permit> {
        let mut rx = self.available_rx.lock().await;
        rx.recv().await?;
        self.available_count.fetch_sub(1, Ordering::Release);

        Some(Permit {
            gate_tx: self.available_tx.clone(),
            available_count: Arc::clone(&self.available_count),
        })
    }

    /// Acquire a permit without waiting. `None` if all permits are held.
    pub fn try_acquire(&self) -> Option<Permit> {
        let mut rx = self.available_rx.try_lock().ok()?;
        rx.try_recv().ok()?;
        self.available_count.fetch_sub(1, Ordering::Release);

        Some(Permit {
            gate_tx: self.available_tx.clone(),
            available_count: Arc::clone(&self.available_count),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.available_count.load(Ordering::Acquire)
    }
}
