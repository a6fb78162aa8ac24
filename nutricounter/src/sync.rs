//! Live food-log subscription plumbing
//!
//! The remote store republishes the full ordered food log after every
//! change. `LogSubscription` is the receiving half of that feed and is
//! owned by the session lifecycle; `SnapshotPublisher` is the sending
//! half held by a store implementation.
//!
//! Cancellation is synchronous and unconditional: after `unsubscribe`
//! returns, no snapshot — including ones already queued — is ever
//! observed again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::store::models::NutrientRecord;

/// A full replacement of the local food-log mirror, ordered by
/// `logged_at` descending.
pub type LogSnapshot = Vec<NutrientRecord>;

/// Create a connected publisher/subscription pair.
pub fn channel() -> (SnapshotPublisher, LogSubscription) {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancelled = Arc::new(AtomicBool::new(false));

    let publisher = SnapshotPublisher {
        tx,
        cancelled: Arc::clone(&cancelled),
    };
    let subscription = LogSubscription { rx, cancelled };

    (publisher, subscription)
}

/// Sending half of a live food-log feed, held by the store.
#[derive(Clone)]
pub struct SnapshotPublisher {
    tx: mpsc::UnboundedSender<LogSnapshot>,
    cancelled: Arc<AtomicBool>,
}

impl SnapshotPublisher {
    /// Deliver a snapshot to the subscriber.
    ///
    /// Returns false when the subscription has been cancelled or dropped;
    /// the store should then discard this publisher.
    pub fn publish(&self, snapshot: LogSnapshot) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return false;
        }
        self.tx.send(snapshot).is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Receiving half of a live food-log feed.
///
/// Snapshots arrive in the order the store emitted them; the latest one
/// received wins. Dropping the subscription cancels it.
pub struct LogSubscription {
    rx: mpsc::UnboundedReceiver<LogSnapshot>,
    cancelled: Arc<AtomicBool>,
}

impl LogSubscription {
    /// Wait for the next snapshot. Returns None once the feed has ended
    /// or the subscription was cancelled.
    pub async fn next(&mut self) -> Option<LogSnapshot> {
        if self.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        self.rx.recv().await
    }

    /// Take an already-queued snapshot without waiting.
    pub fn try_next(&mut self) -> Option<LogSnapshot> {
        if self.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// Cancel the subscription. Synchronous: once this returns, `next`
    /// and `try_next` yield nothing, whatever the store does afterwards.
    pub fn unsubscribe(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.rx.close();
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
