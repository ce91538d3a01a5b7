//! Delivery pump – one fire-and-forget task per event kind.
//!
//! ```text
//!   report_*()           tick()                          tokio task
//!   ──────────▶ slot ──▶ try_begin_delivery ──spawn──▶ listener sweep
//!                ▲                                          │
//!                └───────────── finish_delivery ◀───────────┘
//! ```
//!
//! The pump owns the cancellation flag checked between listener invocations
//! and the join handles of still-running deliveries. A slot whose delivery
//! is in flight is skipped until the task marks it idle, which is what keeps
//! listeners of one kind from ever overlapping.

use crate::listeners::ListenerSet;
use crate::slot::EventSlot;
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct DeliveryPump {
    cancelled: Arc<AtomicBool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DeliveryPump {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start a delivery for `slot` if it holds a payload and none is
    /// already running. Returns `true` when a task was spawned.
    ///
    /// Must be called from within a tokio runtime; the sweep itself runs on
    /// a worker, never on the caller.
    pub fn drive<T: Send + 'static>(
        &self,
        slot: &Arc<EventSlot<T>>,
        listeners: &Arc<ListenerSet<T>>,
        delivered: &Arc<AtomicU64>,
    ) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return false;
        }
        let Some(payload) = slot.try_begin_delivery() else {
            return false;
        };

        let kind = slot.kind();
        let slot = Arc::clone(slot);
        let listeners = Arc::clone(listeners);
        let delivered = Arc::clone(delivered);
        let cancelled = Arc::clone(&self.cancelled);
        let handle = tokio::spawn(async move {
            let ran = listeners.notify_until(&payload, &cancelled);
            slot.finish_delivery();
            delivered.fetch_add(1, Ordering::Relaxed);
            debug!("{} delivery complete ({} listeners)", kind, ran);
        });

        self.prune();
        self.tasks.lock().push(handle);
        true
    }

    /// Stop new deliveries and ask running sweeps to wind down.
    ///
    /// Cooperative: a listener that is already executing finishes, the sweep
    /// stops before the next one.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Number of delivery tasks still running.
    pub fn in_flight(&self) -> usize {
        self.prune();
        self.tasks.lock().len()
    }

    fn prune(&self) {
        self.tasks.lock().retain(|h| !h.is_finished());
    }
}

impl Default for DeliveryPump {
    fn default() -> Self {
        Self::new()
    }
}
