//! Single-item event mailbox.
//!
//! One slot per [`EventKind`]. Reports overwrite the pending payload
//! (last-writer-wins); the pump takes the payload when a delivery starts and
//! the slot stays marked in-flight until every listener has run. A report
//! that lands during an in-flight delivery is retained for the next tick.

use crate::types::EventKind;
use log::debug;
use parking_lot::Mutex;

struct SlotState<T> {
    pending: Option<T>,
    in_flight: bool,
}

pub struct EventSlot<T> {
    kind: EventKind,
    state: Mutex<SlotState<T>>,
}

impl<T> EventSlot<T> {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            state: Mutex::new(SlotState {
                pending: None,
                in_flight: false,
            }),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Store a payload, replacing any undelivered one.
    ///
    /// Never blocks on a running delivery and never fails.
    pub fn publish(&self, payload: T) {
        let mut state = self.state.lock();
        if state.pending.replace(payload).is_some() {
            debug!("{} slot overwrote an undelivered payload", self.kind);
        }
    }

    /// Take the pending payload and mark the slot in-flight.
    ///
    /// Returns `None` when there is nothing pending or a delivery is already
    /// running. A `Some` return must be followed by
    /// [`finish_delivery`](Self::finish_delivery) once the sweep is done.
    pub fn try_begin_delivery(&self) -> Option<T> {
        let mut state = self.state.lock();
        if state.in_flight {
            return None;
        }
        let payload = state.pending.take()?;
        state.in_flight = true;
        Some(payload)
    }

    /// Mark the in-flight delivery as complete.
    pub fn finish_delivery(&self) {
        self.state.lock().in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.lock().in_flight
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Drop any undelivered payload.
    pub fn clear(&self) {
        self.state.lock().pending = None;
    }
}
