//! Typed multicast listener sets.
//!
//! Append-only: hosts subscribe, nothing unsubscribes until teardown clears
//! the sets. Invocation walks a snapshot of the list, so subscribing from
//! inside a listener is safe and takes effect from the next multicast. A
//! panicking listener is logged and skipped; the sweep continues.

use crate::protocol::{
    AvatarPicked, ChatReceived, DebugMessage, Dispatched, StateChanged, Teleported,
    TeleportStarted, Touched, WindowRequest,
};
use log::warn;
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

// ---------------------------------------------------------------------------
// ListenerSet
// ---------------------------------------------------------------------------

pub struct ListenerSet<E> {
    name: &'static str,
    entries: RwLock<Vec<Listener<E>>>,
}

impl<E> ListenerSet<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) {
        self.entries.write().push(Arc::new(listener));
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }

    fn snapshot(&self) -> Vec<Listener<E>> {
        self.entries.read().clone()
    }

    /// Invoke every listener in subscription order on the calling context.
    pub fn notify(&self, event: &E) {
        for listener in self.snapshot() {
            invoke_guarded(self.name, &listener, event);
        }
    }

    /// Like [`notify`](Self::notify) but checks `cancelled` between
    /// listeners and stops once it is set. Returns how many listeners ran.
    pub(crate) fn notify_until(&self, event: &E, cancelled: &AtomicBool) -> usize {
        let mut ran = 0;
        for listener in self.snapshot() {
            if cancelled.load(Ordering::Acquire) {
                break;
            }
            invoke_guarded(self.name, &listener, event);
            ran += 1;
        }
        ran
    }
}

fn invoke_guarded<E>(name: &str, listener: &Listener<E>, event: &E) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(event))) {
        let msg = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic".into());
        warn!("{} listener panicked ({}); continuing", name, msg);
    }
}

// ---------------------------------------------------------------------------
// Host listener bundle
// ---------------------------------------------------------------------------

/// One [`ListenerSet`] per event family the host can subscribe to.
///
/// The four slot-backed sets are shared with delivery tasks, so everything
/// here lives behind an `Arc`.
pub(crate) struct HostListeners {
    pub touched: Arc<ListenerSet<Touched>>,
    pub avatar_picked: Arc<ListenerSet<AvatarPicked>>,
    pub teleport_started: Arc<ListenerSet<TeleportStarted>>,
    pub teleported: Arc<ListenerSet<Teleported>>,
    pub dispatch: Arc<ListenerSet<Dispatched>>,
    pub state_changed: Arc<ListenerSet<StateChanged>>,
    pub window_request: Arc<ListenerSet<WindowRequest>>,
    pub chat_received: Arc<ListenerSet<ChatReceived>>,
    pub debug_message: Arc<ListenerSet<DebugMessage>>,
}

impl HostListeners {
    pub fn new() -> Self {
        Self {
            touched: Arc::new(ListenerSet::new("touched")),
            avatar_picked: Arc::new(ListenerSet::new("avatar_picked")),
            teleport_started: Arc::new(ListenerSet::new("teleport_started")),
            teleported: Arc::new(ListenerSet::new("teleported")),
            dispatch: Arc::new(ListenerSet::new("dispatch")),
            state_changed: Arc::new(ListenerSet::new("state_changed")),
            window_request: Arc::new(ListenerSet::new("window_request")),
            chat_received: Arc::new(ListenerSet::new("chat_received")),
            debug_message: Arc::new(ListenerSet::new("debug_message")),
        }
    }

    /// Release every host closure. Called once at teardown.
    pub fn clear_all(&self) {
        self.touched.clear();
        self.avatar_picked.clear();
        self.teleport_started.clear();
        self.teleported.clear();
        self.dispatch.clear();
        self.state_changed.clear();
        self.window_request.clear();
        self.chat_received.clear();
        self.debug_message.clear();
    }
}
