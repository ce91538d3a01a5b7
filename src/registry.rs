//! Named-channel registry: multicast messages and first-responder callbacks.
//!
//! Two disjoint subsystems share the channel-name keyspace but never each
//! other's handlers:
//!
//! | Subsystem | Fan-out                 | Result                  |
//! |-----------|-------------------------|-------------------------|
//! | message   | every handler, in order | discarded (`None`)      |
//! | callback  | first registrant only   | that callback's string  |
//!
//! Registration is append-only; there is no unregister. `close` runs once at
//! teardown, after which registrations are ignored and lookups come back
//! empty.

use log::{debug, warn};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub type MessageHandler = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;
pub type ChannelCallback = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub struct ChannelRegistry {
    messages: RwLock<HashMap<String, Vec<MessageHandler>>>,
    callbacks: RwLock<HashMap<String, Vec<ChannelCallback>>>,
    closed: AtomicBool,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
            callbacks: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    // -----------------------------------------------------------------------
    // Message subsystem (multicast, fire-and-forget)
    // -----------------------------------------------------------------------

    /// Append a handler to `channel`. Duplicate registrations are legal and
    /// each one is invoked per send.
    pub fn register_message(
        &self,
        channel: impl Into<String>,
        handler: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) {
        if self.closed.load(Ordering::Acquire) {
            debug!("registry closed; dropping message handler registration");
            return;
        }
        self.messages
            .write()
            .entry(channel.into())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Invoke every handler on `channel` in registration order, on the
    /// calling context.
    ///
    /// Handler return values are discarded and the call always yields
    /// `None`; callers must not expect a reply on this path. Unknown
    /// channels are a no-op. A panicking handler is logged and the sweep
    /// continues.
    pub fn send_message(&self, channel: &str, args: &Value) -> Option<Value> {
        let handlers: Vec<MessageHandler> = match self.messages.read().get(channel) {
            Some(list) => list.clone(),
            None => {
                debug!("no message handlers on channel '{}'", channel);
                return None;
            }
        };
        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(args))).is_err() {
                warn!("message handler on '{}' panicked; continuing", channel);
            }
        }
        None
    }

    // -----------------------------------------------------------------------
    // Callback subsystem (first responder wins)
    // -----------------------------------------------------------------------

    pub fn register_callback(
        &self,
        channel: impl Into<String>,
        callback: impl Fn(&str) -> String + Send + Sync + 'static,
    ) {
        if self.closed.load(Ordering::Acquire) {
            debug!("registry closed; dropping callback registration");
            return;
        }
        self.callbacks
            .write()
            .entry(channel.into())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Run the first callback ever registered on `channel` and return its
    /// result.
    ///
    /// Later registrants are retained but never consulted. Unknown channels
    /// return the empty string. A panic in the callback propagates; this is
    /// the one request/response path in the registry.
    pub fn run_callback(&self, channel: &str, message: &str) -> String {
        let first = self
            .callbacks
            .read()
            .get(channel)
            .and_then(|list| list.first().cloned());
        match first {
            Some(callback) => callback(message),
            None => {
                debug!("no callback on channel '{}'", channel);
                String::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Introspection / teardown
    // -----------------------------------------------------------------------

    pub fn message_channel_count(&self) -> usize {
        self.messages.read().len()
    }

    pub fn callback_channel_count(&self) -> usize {
        self.callbacks.read().len()
    }

    pub fn message_handler_count(&self, channel: &str) -> usize {
        self.messages.read().get(channel).map_or(0, |l| l.len())
    }

    pub fn callback_count(&self, channel: &str) -> usize {
        self.callbacks.read().get(channel).map_or(0, |l| l.len())
    }

    /// Drop every registration and refuse new ones.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.messages.write().clear();
        self.callbacks.write().clear();
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
