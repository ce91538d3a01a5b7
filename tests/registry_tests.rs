//! ChannelRegistry subsystem tests

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use viewer_bridge::registry::ChannelRegistry;

    // -----------------------------------------------------------------------
    // Message subsystem
    // -----------------------------------------------------------------------

    #[test]
    fn send_message_invokes_every_handler_in_order() {
        let registry = ChannelRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let order = Arc::clone(&order);
            registry.register_message("chan", move |_args| {
                order.lock().push(tag);
                None
            });
        }

        let result = registry.send_message("chan", &json!({ "k": 1 }));
        assert_eq!(result, None);
        assert_eq!(*order.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn send_message_discards_handler_returns() {
        let registry = ChannelRegistry::new();
        registry.register_message("chan", |_args| Some(json!("ignored")));
        registry.register_message("chan", |_args| Some(json!(42)));

        assert_eq!(registry.send_message("chan", &Value::Null), None);
    }

    #[test]
    fn send_message_on_unknown_channel_is_a_noop() {
        let registry = ChannelRegistry::new();
        assert_eq!(registry.send_message("nobody-home", &Value::Null), None);
    }

    #[test]
    fn duplicate_handler_registrations_each_fire() {
        let registry = ChannelRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let count = Arc::clone(&count);
            registry.register_message("chan", move |_args| {
                count.fetch_add(1, Ordering::SeqCst);
                None
            });
        }

        registry.send_message("chan", &Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(registry.message_handler_count("chan"), 2);
    }

    #[test]
    fn handler_panic_does_not_stop_the_fanout() {
        let registry = ChannelRegistry::new();
        let reached = Arc::new(AtomicUsize::new(0));
        registry.register_message("chan", |_args| panic!("handler bug"));
        {
            let reached = Arc::clone(&reached);
            registry.register_message("chan", move |_args| {
                reached.fetch_add(1, Ordering::SeqCst);
                None
            });
        }

        registry.send_message("chan", &Value::Null);
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    // -----------------------------------------------------------------------
    // Callback subsystem
    // -----------------------------------------------------------------------

    #[test]
    fn first_registered_callback_always_answers() {
        let registry = ChannelRegistry::new();
        registry.register_callback("chan", |_m| "A".to_string());
        registry.register_callback("chan", |_m| "B".to_string());
        registry.register_callback("chan", |_m| "C".to_string());

        for _ in 0..3 {
            assert_eq!(registry.run_callback("chan", "ping"), "A");
        }
        assert_eq!(registry.callback_count("chan"), 3);
    }

    #[test]
    fn run_callback_passes_the_message_through() {
        let registry = ChannelRegistry::new();
        registry.register_callback("chan", |m| format!("echo:{}", m));
        assert_eq!(registry.run_callback("chan", "hello"), "echo:hello");
    }

    #[test]
    fn run_callback_on_unknown_channel_returns_empty() {
        let registry = ChannelRegistry::new();
        assert_eq!(registry.run_callback("nobody-home", "ping"), "");
    }

    // -----------------------------------------------------------------------
    // Namespace separation
    // -----------------------------------------------------------------------

    #[test]
    fn message_and_callback_namespaces_are_disjoint() {
        let registry = ChannelRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = Arc::clone(&hits);
            registry.register_message("shared", move |_args| {
                hits.fetch_add(1, Ordering::SeqCst);
                None
            });
        }
        registry.register_callback("shared", |_m| "cb".to_string());

        assert_eq!(registry.run_callback("shared", "x"), "cb");
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        registry.send_message("shared", &Value::Null);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert_eq!(registry.message_channel_count(), 1);
        assert_eq!(registry.callback_channel_count(), 1);
    }
}
