//! ListenerSet ordering and isolation tests

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use viewer_bridge::listeners::ListenerSet;

    fn make_set() -> ListenerSet<String> {
        ListenerSet::new("test")
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    #[test]
    fn listeners_run_in_subscription_order() {
        let set = make_set();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            set.subscribe(move |_e: &String| order.lock().push(tag));
        }

        set.notify(&"ping".to_string());
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn every_listener_sees_every_event() {
        let set = make_set();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = Arc::clone(&count);
            set.subscribe(move |_e: &String| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        set.notify(&"a".to_string());
        set.notify(&"b".to_string());
        assert_eq!(count.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn len_tracks_subscriptions() {
        let set = make_set();
        assert!(set.is_empty());
        set.subscribe(|_e: &String| {});
        set.subscribe(|_e: &String| {});
        assert_eq!(set.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Panic isolation
    // -----------------------------------------------------------------------

    #[test]
    fn panicking_listener_does_not_stop_the_sweep() {
        let set = make_set();
        let reached = Arc::new(AtomicBool::new(false));
        set.subscribe(|_e: &String| panic!("listener bug"));
        {
            let reached = Arc::clone(&reached);
            set.subscribe(move |_e: &String| reached.store(true, Ordering::SeqCst));
        }

        set.notify(&"ping".to_string());
        assert!(reached.load(Ordering::SeqCst));
    }

    // -----------------------------------------------------------------------
    // Subscribing during a sweep
    // -----------------------------------------------------------------------

    #[test]
    fn subscribe_inside_listener_joins_next_sweep() {
        let set = Arc::new(ListenerSet::new("test"));
        let late_calls = Arc::new(AtomicUsize::new(0));
        {
            let set2 = Arc::clone(&set);
            let late_calls = Arc::clone(&late_calls);
            set.subscribe(move |_e: &String| {
                let late_calls = Arc::clone(&late_calls);
                set2.subscribe(move |_e: &String| {
                    late_calls.fetch_add(1, Ordering::SeqCst);
                });
            });
        }

        set.notify(&"first".to_string());
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        set.notify(&"second".to_string());
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }
}
