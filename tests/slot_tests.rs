//! EventSlot unit tests

#[cfg(test)]
mod tests {
    use viewer_bridge::slot::EventSlot;
    use viewer_bridge::types::EventKind;

    fn make_slot() -> EventSlot<String> {
        EventSlot::new(EventKind::Touched)
    }

    // -----------------------------------------------------------------------
    // Publish / overwrite
    // -----------------------------------------------------------------------

    #[test]
    fn publish_then_deliver_returns_payload() {
        let slot = make_slot();
        slot.publish("a".to_string());
        assert!(slot.has_pending());

        assert_eq!(slot.try_begin_delivery().as_deref(), Some("a"));
        assert!(slot.is_in_flight());
        assert!(!slot.has_pending());
    }

    #[test]
    fn second_publish_overwrites_first() {
        let slot = make_slot();
        slot.publish("a".to_string());
        slot.publish("b".to_string());

        assert_eq!(slot.try_begin_delivery().as_deref(), Some("b"));
        slot.finish_delivery();
        assert_eq!(slot.try_begin_delivery(), None);
    }

    #[test]
    fn empty_slot_has_nothing_to_deliver() {
        let slot = make_slot();
        assert_eq!(slot.try_begin_delivery(), None);
        assert!(!slot.is_in_flight());
    }

    // -----------------------------------------------------------------------
    // In-flight discipline
    // -----------------------------------------------------------------------

    #[test]
    fn no_second_delivery_while_in_flight() {
        let slot = make_slot();
        slot.publish("a".to_string());
        assert!(slot.try_begin_delivery().is_some());

        // A payload arriving mid-delivery is retained, not delivered yet
        slot.publish("b".to_string());
        assert_eq!(slot.try_begin_delivery(), None);

        slot.finish_delivery();
        assert_eq!(slot.try_begin_delivery().as_deref(), Some("b"));
    }

    #[test]
    fn finish_leaves_slot_idle() {
        let slot = make_slot();
        slot.publish("a".to_string());
        let _ = slot.try_begin_delivery();
        slot.finish_delivery();

        assert!(!slot.is_in_flight());
        assert!(!slot.has_pending());
    }

    // -----------------------------------------------------------------------
    // Clear / identity
    // -----------------------------------------------------------------------

    #[test]
    fn clear_drops_pending_payload() {
        let slot = make_slot();
        slot.publish("a".to_string());
        slot.clear();
        assert_eq!(slot.try_begin_delivery(), None);
    }

    #[test]
    fn kind_is_fixed_at_construction() {
        let slot = make_slot();
        assert_eq!(slot.kind(), EventKind::Touched);
        assert_eq!(slot.kind().as_str(), "touched");
    }

    #[test]
    fn every_kind_has_a_distinct_label() {
        let labels: std::collections::HashSet<&str> =
            EventKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(labels.len(), EventKind::ALL.len());
    }
}
