//! Tests for listener registries

use std::sync::Arc;

use prometheus_resource_core::core::{EventLog, Listeners};

#[test]
fn test_unsubscribed_listener_is_not_called() {
    let listeners = Listeners::<u32>::new();
    let log = Arc::new(EventLog::new(8));
    let id = EventLog::attach(&log, &listeners);
    listeners.emit(&1);
    assert!(listeners.unsubscribe(id));
    assert!(!listeners.unsubscribe(id));
    listeners.emit(&2);
    assert_eq!(log.events(), vec![1]);
}

#[test]
fn test_channel_subscription_receives_events() {
    let listeners = Listeners::<String>::new();
    let (id, rx) = listeners.subscribe_channel();
    listeners.emit(&"warning".to_string());
    assert_eq!(rx.try_recv().unwrap(), "warning");

    listeners.unsubscribe(id);
    listeners.emit(&"critical".to_string());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_event_log_drops_oldest() {
    let log = EventLog::new(2);
    for i in 0..5 {
        log.record(i);
    }
    assert_eq!(log.events(), vec![3, 4]);
}
