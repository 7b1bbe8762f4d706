//! Tests for utility functions

use prometheus_resource_core::core::PoolError;
use prometheus_resource_core::util::{
    init_tracing, init_tracing_with_default, Clock, Priority, ResourceType, SystemClock,
};

#[test]
fn test_priority_parsing() {
    assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
    assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
    assert_eq!(Priority::try_from(3u8).unwrap(), Priority::Critical);
}

#[test]
fn test_unknown_priority_is_invalid() {
    let err = "urgent".parse::<Priority>().unwrap_err();
    assert_eq!(err, PoolError::InvalidPriority("urgent".to_string()));
    assert_eq!(err.code(), "INVALID_PRIORITY");
    assert!(Priority::try_from(9u8).is_err());
}

#[test]
fn test_priority_serde_is_snake_case() {
    assert_eq!(serde_json::to_string(&Priority::Critical).unwrap(), "\"critical\"");
    let kind: ResourceType = serde_json::from_str("\"inference\"").unwrap();
    assert_eq!(kind.as_str(), "inference");
}

#[test]
fn test_init_tracing_is_repeatable() {
    init_tracing_with_default("prometheus_resource_core=debug");
    init_tracing();
}

#[test]
fn test_system_clock_is_monotone_enough() {
    let a = SystemClock.now_ms();
    let b = SystemClock.now_ms();
    assert!(b >= a);
    assert!(a > 0);
}
