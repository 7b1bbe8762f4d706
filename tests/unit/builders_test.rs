//! Tests for builders

use std::sync::Arc;

use prometheus_resource_core::builders::{build_detector, build_manager_with_detector};
use prometheus_resource_core::config::ResourceCoreConfig;

#[test]
fn test_build_detector_rejects_zero_interval() {
    let mut cfg = ResourceCoreConfig::default();
    cfg.detector.sampling_interval_ms = 0;
    let err = build_detector(&cfg).unwrap_err();
    assert_eq!(err.code(), "INVALID_CONFIG");
}

#[test]
fn test_manager_shares_supplied_detector() {
    let cfg = ResourceCoreConfig::default();
    let detector = build_detector(&cfg).unwrap();
    let manager = build_manager_with_detector(&cfg, Arc::clone(&detector)).unwrap();
    assert!(Arc::ptr_eq(manager.detector(), &detector));
    assert_eq!(detector.update_listeners().len(), 1);

    drop(manager);
    assert!(detector.update_listeners().is_empty());
}
