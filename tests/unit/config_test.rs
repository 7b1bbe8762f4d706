//! Tests for configuration validation

use prometheus_resource_core::config::{
    CircuitBreakerConfig, DetectorConfig, PoolManagerConfig, ResourceCoreConfig, ThresholdPair,
};

#[test]
fn test_defaults_are_valid() {
    let cfg = ResourceCoreConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.detector.sampling_interval_ms, 5_000);
    assert_eq!(cfg.pool.max_pool_size, 10);
    assert_eq!(cfg.pool.global_max(), 40);
    assert_eq!(cfg.circuit_breaker.failure_threshold, 5);
    assert_eq!(cfg.circuit_breaker.half_open_max_attempts, 1);
}

#[test]
fn test_pool_config_invalid_max_size() {
    let invalid = PoolManagerConfig {
        max_pool_size: 0,
        ..PoolManagerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_inverted_thresholds() {
    let invalid = PoolManagerConfig {
        warning_threshold: 0.95,
        critical_threshold: 0.9,
        ..PoolManagerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_detector_config_inverted_thresholds() {
    let mut invalid = DetectorConfig::default();
    invalid.thresholds.disk = ThresholdPair::new(95.0, 80.0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_breaker_config_zero_threshold() {
    let invalid = CircuitBreakerConfig {
        failure_threshold: 0,
        ..CircuitBreakerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_json_partial_config_keeps_defaults() {
    let cfg = ResourceCoreConfig::from_json_str(
        r#"{"pool":{"max_pool_size":4},"detector":{"thresholds":{"cpu":{"warning_percent":60.0,"critical_percent":80.0}}}}"#,
    )
    .unwrap();
    assert_eq!(cfg.pool.max_pool_size, 4);
    assert_eq!(cfg.pool.cache_max_size, 100);
    assert!((cfg.detector.thresholds.cpu.warning_percent - 60.0).abs() < f64::EPSILON);
    assert!((cfg.detector.thresholds.memory.warning_percent - 70.0).abs() < f64::EPSILON);
}

#[test]
fn test_json_invalid_config_is_rejected() {
    let err = ResourceCoreConfig::from_json_str(r#"{"pool":{"cache_max_size":0}}"#).unwrap_err();
    assert!(err.contains("cache_max_size"));
}

#[test]
fn test_json_absolute_levels() {
    let cfg = ResourceCoreConfig::from_json_str(
        r#"{"detector":{"constraints":{"disk":{"warning_absolute":500.0,"critical_absolute":900.0}}}}"#,
    )
    .unwrap();
    assert_eq!(cfg.detector.constraints.disk.warning_absolute, Some(500.0));
    assert_eq!(cfg.detector.constraints.disk.critical_absolute, Some(900.0));
    assert_eq!(cfg.detector.constraints.memory.warning_absolute, None);

    let err = ResourceCoreConfig::from_json_str(
        r#"{"detector":{"constraints":{"cpu":{"warning_absolute":90.0,"critical_absolute":50.0}}}}"#,
    )
    .unwrap_err();
    assert!(err.contains("warning_absolute"));
}
