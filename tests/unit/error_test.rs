//! Tests for error types

use prometheus_resource_core::core::{CircuitOpenError, DetectorError, PoolError, ResourceDimension};

#[test]
fn test_resource_exhausted_error() {
    let err = PoolError::ResourceExhausted("high tier full".to_string());
    assert_eq!(format!("{}", err), "resource exhausted: high tier full");
    assert_eq!(err.code(), "RESOURCE_EXHAUSTED");
}

#[test]
fn test_circuit_open_error() {
    let err = PoolError::CircuitOpen;
    assert_eq!(format!("{}", err), "Circuit breaker is open");
    assert_eq!(err.code(), "CIRCUIT_OPEN");
}

#[test]
fn test_circuit_open_converts_into_pool_error() {
    let err: PoolError = CircuitOpenError.into();
    assert_eq!(err, PoolError::CircuitOpen);
    assert_eq!(CircuitOpenError.to_string(), err.to_string());
}

#[test]
fn test_stale_and_invalid_pool_are_not_retryable() {
    assert!(!PoolError::ResourceStale("r".into()).is_retryable());
    assert!(!PoolError::InvalidPool("r".into()).is_retryable());
    assert!(!PoolError::InvalidPriority("urgent".into()).is_retryable());
    assert!(!PoolError::Disposed.is_retryable());
}

#[test]
fn test_detector_error_names_dimension() {
    let err = DetectorError::Sampling {
        dimension: ResourceDimension::Disk,
        reason: "no disks".to_string(),
    };
    assert_eq!(format!("{}", err), "sampling disk failed: no disks");
}
