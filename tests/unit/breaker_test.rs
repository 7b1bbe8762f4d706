//! Tests for the circuit breaker state machine

use std::sync::Arc;

use prometheus_resource_core::config::CircuitBreakerConfig;
use prometheus_resource_core::core::{CircuitBreaker, CircuitStatus, PoolError};
use prometheus_resource_core::util::ManualClock;

fn breaker(threshold: u32, probes: u32) -> (CircuitBreaker, ManualClock) {
    let clock = ManualClock::default();
    let cfg = CircuitBreakerConfig {
        failure_threshold: threshold,
        reset_timeout_ms: 1_000,
        half_open_max_attempts: probes,
    };
    (CircuitBreaker::with_clock(cfg, Arc::new(clock.clone())), clock)
}

fn fail(b: &CircuitBreaker) -> Result<(), PoolError> {
    b.execute(|| Err(PoolError::ResourceExhausted("busy".into())))
}

#[test]
fn test_opens_after_threshold_and_reports_half_open_after_window() {
    let (b, clock) = breaker(3, 1);
    for _ in 0..3 {
        assert!(matches!(fail(&b), Err(PoolError::ResourceExhausted(_))));
    }
    assert_eq!(b.state().status, CircuitStatus::Open);
    assert_eq!(b.state().failure_count, 3);
    assert_eq!(fail(&b), Err(PoolError::CircuitOpen));

    clock.advance(1_000);
    assert_eq!(b.state().status, CircuitStatus::HalfOpen);
}

#[test]
fn test_failed_probe_reopens_with_fresh_window() {
    let (b, clock) = breaker(1, 1);
    let _ = fail(&b);
    clock.advance(1_000);
    assert!(matches!(fail(&b), Err(PoolError::ResourceExhausted(_))));
    assert_eq!(b.state().status, CircuitStatus::Open);

    clock.advance(999);
    assert_eq!(b.execute(|| Ok::<_, PoolError>(1)), Err(PoolError::CircuitOpen));
    clock.advance(1);
    assert_eq!(b.execute(|| Ok::<_, PoolError>(1)), Ok(1));
    assert_eq!(b.state().status, CircuitStatus::Closed);
    assert_eq!(b.state().failure_count, 0);
}

#[test]
fn test_success_resets_failure_count_while_closed() {
    let (b, _) = breaker(3, 1);
    let _ = fail(&b);
    let _ = fail(&b);
    b.execute(|| Ok::<_, PoolError>(())).unwrap();
    let _ = fail(&b);
    let state = b.state();
    assert_eq!(state.status, CircuitStatus::Closed);
    assert_eq!(state.failure_count, 1);
    assert!(state.last_success_ms.is_some());
}

#[test]
fn test_reset_closes_circuit() {
    let (b, _) = breaker(1, 1);
    let _ = fail(&b);
    b.reset();
    assert_eq!(b.state().status, CircuitStatus::Closed);
    assert_eq!(b.execute(|| Ok::<_, PoolError>("ok")), Ok("ok"));
}
