//! Circuit breaker for isolating repeated allocation failures.
//!
//! States:
//! - Closed: every call runs.
//! - Open: calls are rejected without running, until `reset_timeout_ms` has
//!   passed since the last failure.
//! - HalfOpen: up to `half_open_max_attempts` probe calls run; a successful
//!   probe closes the circuit, a failed one reopens it.

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CircuitBreakerConfig;
use crate::util::clock::{system_clock, SharedClock};

/// Rejection produced by an open circuit. The wrapped operation was not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Circuit breaker is open")]
pub struct CircuitOpenError;

/// Breaker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitStatus {
    /// Calls pass through.
    Closed,
    /// Calls are rejected.
    Open,
    /// Probe calls are being admitted.
    HalfOpen,
}

/// Snapshot of breaker bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitBreakerState {
    /// Current position.
    pub status: CircuitStatus,
    /// Failures since the last success.
    pub failure_count: u32,
    /// Time of the most recent failure (ms since epoch).
    pub last_failure_ms: Option<u128>,
    /// Time of the most recent success (ms since epoch).
    pub last_success_ms: Option<u128>,
    /// Probes admitted in the current half-open window.
    pub half_open_attempts: u32,
}

impl CircuitBreakerState {
    const fn new() -> Self {
        Self {
            status: CircuitStatus::Closed,
            failure_count: 0,
            last_failure_ms: None,
            last_success_ms: None,
            half_open_attempts: 0,
        }
    }
}

/// Failure-isolation gate around fallible operations.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<CircuitBreakerState>,
    clock: SharedClock,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Create a breaker on the system clock.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    /// Create a breaker on a custom clock.
    pub fn with_clock(config: CircuitBreakerConfig, clock: SharedClock) -> Self {
        Self {
            config,
            state: Mutex::new(CircuitBreakerState::new()),
            clock,
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Snapshot of the bookkeeping, with `status` reflecting elapsed time: an
    /// open circuit whose reset window has passed reports `HalfOpen`.
    pub fn state(&self) -> CircuitBreakerState {
        let now = self.clock.now_ms();
        let mut snapshot = self.state.lock().clone();
        if snapshot.status == CircuitStatus::Open && self.reset_window_elapsed(&snapshot, now) {
            snapshot.status = CircuitStatus::HalfOpen;
            snapshot.half_open_attempts = 0;
        }
        snapshot
    }

    /// Force the circuit closed and clear counters.
    pub fn reset(&self) {
        *self.state.lock() = CircuitBreakerState::new();
        debug!("circuit breaker reset");
    }

    /// Run `op` if the circuit admits it, recording the outcome.
    ///
    /// The operation's own error is returned unchanged. When the circuit
    /// rejects the call, `op` is not run and [`CircuitOpenError`] is converted
    /// into `E`.
    pub fn execute<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<CircuitOpenError>,
    {
        self.acquire()?;
        match op() {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(err) => {
                self.on_failure();
                Err(err)
            }
        }
    }

    fn reset_window_elapsed(&self, state: &CircuitBreakerState, now: u128) -> bool {
        state
            .last_failure_ms
            .is_none_or(|at| now.saturating_sub(at) >= u128::from(self.config.reset_timeout_ms))
    }

    fn acquire(&self) -> Result<(), CircuitOpenError> {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();
        match state.status {
            CircuitStatus::Closed => Ok(()),
            CircuitStatus::Open => {
                if self.reset_window_elapsed(&state, now) {
                    state.status = CircuitStatus::HalfOpen;
                    state.half_open_attempts = 1;
                    info!("circuit breaker half-open, admitting probe");
                    Ok(())
                } else {
                    Err(CircuitOpenError)
                }
            }
            CircuitStatus::HalfOpen => {
                if state.half_open_attempts < self.config.half_open_max_attempts {
                    state.half_open_attempts += 1;
                    Ok(())
                } else {
                    state.status = CircuitStatus::Open;
                    state.last_failure_ms = Some(now);
                    state.half_open_attempts = 0;
                    warn!(
                        attempts = self.config.half_open_max_attempts,
                        "circuit breaker reopened: half-open probe budget spent"
                    );
                    Err(CircuitOpenError)
                }
            }
        }
    }

    fn on_success(&self) {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();
        state.last_success_ms = Some(now);
        state.failure_count = 0;
        if state.status != CircuitStatus::Closed {
            state.status = CircuitStatus::Closed;
            state.half_open_attempts = 0;
            info!("circuit breaker closed after successful probe");
        }
    }

    fn on_failure(&self) {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();
        state.failure_count = state.failure_count.saturating_add(1);
        state.last_failure_ms = Some(now);
        match state.status {
            CircuitStatus::Closed if state.failure_count >= self.config.failure_threshold => {
                state.status = CircuitStatus::Open;
                warn!(
                    failures = state.failure_count,
                    threshold = self.config.failure_threshold,
                    "circuit breaker opened"
                );
            }
            CircuitStatus::HalfOpen => {
                state.status = CircuitStatus::Open;
                state.half_open_attempts = 0;
                warn!("circuit breaker probe failed, reopening");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;

    use super::*;
    use crate::util::clock::ManualClock;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Op(&'static str),
        Open,
    }

    impl From<CircuitOpenError> for TestError {
        fn from(_: CircuitOpenError) -> Self {
            Self::Open
        }
    }

    fn breaker(threshold: u32, reset_ms: u64) -> (CircuitBreaker, ManualClock) {
        let clock = ManualClock::default();
        let cfg = CircuitBreakerConfig {
            failure_threshold: threshold,
            reset_timeout_ms: reset_ms,
            half_open_max_attempts: 1,
        };
        (CircuitBreaker::with_clock(cfg, Arc::new(clock.clone())), clock)
    }

    fn fail(b: &CircuitBreaker) -> Result<(), TestError> {
        b.execute(|| Err(TestError::Op("boom")))
    }

    #[test]
    fn opens_after_threshold_and_skips_operation() {
        let (b, _clock) = breaker(5, 1_000);
        for _ in 0..5 {
            assert_eq!(fail(&b), Err(TestError::Op("boom")));
        }
        assert_eq!(b.state().status, CircuitStatus::Open);

        let invoked = Cell::new(false);
        let result: Result<(), TestError> = b.execute(|| {
            invoked.set(true);
            Ok(())
        });
        assert_eq!(result, Err(TestError::Open));
        assert!(!invoked.get());
    }

    #[test]
    fn success_in_closed_state_clears_failures() {
        let (b, _clock) = breaker(3, 1_000);
        let _ = fail(&b);
        let _ = fail(&b);
        let ok: Result<u8, TestError> = b.execute(|| Ok(1));
        assert_eq!(ok, Ok(1));
        assert_eq!(b.state().failure_count, 0);
        let _ = fail(&b);
        assert_eq!(b.state().status, CircuitStatus::Closed);
    }

    #[test]
    fn probe_success_closes_circuit() {
        let (b, clock) = breaker(2, 500);
        let _ = fail(&b);
        let _ = fail(&b);
        clock.advance(499);
        assert_eq!(b.execute(|| Ok::<_, TestError>(())), Err(TestError::Open));
        clock.advance(1);
        assert_eq!(b.state().status, CircuitStatus::HalfOpen);

        assert_eq!(b.execute(|| Ok::<_, TestError>(())), Ok(()));
        let state = b.state();
        assert_eq!(state.status, CircuitStatus::Closed);
        assert_eq!(state.failure_count, 0);
        assert!(state.last_success_ms.is_some());
    }

    #[test]
    fn probe_failure_reopens_circuit() {
        let (b, clock) = breaker(1, 100);
        let _ = fail(&b);
        clock.advance(100);
        assert_eq!(fail(&b), Err(TestError::Op("boom")));
        assert_eq!(b.state().status, CircuitStatus::Open);
        assert_eq!(b.execute(|| Ok::<_, TestError>(())), Err(TestError::Open));
    }

    #[test]
    fn only_one_probe_is_admitted_while_half_open() {
        let (b, clock) = breaker(1, 100);
        let _ = fail(&b);
        clock.advance(150);
        let nested_invoked = Cell::new(false);
        let outer: Result<(), TestError> = b.execute(|| {
            let nested: Result<(), TestError> = b.execute(|| {
                nested_invoked.set(true);
                Ok(())
            });
            assert_eq!(nested, Err(TestError::Open));
            Ok(())
        });
        assert_eq!(outer, Ok(()));
        assert!(!nested_invoked.get());
    }

    #[test]
    fn reset_closes_and_clears() {
        let (b, _clock) = breaker(1, 10_000);
        let _ = fail(&b);
        assert_eq!(b.state().status, CircuitStatus::Open);
        b.reset();
        let state = b.state();
        assert_eq!(state.status, CircuitStatus::Closed);
        assert_eq!(state.failure_count, 0);
    }
}
