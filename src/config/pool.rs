//! Pool manager and circuit breaker configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pool sizing, cleanup and health thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolManagerConfig {
    /// Floor on the total unit count that shrinking will not cross.
    pub min_pool_size: usize,
    /// Maximum units per priority tier.
    pub max_pool_size: usize,
    /// Interval between cleanup sweeps in milliseconds.
    pub cleanup_interval_ms: u64,
    /// Idle time after which a unit is stale, in milliseconds.
    pub resource_timeout_ms: u64,
    /// Capacity of the allocation cache.
    pub cache_max_size: usize,
    /// Route allocations through the circuit breaker.
    pub enable_circuit_breaker: bool,
    /// Utilization (0-1) at which the pool is in warning.
    pub warning_threshold: f64,
    /// Utilization (0-1) at which the pool is critical.
    pub critical_threshold: f64,
    /// Utilization (0-1) above which `optimize` grows tiers.
    pub grow_utilization: f64,
    /// Utilization (0-1) below which `optimize` shrinks tiers.
    pub shrink_utilization: f64,
}

impl Default for PoolManagerConfig {
    fn default() -> Self {
        Self {
            min_pool_size: 1,
            max_pool_size: 10,
            cleanup_interval_ms: 30_000,
            resource_timeout_ms: 300_000,
            cache_max_size: 100,
            enable_circuit_breaker: true,
            warning_threshold: 0.7,
            critical_threshold: 0.9,
            grow_utilization: 0.8,
            shrink_utilization: 0.3,
        }
    }
}

impl PoolManagerConfig {
    /// Upper bound on units across all tiers.
    pub const fn global_max(&self) -> usize {
        self.max_pool_size * crate::util::Priority::ALL.len()
    }

    /// Cleanup interval as a [`Duration`].
    pub const fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Validate pool configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pool_size == 0 {
            return Err("max_pool_size must be greater than 0".into());
        }
        if self.min_pool_size > self.global_max() {
            return Err("min_pool_size must not exceed the total tier capacity".into());
        }
        if self.cleanup_interval_ms == 0 {
            return Err("cleanup_interval_ms must be greater than 0".into());
        }
        if self.resource_timeout_ms == 0 {
            return Err("resource_timeout_ms must be greater than 0".into());
        }
        if self.cache_max_size == 0 {
            return Err("cache_max_size must be greater than 0".into());
        }
        for (name, value) in [
            ("warning_threshold", self.warning_threshold),
            ("critical_threshold", self.critical_threshold),
            ("grow_utilization", self.grow_utilization),
            ("shrink_utilization", self.shrink_utilization),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within 0..=1"));
            }
        }
        if self.warning_threshold > self.critical_threshold {
            return Err("warning_threshold must not exceed critical_threshold".into());
        }
        if self.shrink_utilization >= self.grow_utilization {
            return Err("shrink_utilization must be below grow_utilization".into());
        }
        Ok(())
    }
}

/// Circuit breaker tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failures that open the circuit.
    pub failure_threshold: u32,
    /// Time after the last failure before a probe is allowed, in milliseconds.
    pub reset_timeout_ms: u64,
    /// Probes allowed while half-open before the circuit reopens.
    pub half_open_max_attempts: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_ms: 30_000,
            half_open_max_attempts: 1,
        }
    }
}

impl CircuitBreakerConfig {
    /// Validate breaker configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.failure_threshold == 0 {
            return Err("failure_threshold must be greater than 0".into());
        }
        if self.reset_timeout_ms == 0 {
            return Err("reset_timeout_ms must be greater than 0".into());
        }
        if self.half_open_max_attempts == 0 {
            return Err("half_open_max_attempts must be greater than 0".into());
        }
        Ok(())
    }
}
