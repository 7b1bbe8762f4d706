//! Configuration models for the detector, pool manager and circuit breaker.

pub mod detector;
pub mod pool;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

pub use detector::{
    DetectorConfig, DimensionConstraint, ResourceConstraints, ResourceThresholds, ThresholdPair,
};
pub use pool::{CircuitBreakerConfig, PoolManagerConfig};

use crate::core::AppResult;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "RESOURCE_CORE_";

/// Root configuration supplied once at construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceCoreConfig {
    /// Detector settings.
    pub detector: DetectorConfig,
    /// Pool manager settings.
    pub pool: PoolManagerConfig,
    /// Circuit breaker settings.
    pub circuit_breaker: CircuitBreakerConfig,
}

impl ResourceCoreConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.detector
            .validate()
            .map_err(|e| format!("detector invalid: {e}"))?;
        self.pool.validate().map_err(|e| format!("pool invalid: {e}"))?;
        self.circuit_breaker
            .validate()
            .map_err(|e| format!("circuit_breaker invalid: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `RESOURCE_CORE_*` variables, reading `.env` first
    /// when present.
    pub fn from_env() -> AppResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("failed to load .env file");
            }
        }
        let mut cfg = Self::default();
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate().map_err(|e| anyhow!(e))?;
        Ok(cfg)
    }

    /// Apply overrides from `lookup`, which maps full variable names to values.
    ///
    /// Recognised suffixes: `SAMPLING_INTERVAL_MS`, `MEMORY_WARNING_PERCENT`,
    /// `MEMORY_CRITICAL_PERCENT`, `CPU_WARNING_PERCENT`, `CPU_CRITICAL_PERCENT`,
    /// `DISK_WARNING_PERCENT`, `DISK_CRITICAL_PERCENT`, `MIN_POOL_SIZE`,
    /// `MAX_POOL_SIZE`, `CLEANUP_INTERVAL_MS`, `RESOURCE_TIMEOUT_MS`,
    /// `CACHE_MAX_SIZE`, `ENABLE_CIRCUIT_BREAKER`, `WARNING_THRESHOLD`,
    /// `CRITICAL_THRESHOLD`, `BREAKER_FAILURE_THRESHOLD`,
    /// `BREAKER_RESET_TIMEOUT_MS`, `BREAKER_HALF_OPEN_MAX_ATTEMPTS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        override_value(&get, "SAMPLING_INTERVAL_MS", &mut self.detector.sampling_interval_ms)?;
        let thresholds = &mut self.detector.thresholds;
        override_value(&get, "MEMORY_WARNING_PERCENT", &mut thresholds.memory.warning_percent)?;
        override_value(&get, "MEMORY_CRITICAL_PERCENT", &mut thresholds.memory.critical_percent)?;
        override_value(&get, "CPU_WARNING_PERCENT", &mut thresholds.cpu.warning_percent)?;
        override_value(&get, "CPU_CRITICAL_PERCENT", &mut thresholds.cpu.critical_percent)?;
        override_value(&get, "DISK_WARNING_PERCENT", &mut thresholds.disk.warning_percent)?;
        override_value(&get, "DISK_CRITICAL_PERCENT", &mut thresholds.disk.critical_percent)?;

        let pool = &mut self.pool;
        override_value(&get, "MIN_POOL_SIZE", &mut pool.min_pool_size)?;
        override_value(&get, "MAX_POOL_SIZE", &mut pool.max_pool_size)?;
        override_value(&get, "CLEANUP_INTERVAL_MS", &mut pool.cleanup_interval_ms)?;
        override_value(&get, "RESOURCE_TIMEOUT_MS", &mut pool.resource_timeout_ms)?;
        override_value(&get, "CACHE_MAX_SIZE", &mut pool.cache_max_size)?;
        override_value(&get, "ENABLE_CIRCUIT_BREAKER", &mut pool.enable_circuit_breaker)?;
        override_value(&get, "WARNING_THRESHOLD", &mut pool.warning_threshold)?;
        override_value(&get, "CRITICAL_THRESHOLD", &mut pool.critical_threshold)?;

        let breaker = &mut self.circuit_breaker;
        override_value(&get, "BREAKER_FAILURE_THRESHOLD", &mut breaker.failure_threshold)?;
        override_value(&get, "BREAKER_RESET_TIMEOUT_MS", &mut breaker.reset_timeout_ms)?;
        override_value(
            &get,
            "BREAKER_HALF_OPEN_MAX_ATTEMPTS",
            &mut breaker.half_open_max_attempts,
        )?;
        Ok(())
    }
}

fn override_value<T, G>(get: &G, suffix: &str, slot: &mut T) -> AppResult<()>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(suffix) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{ENV_PREFIX}{suffix}={raw:?}: {e}"))?;
    }
    Ok(())
}
