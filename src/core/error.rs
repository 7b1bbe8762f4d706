//! Error types for detector and pool operations.

use thiserror::Error;

use crate::core::circuit_breaker::CircuitOpenError;
use crate::core::resources::ResourceDimension;

/// Errors returned synchronously by pool manager operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Not enough system or pool headroom. Retry with backoff.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    /// The resource does not belong to this pool.
    #[error("invalid pool: {0}")]
    InvalidPool(String),
    /// The request named an unknown priority.
    #[error("invalid priority: {0}")]
    InvalidPriority(String),
    /// The release target was already reclaimed or timed out.
    #[error("resource stale: {0}")]
    ResourceStale(String),
    /// The circuit breaker is rejecting calls.
    #[error("Circuit breaker is open")]
    CircuitOpen,
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No async runtime is available to host timers.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
    /// The manager has been disposed.
    #[error("pool disposed")]
    Disposed,
}

impl PoolError {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ResourceExhausted(_) => "RESOURCE_EXHAUSTED",
            Self::InvalidPool(_) => "INVALID_POOL",
            Self::InvalidPriority(_) => "INVALID_PRIORITY",
            Self::ResourceStale(_) => "RESOURCE_STALE",
            Self::CircuitOpen => "CIRCUIT_OPEN",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Runtime(_) => "RUNTIME_UNAVAILABLE",
            Self::Disposed => "POOL_DISPOSED",
        }
    }

    /// Whether a caller may retry after backing off.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_) | Self::CircuitOpen)
    }
}

impl From<CircuitOpenError> for PoolError {
    fn from(_: CircuitOpenError) -> Self {
        Self::CircuitOpen
    }
}

/// Errors raised while sampling host resources.
///
/// These never reach callers of the detector's query surface; the detector
/// logs them and keeps its last good snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// A probe failed to read its dimension.
    #[error("sampling {dimension} failed: {reason}")]
    Sampling {
        /// Dimension whose probe failed.
        dimension: ResourceDimension,
        /// Probe-specific failure description.
        reason: String,
    },
    /// No async runtime is available to host the sampling timer.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
