//! Detection, pooling and failure-isolation components.

pub mod cache;
pub mod circuit_breaker;
pub mod detector;
pub mod error;
pub mod events;
pub mod pool_manager;
pub mod request;
pub mod resources;

pub use cache::{CacheStats, CachedResource, PoolCache};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerState, CircuitOpenError, CircuitStatus};
pub use detector::{ResourceDetector, ResourceProbe, SysinfoProbe};
pub use error::{AppResult, DetectorError, PoolError};
pub use events::{EventLog, ListenerId, Listeners};
pub use pool_manager::{
    request_for, CleanupReport, MonitorSnapshot, OptimizationReport, PoolMetrics, PooledResource,
    ResourceMetrics, ResourcePoolManager, ResourcePoolTier, StateChange, TierSnapshot,
};
pub use request::{AllocationRequest, RequestConstraints, ResourceRequirements};
pub use resources::{
    AlertSeverity, CpuResources, DimensionAvailability, DiskResources, HealthStatus, LoadAverage,
    MemoryResources, PoolState, ResourceAlert, ResourceAvailability, ResourceDimension,
    SystemResources,
};
