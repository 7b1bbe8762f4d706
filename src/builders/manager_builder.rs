//! Assemble a detector and pool manager from [`ResourceCoreConfig`].

use std::sync::Arc;

use crate::config::ResourceCoreConfig;
use crate::core::{PoolError, ResourceDetector, ResourcePoolManager};

/// Build a host detector from configuration.
pub fn build_detector(cfg: &ResourceCoreConfig) -> Result<Arc<ResourceDetector>, PoolError> {
    cfg.detector.validate().map_err(|e| {
        PoolError::InvalidConfig(format!("detector invalid: {e}"))
    })?;
    Ok(Arc::new(ResourceDetector::new(cfg.detector.clone())))
}

/// Build a pool manager backed by a host detector.
///
/// Timers are not started; call [`ResourcePoolManager::start`] from within a
/// tokio runtime.
pub fn build_manager(cfg: &ResourceCoreConfig) -> Result<Arc<ResourcePoolManager>, PoolError> {
    cfg.validate().map_err(PoolError::InvalidConfig)?;
    build_manager_with_detector(cfg, build_detector(cfg)?)
}

/// Build a pool manager around a caller-supplied detector, for custom probes.
///
/// The detector may be shared; a manager only stops sampling it started.
pub fn build_manager_with_detector(
    cfg: &ResourceCoreConfig,
    detector: Arc<ResourceDetector>,
) -> Result<Arc<ResourcePoolManager>, PoolError> {
    ResourcePoolManager::new(cfg.pool.clone(), cfg.circuit_breaker.clone(), detector)
}
