//! Priority-tiered resource pool manager.
//!
//! The manager owns one [`ResourcePoolTier`] per [`Priority`]. Each tier sits
//! behind its own mutex and every find/mark/recompute sequence on a tier runs
//! under that single lock, so a busy unit can never be handed out twice.
//! Locks are always taken in the order tier (ascending priority), cache,
//! health; health and listener work happens after tier locks are released.
//!
//! Allocation path:
//! 1. Cache lookup by [`AllocationRequest::cache_key`]. The cache holds idle
//!    units under the key of the request they last served: release evicts a
//!    unit's old entries and files it under its lease key. A hit is served
//!    only if the unit is still in its tier, available, not stale and fits the
//!    request; the entry is then taken out until the next release. This path
//!    skips the circuit breaker.
//! 2. Otherwise the body runs through the [`CircuitBreaker`]: system headroom
//!    check, matching unit lookup, growth by one unit when the tier has room,
//!    [`PoolError::ResourceExhausted`] when it does not.
//!
//! A periodic cleanup sweep removes stale units; [`ResourcePoolManager::dispose`]
//! (also run on drop) stops every timer and detaches every listener.

pub mod tier;

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::{CircuitBreakerConfig, PoolManagerConfig};
use crate::core::cache::{CacheStats, CachedResource, PoolCache};
use crate::core::circuit_breaker::{CircuitBreaker, CircuitBreakerState};
use crate::core::detector::ResourceDetector;
use crate::core::error::PoolError;
use crate::core::events::{ListenerId, Listeners};
use crate::core::request::{AllocationRequest, ResourceRequirements};
use crate::core::resources::{
    HealthStatus, PoolState, ResourceAvailability, SystemResources,
};
use crate::runtime::{PeriodicTask, Spawn, TokioSpawner};
use crate::util::clock::{system_clock, SharedClock};
use crate::util::serde::{Priority, ResourceId, ResourceType};

pub use tier::{PooledResource, ResourceMetrics, ResourcePoolTier, TierSnapshot};

/// Inputs and result of the last health evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PoolMetrics {
    /// Max of memory, cpu and pool-busy utilization (0..=1).
    pub utilization: f64,
    /// Host memory utilization (0..=1).
    pub memory_utilization: f64,
    /// Host cpu utilization (0..=1).
    pub cpu_utilization: f64,
    /// Busy share of non-stale units across tiers (0..=1).
    pub pool_utilization: f64,
    /// Units across tiers.
    pub total_resources: usize,
    /// Allocated units across tiers.
    pub busy_resources: usize,
    /// Detector status at evaluation time.
    pub system_status: HealthStatus,
    /// Evaluation time (ms since epoch).
    pub timestamp_ms: u128,
}

/// Edge-triggered health transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    /// Previous state.
    pub from: PoolState,
    /// New state.
    pub to: PoolState,
    /// Metrics that triggered the transition.
    pub metrics: PoolMetrics,
}

/// Read-only view returned by [`ResourcePoolManager::monitor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonitorSnapshot {
    /// Current health.
    pub health: PoolState,
    /// Utilization from the last health evaluation.
    pub utilization: f64,
    /// Units that are not stale.
    pub resource_count: usize,
    /// Time of the last health evaluation (ms since epoch).
    pub last_updated_ms: u128,
}

/// Outcome of one cleanup sweep.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CleanupReport {
    /// Units removed.
    pub removed: usize,
    /// Units left across tiers.
    pub remaining: usize,
}

/// Outcome of one [`ResourcePoolManager::optimize`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OptimizationReport {
    /// Units added.
    pub grown: usize,
    /// Units removed.
    pub shrunk: usize,
}

#[derive(Debug, Default)]
struct HealthState {
    state: PoolState,
    metrics: PoolMetrics,
}

/// Owner of the priority tiers, cache, breaker and cleanup timer.
pub struct ResourcePoolManager {
    id: Uuid,
    config: PoolManagerConfig,
    detector: Arc<ResourceDetector>,
    tiers: [Mutex<ResourcePoolTier>; 4],
    cache: Mutex<PoolCache>,
    breaker: Option<CircuitBreaker>,
    health: Mutex<HealthState>,
    state_listeners: Listeners<StateChange>,
    /// Held while evaluating and emitting health so transitions are delivered
    /// in detection order. Re-entrant so listeners may call back in.
    emit_lock: ReentrantMutex<()>,
    cleanup_timer: Mutex<Option<PeriodicTask>>,
    detector_subscription: Mutex<Option<ListenerId>>,
    /// Set when this manager's `start` started the detector's sampling.
    owns_sampling: AtomicBool,
    disposed: AtomicBool,
    clock: SharedClock,
}

impl std::fmt::Debug for ResourcePoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePoolManager")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl ResourcePoolManager {
    /// Create a manager on the system clock.
    pub fn new(
        config: PoolManagerConfig,
        breaker_config: CircuitBreakerConfig,
        detector: Arc<ResourceDetector>,
    ) -> Result<Arc<Self>, PoolError> {
        Self::with_clock(config, breaker_config, detector, system_clock())
    }

    /// Create a manager whose staleness, breaker and metrics use `clock`.
    ///
    /// The manager subscribes to detector updates to keep its health current.
    pub fn with_clock(
        config: PoolManagerConfig,
        breaker_config: CircuitBreakerConfig,
        detector: Arc<ResourceDetector>,
        clock: SharedClock,
    ) -> Result<Arc<Self>, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;
        let breaker = if config.enable_circuit_breaker {
            breaker_config.validate().map_err(PoolError::InvalidConfig)?;
            Some(CircuitBreaker::with_clock(breaker_config, Arc::clone(&clock)))
        } else {
            None
        };

        let max = config.max_pool_size;
        let manager = Arc::new(Self {
            id: Uuid::new_v4(),
            tiers: Priority::ALL.map(|p| Mutex::new(ResourcePoolTier::new(p, max))),
            cache: Mutex::new(PoolCache::new(config.cache_max_size)),
            breaker,
            health: Mutex::new(HealthState::default()),
            state_listeners: Listeners::new(),
            emit_lock: ReentrantMutex::new(()),
            cleanup_timer: Mutex::new(None),
            detector_subscription: Mutex::new(None),
            owns_sampling: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            config,
            detector,
            clock,
        });

        let weak: Weak<Self> = Arc::downgrade(&manager);
        let subscription = manager.detector.on_update(move |resources| {
            if let Some(manager) = weak.upgrade() {
                manager.on_detector_update(resources);
            }
        });
        *manager.detector_subscription.lock() = Some(subscription);

        info!(
            pool_id = %manager.id,
            max_per_tier = manager.config.max_pool_size,
            breaker = manager.breaker.is_some(),
            "resource pool manager created"
        );
        Ok(manager)
    }

    /// Manager identity stamped on every unit it creates.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Configuration in use.
    pub const fn config(&self) -> &PoolManagerConfig {
        &self.config
    }

    /// Detector feeding health and headroom checks.
    pub const fn detector(&self) -> &Arc<ResourceDetector> {
        &self.detector
    }

    /// Register a state-change callback.
    pub fn on_state_change<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.state_listeners.subscribe(callback)
    }

    /// State-change listeners, for channel subscriptions or removal.
    pub const fn state_listeners(&self) -> &Listeners<StateChange> {
        &self.state_listeners
    }

    /// Start the cleanup timer and detector sampling on the current tokio
    /// runtime. Calling it while running is a no-op.
    ///
    /// A detector that is already sampling, for example one shared with
    /// another manager, is left under its starter's control.
    pub fn start(self: &Arc<Self>) -> Result<(), PoolError> {
        let spawner = TokioSpawner::try_current().map_err(|e| PoolError::Runtime(e.to_string()))?;
        self.start_with(&spawner)
    }

    /// Like [`ResourcePoolManager::start`] on an explicit spawner.
    pub fn start_with<S: Spawn>(self: &Arc<Self>, spawner: &S) -> Result<(), PoolError> {
        self.ensure_live()?;
        if self.detector.start_with(spawner) {
            self.owns_sampling.store(true, Ordering::Release);
        }

        let mut timer = self.cleanup_timer.lock();
        if timer.is_some() {
            return Ok(());
        }
        let weak = Arc::downgrade(self);
        *timer = Some(PeriodicTask::spawn(
            spawner,
            "pool-cleanup",
            self.config.cleanup_interval(),
            move || match weak.upgrade() {
                Some(manager) if !manager.is_disposed() => {
                    manager.cleanup();
                    ControlFlow::Continue(())
                }
                _ => ControlFlow::Break(()),
            },
        ));
        info!(
            pool_id = %self.id,
            interval_ms = self.config.cleanup_interval_ms,
            "pool cleanup started"
        );
        Ok(())
    }

    /// Whether the cleanup timer is active.
    pub fn is_running(&self) -> bool {
        self.cleanup_timer.lock().is_some()
    }

    /// Whether [`ResourcePoolManager::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Allocate a unit for `request`.
    ///
    /// # Errors
    /// - [`PoolError::ResourceExhausted`] when the host lacks headroom or the
    ///   tier is full with no fitting unit free.
    /// - [`PoolError::CircuitOpen`] while the breaker rejects calls.
    /// - [`PoolError::Disposed`] after disposal.
    #[instrument(skip(self, request), fields(request_id = %request.id, priority = %request.priority))]
    pub fn allocate(&self, request: &AllocationRequest) -> Result<PooledResource, PoolError> {
        self.ensure_live()?;
        let key = request.cache_key();

        if let Some(unit) = self.allocate_cached(&key, request) {
            debug!(resource_id = %unit.id, "allocation served from cache");
            self.refresh_health();
            return Ok(unit);
        }

        let unit = match &self.breaker {
            Some(breaker) => breaker.execute(|| self.allocate_uncached(request, &key))?,
            None => self.allocate_uncached(request, &key)?,
        };

        debug!(resource_id = %unit.id, resource_type = %unit.resource_type, "resource allocated");
        self.refresh_health();
        Ok(unit)
    }

    /// Return a unit to its tier.
    ///
    /// # Errors
    /// - [`PoolError::InvalidPool`] when the unit was not created by this manager.
    /// - [`PoolError::ResourceStale`] when the unit was already reclaimed or
    ///   has gone stale; stale units are left for the cleanup sweep.
    /// - [`PoolError::Disposed`] after disposal.
    #[instrument(skip(self, resource), fields(resource_id = %resource.id, priority = %resource.priority))]
    pub fn release(&self, resource: &PooledResource) -> Result<(), PoolError> {
        self.ensure_live()?;
        if resource.pool_id != self.id {
            return Err(PoolError::InvalidPool(format!(
                "resource {} belongs to pool {}, not {}",
                resource.id, resource.pool_id, self.id
            )));
        }

        let now = self.clock.now_ms();
        let timeout = self.config.resource_timeout_ms;
        let lease_key = {
            let mut tier = self.tier(resource.priority).lock();
            let Some(index) = tier.position(resource.id) else {
                return Err(PoolError::ResourceStale(format!(
                    "resource {} is no longer in the {} tier",
                    resource.id, resource.priority
                )));
            };
            let held = tier
                .get(index)
                .map(|unit| (unit.is_available, unit.is_stale(now, timeout)));
            match held {
                Some((_, true)) => {
                    return Err(PoolError::ResourceStale(format!(
                        "resource {} timed out before release",
                        resource.id
                    )));
                }
                Some((true, false)) => {
                    warn!("release of an idle resource ignored");
                    return Ok(());
                }
                _ => {}
            }
            let lease_key = tier.mark_available(index, now);
            tier.recompute_utilization(now, timeout);
            lease_key
        };

        {
            let mut cache = self.cache.lock();
            cache.remove_resource(resource.id);
            if let Some(key) = lease_key {
                cache.put(
                    key,
                    CachedResource {
                        id: resource.id,
                        priority: resource.priority,
                    },
                );
            }
        }
        debug!("resource released");
        self.refresh_health();
        Ok(())
    }

    /// Resize tiers from `metrics`: grow one unit per populated tier under high
    /// utilization, shrink up to 10% of idle units per tier (rounded down)
    /// under low.
    pub fn optimize(&self, metrics: &PoolMetrics) -> OptimizationReport {
        let mut report = OptimizationReport::default();
        if self.is_disposed() {
            return report;
        }
        let mut total = self.total_resources();

        if metrics.utilization > self.config.grow_utilization && total < self.config.global_max() {
            let resources = self.current_resources();
            let now = self.clock.now_ms();
            for slot in &self.tiers {
                if total >= self.config.global_max() {
                    break;
                }
                let mut tier = slot.lock();
                if !tier.has_capacity() {
                    continue;
                }
                let Some(kind) = tier.resources().last().map(|r| r.resource_type.clone()) else {
                    continue;
                };
                let sizing = self.unit_metrics(&resources, None);
                let priority = tier.priority();
                tier.push(PooledResource::new(self.id, kind, priority, sizing, now));
                tier.recompute_utilization(now, self.config.resource_timeout_ms);
                total += 1;
                report.grown += 1;
            }
        } else if metrics.utilization < self.config.shrink_utilization
            && total > self.config.min_pool_size
        {
            let now = self.clock.now_ms();
            let mut removed: Vec<ResourceId> = Vec::new();
            for slot in &self.tiers {
                let mut tier = slot.lock();
                let idle = tier.len() - tier.busy_count();
                let budget = (idle / 10).min(total - self.config.min_pool_size);
                if budget == 0 {
                    continue;
                }
                let victims = tier.shrink(budget);
                tier.recompute_utilization(now, self.config.resource_timeout_ms);
                total -= victims.len();
                removed.extend(victims);
                if total <= self.config.min_pool_size {
                    break;
                }
            }
            report.shrunk = removed.len();
            self.evict_all(&removed);
        }

        if report.grown > 0 || report.shrunk > 0 {
            info!(
                grown = report.grown,
                shrunk = report.shrunk,
                utilization = metrics.utilization,
                "pool optimized"
            );
            self.refresh_health();
        }
        report
    }

    /// Remove every stale unit once and log a single summary.
    pub fn cleanup(&self) -> CleanupReport {
        let now = self.clock.now_ms();
        let timeout = self.config.resource_timeout_ms;
        let mut removed: Vec<ResourceId> = Vec::new();
        let mut remaining = 0;
        for slot in &self.tiers {
            let mut tier = slot.lock();
            removed.extend(tier.remove_stale(now, timeout));
            tier.recompute_utilization(now, timeout);
            remaining += tier.len();
        }
        self.evict_all(&removed);

        if removed.is_empty() {
            debug!(remaining, "cleanup found no stale resources");
        } else {
            info!(removed = removed.len(), remaining, "stale resources reclaimed");
            self.refresh_health();
        }
        CleanupReport {
            removed: removed.len(),
            remaining,
        }
    }

    /// Health, utilization, non-stale unit count and last evaluation time.
    pub fn monitor(&self) -> MonitorSnapshot {
        let now = self.clock.now_ms();
        let resource_count = self
            .tiers
            .iter()
            .map(|slot| slot.lock().valid_count(now, self.config.resource_timeout_ms))
            .sum();
        let health = self.health.lock();
        MonitorSnapshot {
            health: health.state,
            utilization: health.metrics.utilization,
            resource_count,
            last_updated_ms: health.metrics.timestamp_ms,
        }
    }

    /// Current health.
    pub fn state(&self) -> PoolState {
        self.health.lock().state
    }

    /// Metrics from the last health evaluation.
    pub fn metrics(&self) -> PoolMetrics {
        self.health.lock().metrics.clone()
    }

    /// View of the tier for `priority`.
    pub fn tier_snapshot(&self, priority: Priority) -> TierSnapshot {
        self.tier(priority).lock().snapshot()
    }

    /// Units across tiers.
    pub fn total_resources(&self) -> usize {
        self.tiers.iter().map(|slot| slot.lock().len()).sum()
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Breaker bookkeeping, or `None` when the breaker is disabled.
    pub fn breaker_state(&self) -> Option<CircuitBreakerState> {
        self.breaker.as_ref().map(CircuitBreaker::state)
    }

    /// Stop timers, clear the cache and tiers, reset metrics and detach all
    /// listeners. Safe to call repeatedly.
    ///
    /// Detector sampling is stopped only if this manager started it.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(task) = self.cleanup_timer.lock().take() {
            task.stop();
        }
        if self.owns_sampling.swap(false, Ordering::AcqRel) {
            self.detector.stop();
        }
        if let Some(id) = self.detector_subscription.lock().take() {
            self.detector.update_listeners().unsubscribe(id);
        }
        for slot in &self.tiers {
            slot.lock().clear();
        }
        self.cache.lock().clear();
        *self.health.lock() = HealthState::default();
        self.state_listeners.clear();
        info!(pool_id = %self.id, "resource pool manager disposed");
    }

    fn ensure_live(&self) -> Result<(), PoolError> {
        if self.is_disposed() {
            Err(PoolError::Disposed)
        } else {
            Ok(())
        }
    }

    fn tier(&self, priority: Priority) -> &Mutex<ResourcePoolTier> {
        &self.tiers[priority as usize]
    }

    fn current_resources(&self) -> Arc<SystemResources> {
        self.detector.get_current_resources()
    }

    fn allocate_cached(&self, key: &str, request: &AllocationRequest) -> Option<PooledResource> {
        let cached = self
            .cache
            .lock()
            .get(key)
            .filter(|cached| cached.priority == request.priority);
        let Some(cached) = cached else {
            self.cache.lock().record_miss();
            return None;
        };

        let now = self.clock.now_ms();
        let timeout = self.config.resource_timeout_ms;
        let unit = {
            let mut tier = self.tier(cached.priority).lock();
            let index = tier.position(cached.id).filter(|&i| {
                tier.get(i).is_some_and(|unit| {
                    unit.is_available && !unit.is_stale(now, timeout) && unit.satisfies(request)
                })
            });
            index.and_then(|i| {
                let unit = tier.mark_busy(i, request, key.to_owned(), now, true);
                tier.recompute_utilization(now, timeout);
                unit
            })
        };

        let mut cache = self.cache.lock();
        cache.remove_if(key, cached.id);
        if unit.is_some() {
            cache.record_hit();
        } else {
            cache.record_miss();
        }
        unit
    }

    fn allocate_uncached(
        &self,
        request: &AllocationRequest,
        key: &str,
    ) -> Result<PooledResource, PoolError> {
        let resources = self.current_resources();
        let availability = self.detector.availability_of(&resources);
        check_headroom(&availability, &request.requirements)?;

        let now = self.clock.now_ms();
        let timeout = self.config.resource_timeout_ms;
        let mut tier = self.tier(request.priority).lock();
        let index = match tier.find_available(request, now, timeout) {
            Some(index) => index,
            None if tier.has_capacity() => {
                let metrics = self.unit_metrics(&resources, Some(request));
                let unit = PooledResource::new(
                    self.id,
                    request.resource_type.clone(),
                    request.priority,
                    metrics,
                    now,
                );
                debug!(resource_id = %unit.id, size = tier.len() + 1, "tier grown");
                tier.push(unit)
            }
            None => {
                return Err(PoolError::ResourceExhausted(format!(
                    "{} tier is at its maximum of {} units with none free",
                    request.priority,
                    tier.max_size()
                )));
            }
        };
        let unit = tier.mark_busy(index, request, key.to_owned(), now, false).ok_or_else(|| {
            PoolError::ResourceExhausted(format!("{} tier lost unit {index}", request.priority))
        })?;
        tier.recompute_utilization(now, timeout);
        Ok(unit)
    }

    /// Slice of host capacity for a new unit, capped by request constraints.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn unit_metrics(
        &self,
        resources: &SystemResources,
        request: Option<&AllocationRequest>,
    ) -> ResourceMetrics {
        let slots = self.config.max_pool_size.max(1) as u64;
        let mut memory_bytes = resources.memory.available_bytes / slots;
        let mut cpu_percent = 100.0 / slots as f64;
        if let Some(constraints) = request.and_then(|r| r.constraints) {
            if let Some(max) = constraints.max_memory_bytes {
                memory_bytes = memory_bytes.min(max);
            }
            if let Some(max) = constraints.max_cpu_percent {
                cpu_percent = cpu_percent.min(max);
            }
        }
        ResourceMetrics {
            memory_bytes,
            cpu_percent,
            ..ResourceMetrics::default()
        }
    }

    fn evict_all(&self, ids: &[ResourceId]) {
        if ids.is_empty() {
            return;
        }
        let mut cache = self.cache.lock();
        for id in ids {
            cache.remove_resource(*id);
        }
    }

    fn on_detector_update(&self, resources: &SystemResources) {
        if !self.is_disposed() {
            self.evaluate_health(resources);
        }
    }

    fn refresh_health(&self) {
        match self.detector.last_snapshot() {
            Some(resources) => self.evaluate_health(&resources),
            None => self.evaluate_health(&SystemResources::default()),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn evaluate_health(&self, resources: &SystemResources) {
        let _ordered = self.emit_lock.lock();
        let now = self.clock.now_ms();
        let timeout = self.config.resource_timeout_ms;

        let (mut total, mut busy, mut valid, mut valid_busy) = (0, 0, 0, 0);
        for slot in &self.tiers {
            let tier = slot.lock();
            total += tier.len();
            busy += tier.busy_count();
            for unit in tier.resources() {
                if !unit.is_stale(now, timeout) {
                    valid += 1;
                    valid_busy += usize::from(!unit.is_available);
                }
            }
        }
        let pool_utilization = if valid == 0 {
            0.0
        } else {
            valid_busy as f64 / valid as f64
        };
        let memory_utilization = resources.memory.utilization_percent() / 100.0;
        let cpu_utilization = resources.cpu.utilization_percent / 100.0;
        let system_status = self.detector.availability_of(resources).status;

        let metrics = PoolMetrics {
            utilization: memory_utilization.max(cpu_utilization).max(pool_utilization),
            memory_utilization,
            cpu_utilization,
            pool_utilization,
            total_resources: total,
            busy_resources: busy,
            system_status,
            timestamp_ms: now,
        };
        let next = self.classify(&metrics);

        let change = {
            let mut health = self.health.lock();
            let from = health.state;
            health.state = next;
            health.metrics = metrics.clone();
            (from != next).then_some(StateChange {
                from,
                to: next,
                metrics,
            })
        };
        if let Some(change) = change {
            info!(
                from = %change.from,
                to = %change.to,
                utilization = change.metrics.utilization,
                system = %change.metrics.system_status,
                "pool state changed"
            );
            self.state_listeners.emit(&change);
        }
    }

    /// Detector warning or critical wins; otherwise internal thresholds apply.
    fn classify(&self, metrics: &PoolMetrics) -> PoolState {
        match metrics.system_status {
            HealthStatus::Critical => HealthStatus::Critical,
            HealthStatus::Warning => HealthStatus::Warning,
            HealthStatus::Healthy if metrics.utilization >= self.config.critical_threshold => {
                HealthStatus::Critical
            }
            HealthStatus::Healthy if metrics.utilization >= self.config.warning_threshold => {
                HealthStatus::Warning
            }
            HealthStatus::Healthy => HealthStatus::Healthy,
        }
    }
}

impl Drop for ResourcePoolManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_headroom(
    availability: &ResourceAvailability,
    requirements: &ResourceRequirements,
) -> Result<(), PoolError> {
    let memory = &availability.memory;
    if !memory.is_available || memory.remaining < requirements.memory_bytes as f64 {
        return Err(PoolError::ResourceExhausted(format!(
            "memory: need {} bytes, {:.0} available ({})",
            requirements.memory_bytes, memory.remaining, memory.status
        )));
    }
    let cpu = &availability.cpu;
    if !cpu.is_available || cpu.remaining < requirements.cpu_percent {
        return Err(PoolError::ResourceExhausted(format!(
            "cpu: need {:.1}%, {:.1}% available ({})",
            requirements.cpu_percent, cpu.remaining, cpu.status
        )));
    }
    if !availability.disk.is_available {
        return Err(PoolError::ResourceExhausted(format!(
            "disk: {} at {:.1}%",
            availability.disk.status, availability.disk.utilization_percent
        )));
    }
    Ok(())
}

/// Build a request for `resource_type` at `priority` with a generated id.
pub fn request_for(resource_type: impl Into<ResourceType>, priority: Priority) -> AllocationRequest {
    AllocationRequest::new(Uuid::new_v4().to_string(), resource_type, priority)
}
