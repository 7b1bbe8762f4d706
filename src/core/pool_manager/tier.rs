//! Priority tiers and the units they own.

use serde::Serialize;
use uuid::Uuid;

use crate::core::request::AllocationRequest;
use crate::util::serde::{Priority, ResourceId, ResourceType};

/// Capacity slice and usage counters of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResourceMetrics {
    /// Memory slice in bytes, fixed at creation.
    pub memory_bytes: u64,
    /// CPU slice in percentage points, fixed at creation.
    pub cpu_percent: f64,
    /// Allocations served from the cache.
    pub cache_hits: u64,
    /// Allocations served without the cache.
    pub cache_misses: u64,
    /// Current utilization (0..=1); reset to zero on release.
    pub utilization: f64,
}

/// An allocatable unit owned by exactly one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PooledResource {
    /// Unit identity.
    pub id: ResourceId,
    /// Manager that created the unit.
    pub pool_id: Uuid,
    /// Kind of work the unit serves.
    pub resource_type: ResourceType,
    /// Owning tier.
    pub priority: Priority,
    /// False while allocated.
    pub is_available: bool,
    /// Last allocation or release (ms since epoch).
    pub last_used_ms: u128,
    /// Start of the current allocation, if busy.
    pub allocated_at_ms: Option<u128>,
    /// Per-allocation timeout requested by the current holder.
    pub timeout_ms: Option<u64>,
    /// Capacity slice and counters.
    pub metrics: ResourceMetrics,
    /// Cache key of the request holding the unit.
    #[serde(skip)]
    lease_key: Option<String>,
}

impl PooledResource {
    pub(crate) fn new(
        pool_id: Uuid,
        resource_type: ResourceType,
        priority: Priority,
        metrics: ResourceMetrics,
        now_ms: u128,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pool_id,
            resource_type,
            priority,
            is_available: true,
            last_used_ms: now_ms,
            allocated_at_ms: None,
            timeout_ms: None,
            metrics,
            lease_key: None,
        }
    }

    /// Unused past the pool timeout, or busy past its own allocation timeout.
    pub fn is_stale(&self, now_ms: u128, resource_timeout_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_used_ms) > u128::from(resource_timeout_ms) {
            return true;
        }
        match (self.is_available, self.allocated_at_ms, self.timeout_ms) {
            (false, Some(at), Some(own)) => now_ms.saturating_sub(at) > u128::from(own),
            _ => false,
        }
    }

    /// Whether this unit's type and slice fit `request`.
    pub fn satisfies(&self, request: &AllocationRequest) -> bool {
        if self.resource_type != request.resource_type {
            return false;
        }
        request.constraints.is_none_or(|c| {
            c.max_memory_bytes
                .is_none_or(|max| self.metrics.memory_bytes <= max)
                && c.max_cpu_percent
                    .is_none_or(|max| self.metrics.cpu_percent <= max)
        })
    }
}

/// Point-in-time view of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierSnapshot {
    /// Tier priority.
    pub priority: Priority,
    /// Units in the tier, stale ones included.
    pub size: usize,
    /// Allocated units.
    pub busy: usize,
    /// Maximum units.
    pub max_size: usize,
    /// Busy share of non-stale units.
    pub utilization: f64,
}

/// Units of one priority level.
#[derive(Debug)]
pub struct ResourcePoolTier {
    priority: Priority,
    resources: Vec<PooledResource>,
    max_size: usize,
    utilization: f64,
}

impl ResourcePoolTier {
    /// Empty tier.
    pub const fn new(priority: Priority, max_size: usize) -> Self {
        Self {
            priority,
            resources: Vec::new(),
            max_size,
            utilization: 0.0,
        }
    }

    /// Tier priority.
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Maximum units.
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Units held, stale ones included.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the tier has no units.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Whether another unit fits.
    pub fn has_capacity(&self) -> bool {
        self.resources.len() < self.max_size
    }

    /// Allocated units.
    pub fn busy_count(&self) -> usize {
        self.resources.iter().filter(|r| !r.is_available).count()
    }

    /// Units that are not stale.
    pub fn valid_count(&self, now_ms: u128, resource_timeout_ms: u64) -> usize {
        self.resources
            .iter()
            .filter(|r| !r.is_stale(now_ms, resource_timeout_ms))
            .count()
    }

    /// Last computed busy share.
    pub const fn utilization(&self) -> f64 {
        self.utilization
    }

    /// Units in insertion order.
    pub fn resources(&self) -> &[PooledResource] {
        &self.resources
    }

    /// Recompute `busy / valid`, counting only non-stale units.
    #[allow(clippy::cast_precision_loss)]
    pub fn recompute_utilization(&mut self, now_ms: u128, resource_timeout_ms: u64) -> f64 {
        let (valid, busy) = self
            .resources
            .iter()
            .filter(|r| !r.is_stale(now_ms, resource_timeout_ms))
            .fold((0usize, 0usize), |(valid, busy), r| {
                (valid + 1, busy + usize::from(!r.is_available))
            });
        self.utilization = if valid == 0 {
            0.0
        } else {
            busy as f64 / valid as f64
        };
        self.utilization
    }

    pub(crate) fn position(&self, id: ResourceId) -> Option<usize> {
        self.resources.iter().position(|r| r.id == id)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&PooledResource> {
        self.resources.get(index)
    }

    /// First available, non-stale unit fitting `request`.
    pub(crate) fn find_available(
        &self,
        request: &AllocationRequest,
        now_ms: u128,
        resource_timeout_ms: u64,
    ) -> Option<usize> {
        self.resources.iter().position(|r| {
            r.is_available && !r.is_stale(now_ms, resource_timeout_ms) && r.satisfies(request)
        })
    }

    pub(crate) fn push(&mut self, resource: PooledResource) -> usize {
        self.resources.push(resource);
        self.resources.len() - 1
    }

    /// Mark a unit busy for `request` and return a copy for the caller.
    /// `lease_key` is handed back by [`ResourcePoolTier::mark_available`].
    pub(crate) fn mark_busy(
        &mut self,
        index: usize,
        request: &AllocationRequest,
        lease_key: String,
        now_ms: u128,
        from_cache: bool,
    ) -> Option<PooledResource> {
        let unit = self.resources.get_mut(index)?;
        unit.lease_key = Some(lease_key);
        unit.is_available = false;
        unit.last_used_ms = now_ms;
        unit.allocated_at_ms = Some(now_ms);
        unit.timeout_ms = request.requirements.timeout_ms;
        unit.metrics.utilization = 1.0;
        if from_cache {
            unit.metrics.cache_hits += 1;
        } else {
            unit.metrics.cache_misses += 1;
        }
        Some(unit.clone())
    }

    /// Mark a unit idle and return the key it was leased under.
    pub(crate) fn mark_available(&mut self, index: usize, now_ms: u128) -> Option<String> {
        let unit = self.resources.get_mut(index)?;
        unit.is_available = true;
        unit.last_used_ms = now_ms;
        unit.allocated_at_ms = None;
        unit.timeout_ms = None;
        unit.metrics.utilization = 0.0;
        unit.lease_key.take()
    }

    /// Remove stale units and return their ids.
    pub(crate) fn remove_stale(&mut self, now_ms: u128, resource_timeout_ms: u64) -> Vec<ResourceId> {
        let mut removed = Vec::new();
        self.resources.retain(|r| {
            let stale = r.is_stale(now_ms, resource_timeout_ms);
            if stale {
                removed.push(r.id);
            }
            !stale
        });
        removed
    }

    /// Remove up to `count` available units, least recently used first.
    pub(crate) fn shrink(&mut self, count: usize) -> Vec<ResourceId> {
        let mut idle: Vec<(u128, ResourceId)> = self
            .resources
            .iter()
            .filter(|r| r.is_available)
            .map(|r| (r.last_used_ms, r.id))
            .collect();
        idle.sort_unstable_by_key(|(last_used, _)| *last_used);
        let victims: Vec<ResourceId> = idle.into_iter().take(count).map(|(_, id)| id).collect();
        self.resources.retain(|r| !victims.contains(&r.id));
        victims
    }

    pub(crate) fn clear(&mut self) {
        self.resources.clear();
        self.utilization = 0.0;
    }

    /// Point-in-time view.
    pub fn snapshot(&self) -> TierSnapshot {
        TierSnapshot {
            priority: self.priority,
            size: self.resources.len(),
            busy: self.busy_count(),
            max_size: self.max_size,
            utilization: self.utilization,
        }
    }
}
