//! Allocation request model and its normalized cache key.

use serde::{Deserialize, Serialize};

use crate::util::serde::{Priority, RequestId, ResourceType};

/// What an allocation needs from the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRequirements {
    /// Memory the work expects to draw, in bytes.
    pub memory_bytes: u64,
    /// CPU the work expects to draw, in percentage points of the host.
    pub cpu_percent: f64,
    /// Maximum time the unit may stay allocated before it is reclaimed.
    pub timeout_ms: Option<u64>,
}

/// Upper bounds a unit must satisfy to serve the request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConstraints {
    /// Largest acceptable unit memory slice, in bytes.
    pub max_memory_bytes: Option<u64>,
    /// Largest acceptable unit CPU slice, in percentage points.
    pub max_cpu_percent: Option<f64>,
    /// Latency budget in milliseconds. Part of the cache key only; units do
    /// not measure latency.
    pub max_latency_ms: Option<u64>,
}

/// Request for one pooled unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Caller's request identifier.
    pub id: RequestId,
    /// Kind of unit wanted.
    pub resource_type: ResourceType,
    /// Tier to allocate from.
    pub priority: Priority,
    /// Host headroom required.
    #[serde(default)]
    pub requirements: ResourceRequirements,
    /// Optional bounds on the unit.
    #[serde(default)]
    pub constraints: Option<RequestConstraints>,
}

#[derive(Serialize)]
struct CacheKeyParts<'a> {
    resource_type: &'a ResourceType,
    requirements: &'a ResourceRequirements,
    constraints: &'a Option<RequestConstraints>,
}

impl AllocationRequest {
    /// Request with no requirements or constraints.
    pub fn new(
        id: impl Into<RequestId>,
        resource_type: impl Into<ResourceType>,
        priority: Priority,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            priority,
            requirements: ResourceRequirements::default(),
            constraints: None,
        }
    }

    /// Set the memory requirement.
    #[must_use]
    pub fn with_memory(mut self, memory_bytes: u64) -> Self {
        self.requirements.memory_bytes = memory_bytes;
        self
    }

    /// Set the CPU requirement.
    #[must_use]
    pub fn with_cpu(mut self, cpu_percent: f64) -> Self {
        self.requirements.cpu_percent = cpu_percent;
        self
    }

    /// Set the per-allocation timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.requirements.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the unit constraints.
    #[must_use]
    pub fn with_constraints(mut self, constraints: RequestConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Deterministic key over type, requirements and constraints.
    ///
    /// Identifier and priority are excluded, so identical work shapes share a
    /// key regardless of who asks.
    pub fn cache_key(&self) -> String {
        let parts = CacheKeyParts {
            resource_type: &self.resource_type,
            requirements: &self.requirements,
            constraints: &self.constraints,
        };
        serde_json::to_string(&parts).unwrap_or_else(|_| {
            format!(
                "{}|{:?}|{:?}",
                self.resource_type, self.requirements, self.constraints
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_shapes_share_a_key() {
        let a = AllocationRequest::new("a", "inference", Priority::High)
            .with_memory(1024)
            .with_cpu(5.0);
        let b = AllocationRequest::new("b", "inference", Priority::Low)
            .with_memory(1024)
            .with_cpu(5.0);
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn differing_constraints_change_the_key() {
        let base = AllocationRequest::new("a", "inference", Priority::High);
        let constrained = base.clone().with_constraints(RequestConstraints {
            max_memory_bytes: Some(10),
            ..RequestConstraints::default()
        });
        assert_ne!(base.cache_key(), constrained.cache_key());
    }

    #[test]
    fn deserializes_with_defaults() {
        let req: AllocationRequest = serde_json::from_str(
            r#"{"id":"r1","resource_type":"audio","priority":"critical"}"#,
        )
        .unwrap();
        assert_eq!(req.priority, Priority::Critical);
        assert_eq!(req.requirements, ResourceRequirements::default());
        assert!(req.constraints.is_none());
    }
}
