//! # Prometheus Resource Core
//!
//! Resource pressure detection, priority-tiered resource pools and failure
//! isolation for the Prometheus AI Platform.
//!
//! Heavy AI workloads (inference, audio generation, training jobs) compete for
//! the same host memory and CPU. This crate decides whether new work may start
//! and hands out pooled capacity units to it, while protecting the host from
//! cascading overload.
//!
//! ## Components
//!
//! - **`ResourceDetector`**: samples memory, CPU and disk on a fixed interval,
//!   derives availability and emits threshold alerts. Each dimension is read
//!   through a replaceable `ResourceProbe`.
//! - **`ResourcePoolManager`**: one tier of units per priority. Allocation
//!   checks system headroom, reuses a free unit or grows the tier, and fails
//!   fast with `ResourceExhausted` when the tier is full. A cleanup timer
//!   reclaims stale units; health transitions are emitted as events.
//! - **`PoolCache`**: LRU shortcut from a normalized request to a unit.
//! - **`CircuitBreaker`**: closed / open / half-open gate around allocation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prometheus_resource_core::builders::build_manager;
//! use prometheus_resource_core::config::ResourceCoreConfig;
//! use prometheus_resource_core::core::{AllocationRequest, PoolError};
//! use prometheus_resource_core::util::Priority;
//!
//! let manager = build_manager(&ResourceCoreConfig::from_env()?)?;
//! manager.start()?; // inside a tokio runtime
//! manager.on_state_change(|change| tracing::warn!(?change, "pool health changed"));
//!
//! let request = AllocationRequest::new("job-1", "inference", Priority::High)
//!     .with_memory(512 * 1024 * 1024)
//!     .with_timeout_ms(60_000);
//! match manager.allocate(&request) {
//!     Ok(unit) => {
//!         // ... run the work ...
//!         manager.release(&unit)?;
//!     }
//!     Err(e) if e.is_retryable() => { /* back off and retry */ }
//!     Err(e) => return Err(e.into()),
//! }
//! manager.dispose();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Detection, pooling and failure-isolation components.
pub mod core;
/// Configuration models for the detector, pool manager and breaker.
pub mod config;
/// Builders that assemble components from configuration.
pub mod builders;
/// Runtime adapters hosting periodic timers.
pub mod runtime;
/// Shared utilities.
pub mod util;
