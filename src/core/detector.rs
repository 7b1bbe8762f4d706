//! Resource detector: periodic host sampling, availability and alerts.
//!
//! The detector keeps the latest [`SystemResources`] behind an `Arc` that is
//! swapped wholesale on every successful sample, so readers never observe a
//! partially updated snapshot. A failed sample keeps the previous snapshot,
//! emits nothing and never stops the timer.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_resource_core::config::DetectorConfig;
//! use prometheus_resource_core::core::ResourceDetector;
//!
//! let detector = Arc::new(ResourceDetector::new(DetectorConfig::default()));
//! detector.on_alert(|alert| tracing::warn!(?alert, "resource pressure"));
//! detector.start()?; // samples once, then every `sampling_interval_ms`
//! let availability = detector.get_availability();
//! ```

pub mod probes;

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::{DetectorConfig, DimensionConstraint, ThresholdPair};
use crate::core::error::DetectorError;
use crate::core::events::{ListenerId, Listeners};
use crate::core::resources::{
    AlertSeverity, CpuResources, DimensionAvailability, DiskResources, HealthStatus,
    MemoryResources, ResourceAlert, ResourceAvailability, ResourceDimension, SystemResources,
};
use crate::runtime::{PeriodicTask, Spawn, TokioSpawner};
use crate::util::clock::{system_clock, SharedClock};

pub use probes::{ResourceProbe, SysinfoProbe};

/// Samples host memory, CPU and disk and classifies them against thresholds.
pub struct ResourceDetector {
    config: DetectorConfig,
    memory_probe: Arc<dyn ResourceProbe<MemoryResources>>,
    cpu_probe: Arc<dyn ResourceProbe<CpuResources>>,
    disk_probe: Arc<dyn ResourceProbe<DiskResources>>,
    snapshot: RwLock<Option<Arc<SystemResources>>>,
    update_listeners: Listeners<SystemResources>,
    alert_listeners: Listeners<ResourceAlert>,
    /// Serializes sampling so updates and alerts are emitted in sample order.
    sample_lock: ReentrantMutex<()>,
    timer: Mutex<Option<PeriodicTask>>,
    clock: SharedClock,
}

impl std::fmt::Debug for ResourceDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDetector")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl ResourceDetector {
    /// Detector reading the local host through [`SysinfoProbe`].
    pub fn new(config: DetectorConfig) -> Self {
        let host = Arc::new(SysinfoProbe::new());
        Self {
            config,
            memory_probe: Arc::clone(&host) as Arc<dyn ResourceProbe<MemoryResources>>,
            cpu_probe: Arc::clone(&host) as Arc<dyn ResourceProbe<CpuResources>>,
            disk_probe: host,
            snapshot: RwLock::new(None),
            update_listeners: Listeners::new(),
            alert_listeners: Listeners::new(),
            sample_lock: ReentrantMutex::new(()),
            timer: Mutex::new(None),
            clock: system_clock(),
        }
    }

    /// Replace the memory probe.
    #[must_use]
    pub fn with_memory_probe<P>(mut self, probe: P) -> Self
    where
        P: ResourceProbe<MemoryResources> + 'static,
    {
        self.memory_probe = Arc::new(probe);
        self
    }

    /// Replace the CPU probe.
    #[must_use]
    pub fn with_cpu_probe<P>(mut self, probe: P) -> Self
    where
        P: ResourceProbe<CpuResources> + 'static,
    {
        self.cpu_probe = Arc::new(probe);
        self
    }

    /// Replace the disk probe.
    #[must_use]
    pub fn with_disk_probe<P>(mut self, probe: P) -> Self
    where
        P: ResourceProbe<DiskResources> + 'static,
    {
        self.disk_probe = Arc::new(probe);
        self
    }

    /// Use a custom clock for snapshot and alert timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Configuration in use.
    pub const fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Register a callback fired after every successful sample.
    pub fn on_update<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&SystemResources) + Send + Sync + 'static,
    {
        self.update_listeners.subscribe(callback)
    }

    /// Register a callback fired for every threshold alert.
    pub fn on_alert<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&ResourceAlert) + Send + Sync + 'static,
    {
        self.alert_listeners.subscribe(callback)
    }

    /// Update listeners, for channel subscriptions or removal.
    pub const fn update_listeners(&self) -> &Listeners<SystemResources> {
        &self.update_listeners
    }

    /// Alert listeners, for channel subscriptions or removal.
    pub const fn alert_listeners(&self) -> &Listeners<ResourceAlert> {
        &self.alert_listeners
    }

    /// Sample once now, then every `sampling_interval_ms` on the current
    /// tokio runtime. Calling it while running is a no-op.
    pub fn start(self: &Arc<Self>) -> Result<(), DetectorError> {
        let spawner =
            TokioSpawner::try_current().map_err(|e| DetectorError::Runtime(e.to_string()))?;
        self.start_with(&spawner);
        Ok(())
    }

    /// Like [`ResourceDetector::start`] on an explicit spawner. Returns
    /// whether this call started sampling.
    pub fn start_with<S: Spawn>(self: &Arc<Self>, spawner: &S) -> bool {
        if self.is_running() {
            debug!("resource detector already running");
            return false;
        }
        self.sample_now();

        let mut timer = self.timer.lock();
        if timer.is_some() {
            return false;
        }
        let weak = Arc::downgrade(self);
        *timer = Some(PeriodicTask::spawn(
            spawner,
            "resource-sampling",
            Duration::from_millis(self.config.sampling_interval_ms),
            move || match weak.upgrade() {
                Some(detector) => {
                    detector.sample_now();
                    ControlFlow::Continue(())
                }
                None => ControlFlow::Break(()),
            },
        ));
        info!(
            interval_ms = self.config.sampling_interval_ms,
            "resource detector started"
        );
        true
    }

    /// Halt periodic sampling. A sample already in progress completes.
    pub fn stop(&self) {
        if let Some(task) = self.timer.lock().take() {
            task.stop();
            info!("resource detector stopped");
        }
    }

    /// Whether the sampling timer is active.
    pub fn is_running(&self) -> bool {
        self.timer.lock().is_some()
    }

    /// Detach every update and alert listener.
    pub fn clear_listeners(&self) {
        self.update_listeners.clear();
        self.alert_listeners.clear();
    }

    /// Take a sample immediately, publish it and run threshold checks.
    ///
    /// Returns `None` when a probe fails; the previous snapshot stays current.
    pub fn sample_now(&self) -> Option<Arc<SystemResources>> {
        let _ordered = self.sample_lock.lock();
        match self.collect() {
            Ok(resources) => {
                let snapshot = Arc::new(resources);
                *self.snapshot.write() = Some(Arc::clone(&snapshot));
                debug!(
                    memory_pct = snapshot.memory.utilization_percent(),
                    cpu_pct = snapshot.cpu.utilization_percent,
                    disk_pct = snapshot.disk.utilization_percent(),
                    "resources sampled"
                );
                self.update_listeners.emit(&snapshot);
                self.check_thresholds(&snapshot);
                Some(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "resource sampling failed, keeping last snapshot");
                None
            }
        }
    }

    /// Latest snapshot, sampling synchronously if none exists yet.
    ///
    /// If that first sample fails an all-zero snapshot is returned; it is not
    /// stored, so the next call samples again.
    pub fn get_current_resources(&self) -> Arc<SystemResources> {
        if let Some(snapshot) = self.snapshot.read().as_ref() {
            return Arc::clone(snapshot);
        }
        self.sample_now().unwrap_or_else(|| {
            Arc::new(SystemResources {
                sampled_at_ms: self.clock.now_ms(),
                ..SystemResources::default()
            })
        })
    }

    /// Latest snapshot without sampling.
    pub fn last_snapshot(&self) -> Option<Arc<SystemResources>> {
        self.snapshot.read().clone()
    }

    /// Availability derived from the latest snapshot and configured constraints.
    pub fn get_availability(&self) -> ResourceAvailability {
        self.availability_of(&self.get_current_resources())
    }

    /// Availability of an arbitrary snapshot under this detector's config.
    #[allow(clippy::cast_precision_loss)]
    pub fn availability_of(&self, resources: &SystemResources) -> ResourceAvailability {
        let thresholds = &self.config.thresholds;
        let constraints = &self.config.constraints;

        let dimension = |d: ResourceDimension, free: f64| {
            dimension_availability(
                resources.utilization_percent(d),
                resources.used_amount(d),
                free,
                thresholds.for_dimension(d),
                constraints.for_dimension(d),
            )
        };
        let memory = dimension(
            ResourceDimension::Memory,
            resources.memory.available_bytes as f64,
        );
        let cpu = dimension(
            ResourceDimension::Cpu,
            (100.0 - resources.cpu.utilization_percent).max(0.0),
        );
        let disk = dimension(ResourceDimension::Disk, resources.disk.available_bytes as f64);
        let status = memory.status.max(cpu.status).max(disk.status);

        ResourceAvailability {
            memory,
            cpu,
            disk,
            status,
        }
    }

    fn collect(&self) -> Result<SystemResources, DetectorError> {
        Ok(SystemResources {
            memory: self.memory_probe.sample()?,
            cpu: self.cpu_probe.sample()?,
            disk: self.disk_probe.sample()?,
            sampled_at_ms: self.clock.now_ms(),
        })
    }

    fn check_thresholds(&self, resources: &SystemResources) {
        for dimension in [
            ResourceDimension::Memory,
            ResourceDimension::Cpu,
            ResourceDimension::Disk,
        ] {
            let percent = resources.utilization_percent(dimension);
            let used = resources.used_amount(dimension);
            let by_percent = self.config.thresholds.for_dimension(dimension).breach(percent);
            let by_absolute = self.config.constraints.for_dimension(dimension).breach(used);
            // Absolute levels take over only when strictly worse.
            let (status, current, threshold, unit) = match (by_percent, by_absolute) {
                (p, Some((abs, level))) if p.is_none_or(|(pct, _)| abs > pct) => {
                    (abs, used, level, "")
                }
                (Some((pct, level)), _) => (pct, percent, level, "%"),
                (None, _) => continue,
            };
            let severity = match status {
                HealthStatus::Critical => AlertSeverity::Critical,
                HealthStatus::Warning => AlertSeverity::Warning,
                HealthStatus::Healthy => continue,
            };
            let alert = ResourceAlert {
                dimension,
                severity,
                message: format!(
                    "{dimension} usage {current:.1}{unit} reached {} threshold {threshold:.1}{unit}",
                    match severity {
                        AlertSeverity::Warning => "warning",
                        AlertSeverity::Critical => "critical",
                    }
                ),
                current,
                threshold,
                timestamp_ms: self.clock.now_ms(),
            };
            match severity {
                AlertSeverity::Critical => error!(%dimension, current, threshold, "critical resource alert"),
                AlertSeverity::Warning => warn!(%dimension, current, threshold, "resource warning"),
            }
            self.alert_listeners.emit(&alert);
        }
    }
}

impl Drop for ResourceDetector {
    fn drop(&mut self) {
        if let Some(task) = self.timer.get_mut().take() {
            task.stop();
        }
    }
}

/// Worse of the percentage and absolute classifications wins.
fn dimension_availability(
    utilization_percent: f64,
    used: f64,
    free: f64,
    thresholds: &ThresholdPair,
    constraint: &DimensionConstraint,
) -> DimensionAvailability {
    let mut remaining = (free - constraint.min_available).max(0.0);
    if let Some(max) = constraint.max_allocation {
        remaining = remaining.min(max);
    }
    let status = thresholds
        .classify(utilization_percent)
        .max(constraint.classify(used));
    DimensionAvailability {
        is_available: status != HealthStatus::Critical && remaining > 0.0,
        remaining,
        utilization_percent,
        status,
    }
}
