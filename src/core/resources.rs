//! Host resource snapshots, derived availability and alert values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three sampled host dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceDimension {
    /// Physical memory.
    Memory,
    /// Processor time.
    Cpu,
    /// Disk capacity.
    Disk,
}

impl fmt::Display for ResourceDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Cpu => "cpu",
            Self::Disk => "disk",
        })
    }
}

/// Health classification shared by availability and pool state.
///
/// Ordered so that `max` yields the worst status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Below the warning threshold.
    #[default]
    Healthy,
    /// At or above warning, below critical.
    Warning,
    /// At or above critical.
    Critical,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        })
    }
}

/// Aggregate pool health.
pub type PoolState = HealthStatus;

/// Memory reading in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryResources {
    /// Installed memory.
    pub total_bytes: u64,
    /// Memory in use.
    pub used_bytes: u64,
    /// Memory available for new allocations.
    pub available_bytes: u64,
}

impl MemoryResources {
    /// Used share of total, in percent.
    pub fn utilization_percent(&self) -> f64 {
        percent(self.used_bytes, self.total_bytes)
    }
}

/// Load averages over 1, 5 and 15 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadAverage {
    /// One-minute load.
    pub one: f64,
    /// Five-minute load.
    pub five: f64,
    /// Fifteen-minute load.
    pub fifteen: f64,
}

/// Processor reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CpuResources {
    /// Logical core count.
    pub cores: usize,
    /// Global utilization in percent (0-100).
    pub utilization_percent: f64,
    /// Load averages; zero on platforms that do not report them.
    pub load_average: LoadAverage,
}

/// Disk reading in bytes, summed over mounted disks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiskResources {
    /// Total capacity.
    pub total_bytes: u64,
    /// Capacity in use.
    pub used_bytes: u64,
    /// Free capacity.
    pub available_bytes: u64,
}

impl DiskResources {
    /// Used share of total, in percent.
    pub fn utilization_percent(&self) -> f64 {
        percent(self.used_bytes, self.total_bytes)
    }
}

/// Point-in-time host readings. Replaced wholesale on every sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemResources {
    /// Memory reading.
    pub memory: MemoryResources,
    /// CPU reading.
    pub cpu: CpuResources,
    /// Disk reading.
    pub disk: DiskResources,
    /// When the sample was taken (ms since epoch).
    pub sampled_at_ms: u128,
}

impl SystemResources {
    /// Usage of `dimension` in absolute units: bytes for memory and disk,
    /// percentage points for cpu.
    #[allow(clippy::cast_precision_loss)]
    pub fn used_amount(&self, dimension: ResourceDimension) -> f64 {
        match dimension {
            ResourceDimension::Memory => self.memory.used_bytes as f64,
            ResourceDimension::Cpu => self.cpu.utilization_percent,
            ResourceDimension::Disk => self.disk.used_bytes as f64,
        }
    }

    /// Utilization of `dimension` in percent.
    pub fn utilization_percent(&self, dimension: ResourceDimension) -> f64 {
        match dimension {
            ResourceDimension::Memory => self.memory.utilization_percent(),
            ResourceDimension::Cpu => self.cpu.utilization_percent,
            ResourceDimension::Disk => self.disk.utilization_percent(),
        }
    }
}

/// Derived availability of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionAvailability {
    /// Whether new work may draw on this dimension.
    pub is_available: bool,
    /// Remaining capacity: bytes for memory and disk, percentage points for cpu.
    pub remaining: f64,
    /// Current utilization in percent.
    pub utilization_percent: f64,
    /// Threshold classification.
    pub status: HealthStatus,
}

/// Availability across all dimensions plus the worst status among them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceAvailability {
    /// Memory availability.
    pub memory: DimensionAvailability,
    /// CPU availability.
    pub cpu: DimensionAvailability,
    /// Disk availability.
    pub disk: DimensionAvailability,
    /// Worst of the three dimension statuses.
    pub status: HealthStatus,
}

/// Severity of a threshold alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Warning threshold reached.
    Warning,
    /// Critical threshold reached.
    Critical,
}

/// Threshold crossing emitted by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAlert {
    /// Dimension that crossed.
    pub dimension: ResourceDimension,
    /// Which threshold was reached.
    pub severity: AlertSeverity,
    /// Human-readable summary.
    pub message: String,
    /// Observed reading: percent, or absolute usage when an absolute level
    /// was the worse breach.
    pub current: f64,
    /// Threshold that was reached, in the same unit as `current`.
    pub threshold: f64,
    /// Emission time (ms since epoch).
    pub timestamp_ms: u128,
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
