//! Resource detector configuration: sampling cadence, thresholds and constraints.

use serde::{Deserialize, Serialize};

use crate::core::resources::{HealthStatus, ResourceDimension};

/// Warning/critical utilization percentages for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    /// Utilization (percent) at which the dimension is in warning.
    pub warning_percent: f64,
    /// Utilization (percent) at which the dimension is critical.
    pub critical_percent: f64,
}

impl ThresholdPair {
    /// Build a pair from percentages.
    pub const fn new(warning_percent: f64, critical_percent: f64) -> Self {
        Self {
            warning_percent,
            critical_percent,
        }
    }

    /// Classify a utilization reading. Boundaries are inclusive.
    pub fn classify(&self, utilization_percent: f64) -> HealthStatus {
        self.breach(utilization_percent)
            .map_or(HealthStatus::Healthy, |(status, _)| status)
    }

    /// Status and crossed threshold for a reading, or `None` when healthy.
    pub fn breach(&self, utilization_percent: f64) -> Option<(HealthStatus, f64)> {
        if utilization_percent >= self.critical_percent {
            Some((HealthStatus::Critical, self.critical_percent))
        } else if utilization_percent >= self.warning_percent {
            Some((HealthStatus::Warning, self.warning_percent))
        } else {
            None
        }
    }

    fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.warning_percent)
            || !(0.0..=100.0).contains(&self.critical_percent)
        {
            return Err("thresholds must be within 0..=100".into());
        }
        if self.warning_percent > self.critical_percent {
            return Err("warning threshold must not exceed critical threshold".into());
        }
        Ok(())
    }
}

impl Default for ThresholdPair {
    fn default() -> Self {
        Self::new(70.0, 90.0)
    }
}

/// Per-dimension thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceThresholds {
    /// Memory thresholds.
    pub memory: ThresholdPair,
    /// CPU thresholds.
    pub cpu: ThresholdPair,
    /// Disk thresholds.
    pub disk: ThresholdPair,
}

impl ResourceThresholds {
    /// Thresholds for `dimension`.
    pub const fn for_dimension(&self, dimension: ResourceDimension) -> &ThresholdPair {
        match dimension {
            ResourceDimension::Memory => &self.memory,
            ResourceDimension::Cpu => &self.cpu,
            ResourceDimension::Disk => &self.disk,
        }
    }
}

/// Absolute limits for one dimension.
///
/// Units are bytes for memory and disk and percentage points for cpu.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionConstraint {
    /// Ceiling on what a single allocation may draw, if any.
    pub max_allocation: Option<f64>,
    /// Headroom that must remain free; remaining capacity excludes it.
    pub min_available: f64,
    /// Usage at which the dimension is in warning, if any.
    pub warning_absolute: Option<f64>,
    /// Usage at which the dimension is critical, if any.
    pub critical_absolute: Option<f64>,
}

impl DimensionConstraint {
    /// Classify absolute usage. Boundaries are inclusive.
    pub fn classify(&self, used: f64) -> HealthStatus {
        self.breach(used)
            .map_or(HealthStatus::Healthy, |(status, _)| status)
    }

    /// Status and crossed absolute threshold for `used`, or `None` when
    /// healthy or unset.
    pub fn breach(&self, used: f64) -> Option<(HealthStatus, f64)> {
        if let Some(critical) = self.critical_absolute.filter(|&c| used >= c) {
            return Some((HealthStatus::Critical, critical));
        }
        self.warning_absolute
            .filter(|&w| used >= w)
            .map(|w| (HealthStatus::Warning, w))
    }

    fn validate(&self) -> Result<(), String> {
        if self.min_available < 0.0 || !self.min_available.is_finite() {
            return Err("min_available must be a non-negative number".into());
        }
        if let Some(max) = self.max_allocation {
            if max <= 0.0 || !max.is_finite() {
                return Err("max_allocation must be positive".into());
            }
        }
        for level in [self.warning_absolute, self.critical_absolute].into_iter().flatten() {
            if level < 0.0 || !level.is_finite() {
                return Err("absolute thresholds must be non-negative numbers".into());
            }
        }
        if let (Some(warning), Some(critical)) = (self.warning_absolute, self.critical_absolute) {
            if warning > critical {
                return Err("warning_absolute must not exceed critical_absolute".into());
            }
        }
        Ok(())
    }
}

/// Per-dimension absolute constraints.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConstraints {
    /// Memory constraint.
    pub memory: DimensionConstraint,
    /// CPU constraint.
    pub cpu: DimensionConstraint,
    /// Disk constraint.
    pub disk: DimensionConstraint,
}

impl ResourceConstraints {
    /// Constraint for `dimension`.
    pub const fn for_dimension(&self, dimension: ResourceDimension) -> &DimensionConstraint {
        match dimension {
            ResourceDimension::Memory => &self.memory,
            ResourceDimension::Cpu => &self.cpu,
            ResourceDimension::Disk => &self.disk,
        }
    }
}

/// Resource detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Interval between samples in milliseconds.
    pub sampling_interval_ms: u64,
    /// Percentage thresholds for alerts and status.
    pub thresholds: ResourceThresholds,
    /// Absolute constraints for availability.
    pub constraints: ResourceConstraints,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sampling_interval_ms: 5_000,
            thresholds: ResourceThresholds::default(),
            constraints: ResourceConstraints::default(),
        }
    }
}

impl DetectorConfig {
    /// Validate detector configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.sampling_interval_ms == 0 {
            return Err("sampling_interval_ms must be greater than 0".into());
        }
        for dimension in [
            ResourceDimension::Memory,
            ResourceDimension::Cpu,
            ResourceDimension::Disk,
        ] {
            self.thresholds
                .for_dimension(dimension)
                .validate()
                .map_err(|e| format!("{dimension} thresholds invalid: {e}"))?;
            self.constraints
                .for_dimension(dimension)
                .validate()
                .map_err(|e| format!("{dimension} constraint invalid: {e}"))?;
        }
        Ok(())
    }
}
