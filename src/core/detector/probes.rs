//! Per-dimension sampling strategies.
//!
//! Each dimension is read through its own [`ResourceProbe`], so any one of
//! them can be replaced (for containers, remote hosts, or tests) without
//! touching the others. Plain closures returning a reading are probes too.

use parking_lot::Mutex;
use sysinfo::{Disks, System};

use crate::core::error::DetectorError;
use crate::core::resources::{
    CpuResources, DiskResources, LoadAverage, MemoryResources, ResourceDimension,
};

/// Reads one dimension of host resources.
pub trait ResourceProbe<T>: Send + Sync {
    /// Take a reading.
    fn sample(&self) -> Result<T, DetectorError>;
}

impl<T, F> ResourceProbe<T> for F
where
    F: Fn() -> Result<T, DetectorError> + Send + Sync,
{
    fn sample(&self) -> Result<T, DetectorError> {
        self()
    }
}

/// Host probe backed by the `sysinfo` crate; serves all three dimensions.
///
/// The [`System`] handle is kept between samples so CPU usage is measured
/// over the sampling interval. The first CPU reading may be zero.
pub struct SysinfoProbe {
    system: Mutex<System>,
}

impl std::fmt::Debug for SysinfoProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoProbe").finish_non_exhaustive()
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProbe {
    /// Create a probe and prime its CPU counters.
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu_usage();
        Self {
            system: Mutex::new(system),
        }
    }
}

impl ResourceProbe<MemoryResources> for SysinfoProbe {
    fn sample(&self) -> Result<MemoryResources, DetectorError> {
        let mut system = self.system.lock();
        system.refresh_memory();
        let total_bytes = system.total_memory();
        if total_bytes == 0 {
            return Err(DetectorError::Sampling {
                dimension: ResourceDimension::Memory,
                reason: "host reported zero total memory".into(),
            });
        }
        Ok(MemoryResources {
            total_bytes,
            used_bytes: system.used_memory().min(total_bytes),
            available_bytes: system.available_memory().min(total_bytes),
        })
    }
}

impl ResourceProbe<CpuResources> for SysinfoProbe {
    fn sample(&self) -> Result<CpuResources, DetectorError> {
        let mut system = self.system.lock();
        system.refresh_cpu_usage();
        let reported = system.cpus().len();
        let cores = if reported == 0 { num_cpus::get() } else { reported };
        let utilization_percent = f64::from(system.global_cpu_usage());
        if !utilization_percent.is_finite() {
            return Err(DetectorError::Sampling {
                dimension: ResourceDimension::Cpu,
                reason: format!("non-finite cpu usage {utilization_percent}"),
            });
        }
        let load = System::load_average();
        Ok(CpuResources {
            cores,
            utilization_percent: utilization_percent.clamp(0.0, 100.0),
            load_average: LoadAverage {
                one: load.one,
                five: load.five,
                fifteen: load.fifteen,
            },
        })
    }
}

impl ResourceProbe<DiskResources> for SysinfoProbe {
    fn sample(&self) -> Result<DiskResources, DetectorError> {
        let disks = Disks::new_with_refreshed_list();
        let (total_bytes, available_bytes) = disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, available), disk| {
                (
                    total.saturating_add(disk.total_space()),
                    available.saturating_add(disk.available_space()),
                )
            });
        if total_bytes == 0 {
            return Err(DetectorError::Sampling {
                dimension: ResourceDimension::Disk,
                reason: "no disks with capacity found".into(),
            });
        }
        let available_bytes = available_bytes.min(total_bytes);
        Ok(DiskResources {
            total_bytes,
            used_bytes: total_bytes - available_bytes,
            available_bytes,
        })
    }
}
