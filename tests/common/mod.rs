//! Shared fixtures: a detector driven by adjustable fake host readings.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use prometheus_resource_core::config::{DetectorConfig, ResourceCoreConfig};
use prometheus_resource_core::core::{
    CpuResources, DetectorError, DiskResources, MemoryResources, ResourceDetector,
};

/// Host memory used by the fake detector: 100 GiB.
pub const TOTAL_MEMORY: u64 = 100 * 1024 * 1024 * 1024;

/// Adjustable host utilization, in whole percent.
#[derive(Clone)]
pub struct FakeHost {
    memory_pct: Arc<AtomicU64>,
    cpu_pct: Arc<AtomicU64>,
}

impl FakeHost {
    pub fn new(memory_pct: u64, cpu_pct: u64) -> Self {
        Self {
            memory_pct: Arc::new(AtomicU64::new(memory_pct)),
            cpu_pct: Arc::new(AtomicU64::new(cpu_pct)),
        }
    }

    pub fn quiet() -> Self {
        Self::new(10, 5)
    }

    pub fn set_memory(&self, pct: u64) {
        self.memory_pct.store(pct, Ordering::SeqCst);
    }

    pub fn set_cpu(&self, pct: u64) {
        self.cpu_pct.store(pct, Ordering::SeqCst);
    }

    pub fn detector(&self, config: DetectorConfig) -> Arc<ResourceDetector> {
        let memory = Arc::clone(&self.memory_pct);
        let cpu = Arc::clone(&self.cpu_pct);
        Arc::new(
            ResourceDetector::new(config)
                .with_memory_probe(move || {
                    let used = TOTAL_MEMORY / 100 * memory.load(Ordering::SeqCst);
                    Ok::<_, DetectorError>(MemoryResources {
                        total_bytes: TOTAL_MEMORY,
                        used_bytes: used,
                        available_bytes: TOTAL_MEMORY - used,
                    })
                })
                .with_cpu_probe(move || {
                    #[allow(clippy::cast_precision_loss)]
                    let utilization_percent = cpu.load(Ordering::SeqCst) as f64;
                    Ok::<_, DetectorError>(CpuResources {
                        cores: 8,
                        utilization_percent,
                        ..CpuResources::default()
                    })
                })
                .with_disk_probe(|| {
                    Ok::<_, DetectorError>(DiskResources {
                        total_bytes: 1_000_000,
                        used_bytes: 200_000,
                        available_bytes: 800_000,
                    })
                }),
        )
    }
}

/// Defaults with the breaker off, so capacity errors do not trip it.
pub fn config_without_breaker() -> ResourceCoreConfig {
    let mut cfg = ResourceCoreConfig::default();
    cfg.pool.enable_circuit_breaker = false;
    cfg
}
