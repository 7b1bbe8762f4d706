//! Benchmarks for the resource pool manager.
//!
//! Benchmarks cover:
//! - Allocate/release round trips per tier size
//! - Cache lookups
//! - Health evaluation driven by detector samples

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;

use prometheus_resource_core::config::{DetectorConfig, ResourceCoreConfig};
use prometheus_resource_core::core::{
    AllocationRequest, CachedResource, CpuResources, DetectorError, DiskResources, MemoryResources,
    PoolCache,
    ResourceDetector, ResourcePoolManager,
};
use prometheus_resource_core::util::Priority;
use rand::Rng;

// ============================================================================
// Fixtures
// ============================================================================

fn fake_detector() -> Arc<ResourceDetector> {
    Arc::new(
        ResourceDetector::new(DetectorConfig::default())
            .with_memory_probe(|| {
                Ok::<_, DetectorError>(MemoryResources {
                    total_bytes: 64 << 30,
                    used_bytes: 16 << 30,
                    available_bytes: 48 << 30,
                })
            })
            .with_cpu_probe(|| {
                Ok::<_, DetectorError>(CpuResources {
                    cores: 16,
                    utilization_percent: 20.0,
                    ..CpuResources::default()
                })
            })
            .with_disk_probe(|| {
                Ok::<_, DetectorError>(DiskResources {
                    total_bytes: 1 << 40,
                    used_bytes: 1 << 38,
                    available_bytes: 3 << 38,
                })
            }),
    )
}

fn manager(max_pool_size: usize) -> Arc<ResourcePoolManager> {
    let mut cfg = ResourceCoreConfig::default();
    cfg.pool.max_pool_size = max_pool_size;
    ResourcePoolManager::new(cfg.pool, cfg.circuit_breaker, fake_detector())
        .unwrap_or_else(|e| panic!("bench manager: {e}"))
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_allocate_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate_release");
    for size in [1usize, 10, 100] {
        let pool = manager(size);
        // Warm the tier so the loop measures reuse, not growth.
        let warm: Vec<_> = (0..size)
            .filter_map(|i| {
                pool.allocate(&AllocationRequest::new(format!("warm-{i}"), "llm", Priority::Medium))
                    .ok()
            })
            .collect();
        for unit in &warm {
            let _ = pool.release(unit);
        }

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let request = AllocationRequest::new("bench", "llm", Priority::Medium).with_memory(1 << 20);
            b.iter(|| {
                let unit = pool.allocate(black_box(&request)).unwrap_or_else(|e| panic!("{e}"));
                let _ = pool.release(&unit);
            });
        });
    }
    group.finish();
}

fn bench_cache_lookup(c: &mut Criterion) {
    let mut cache = PoolCache::new(1_000);
    let mut rng = rand::rng();
    let keys: Vec<String> = (0..1_000)
        .map(|i| {
            AllocationRequest::new(format!("r{i}"), "llm", Priority::Low)
                .with_memory(rng.random_range(1..1u64 << 30))
                .cache_key()
        })
        .collect();
    for key in &keys {
        cache.put(
            key.clone(),
            CachedResource {
                id: uuid::Uuid::new_v4(),
                priority: Priority::Low,
            },
        );
    }

    c.bench_function("cache_get_hit", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % keys.len();
            black_box(cache.get(&keys[i]))
        });
    });

    c.bench_function("cache_key", |b| {
        let request = AllocationRequest::new("k", "llm", Priority::High).with_cpu(12.5);
        b.iter(|| black_box(request.cache_key()));
    });
}

fn bench_health_evaluation(c: &mut Criterion) {
    let pool = manager(10);
    for i in 0..5 {
        let _ = pool.allocate(&AllocationRequest::new(format!("h{i}"), "llm", Priority::High));
    }
    let detector = Arc::clone(pool.detector());
    c.bench_function("sample_and_evaluate_health", |b| {
        b.iter(|| black_box(detector.sample_now()));
    });
    c.bench_function("monitor", |b| {
        b.iter(|| black_box(pool.monitor()));
    });
}

criterion_group!(
    benches,
    bench_allocate_release,
    bench_cache_lookup,
    bench_health_evaluation
);
criterion_main!(benches);
