//! Tests for the pool cache

use prometheus_resource_core::core::{AllocationRequest, CachedResource, PoolCache};
use prometheus_resource_core::util::Priority;
use uuid::Uuid;

fn entry() -> CachedResource {
    CachedResource {
        id: Uuid::new_v4(),
        priority: Priority::Medium,
    }
}

#[test]
fn test_evicts_least_recently_used() {
    let mut cache = PoolCache::new(2);
    let (a, b, c) = (entry(), entry(), entry());
    assert!(cache.put("a".into(), a).is_none());
    assert!(cache.put("b".into(), b).is_none());
    assert_eq!(cache.get("a"), Some(a));

    assert_eq!(cache.put("c".into(), c), Some(b));
    assert!(cache.get("b").is_none());
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_request_keys_ignore_identity_and_priority() {
    let mut cache = PoolCache::new(4);
    let first = AllocationRequest::new("one", "tts", Priority::Low).with_cpu(12.5);
    let second = AllocationRequest::new("two", "tts", Priority::Critical).with_cpu(12.5);
    let unit = entry();
    cache.put(first.cache_key(), unit);
    assert_eq!(cache.get(&second.cache_key()), Some(unit));
}

#[test]
fn test_clear_resets_counters() {
    let mut cache = PoolCache::new(4);
    cache.put("k".into(), entry());
    assert!(cache.get("k").is_some());
    cache.record_hit();
    assert!(cache.get("missing").is_none());
    cache.record_miss();
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);

    cache.clear();
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.size), (0, 0, 0));
    assert_eq!(stats.capacity, 4);
}

#[test]
fn test_remove_resource_drops_every_key_for_unit() {
    let mut cache = PoolCache::new(4);
    let unit = entry();
    cache.put("x".into(), unit);
    cache.put("y".into(), unit);
    cache.put("z".into(), entry());
    assert_eq!(cache.remove_resource(unit.id), 2);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_remove_by_request_key() {
    let mut cache = PoolCache::new(4);
    let request = AllocationRequest::new("one", "tts", Priority::Low).with_memory(64);
    let unit = entry();
    cache.put(request.cache_key(), unit);
    assert_eq!(cache.remove(&request.cache_key()), Some(unit));
    assert!(cache.remove(&request.cache_key()).is_none());
    assert!(cache.is_empty());
}
