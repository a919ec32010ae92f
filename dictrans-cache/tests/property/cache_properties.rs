use dictrans_cache::CacheManager;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Put(u8),
    Get(u8),
    EvictLru(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..20).prop_map(Op::Put),
        (0u8..20).prop_map(Op::Get),
        (0u8..4).prop_map(Op::EvictLru),
    ]
}

proptest! {
    #[test]
    fn size_never_exceeds_capacity(max in 1usize..8, ops in prop::collection::vec(op(), 0..200)) {
        let cache: CacheManager<u8> = CacheManager::new("prop", max, None);
        for op in ops {
            match op {
                Op::Put(k) => cache.put(k.to_string(), k),
                Op::Get(k) => { cache.get(&k.to_string()); }
                Op::EvictLru(n) => { cache.evict_least_recently_used(n as usize); }
            }
            prop_assert!(cache.len() <= max);
        }
    }

    #[test]
    fn most_recent_key_survives_single_eviction(keys in prop::collection::hash_set(0u8..50, 2..20)) {
        let cache: CacheManager<u8> = CacheManager::new("prop", 100, None);
        let keys: Vec<u8> = keys.into_iter().collect();
        for k in &keys {
            cache.put(k.to_string(), *k);
        }
        let last = keys[keys.len() - 1];
        let first = keys[0];
        cache.get(&first.to_string());
        cache.evict_least_recently_used(keys.len() - 2);
        prop_assert!(cache.contains(&first.to_string()));
        prop_assert!(cache.contains(&last.to_string()));
    }

    #[test]
    fn hits_plus_misses_equals_lookups(lookups in prop::collection::vec(0u8..10, 0..100)) {
        let cache: CacheManager<u8> = CacheManager::new("prop", 5, None);
        for k in 0..5u8 {
            cache.put(k.to_string(), k);
        }
        for k in &lookups {
            cache.get(&k.to_string());
        }
        let stats = cache.statistics();
        prop_assert_eq!(stats.hit_count + stats.miss_count, lookups.len() as u64);
    }
}
