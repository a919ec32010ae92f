//! Generic bounded cache with least-recently-used partial eviction.
//!
//! Recency is a logical clock rather than wall time, so "least recently used"
//! is exact even when many accesses land in the same millisecond. Idle expiry
//! uses wall time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dictrans_core::models::CacheStatistics;
use dictrans_observability::events;

struct CacheEntry<V> {
    value: V,
    last_access: AtomicU64,
    touched_at_ms: AtomicU64,
    weight_hint: usize,
}

/// Concurrent string-keyed cache.
///
/// Capacity is enforced on insert by evicting the least recently used
/// entries. Concurrent inserts may briefly overshoot `max_size` by the
/// number of racing writers.
pub struct CacheManager<V> {
    name: String,
    entries: DashMap<String, CacheEntry<V>>,
    max_size: usize,
    expire_after_access: Option<Duration>,
    epoch: Instant,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone + Send + Sync> CacheManager<V> {
    /// `expire_after_access` of `None` keeps entries until evicted.
    pub fn new(name: impl Into<String>, max_size: usize, expire_after_access: Option<Duration>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            max_size: max_size.max(1),
            expire_after_access,
            epoch: Instant::now(),
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Look up `key`, refreshing its recency. Idle-expired entries are
    /// removed and reported as misses.
    pub fn get(&self, key: &str) -> Option<V> {
        let now_ms = self.now_ms();
        let tick = self.tick();

        let found = self.entries.get(key).and_then(|entry| {
            if self.is_expired(&entry, now_ms) {
                None
            } else {
                entry.last_access.store(tick, Ordering::Relaxed);
                entry.touched_at_ms.store(now_ms, Ordering::Relaxed);
                Some(entry.value.clone())
            }
        });

        match found {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                events::cache_operation(&self.name, "get", key, true);
                Some(value)
            }
            None => {
                if self
                    .entries
                    .remove_if(key, |_, entry| self.is_expired(entry, now_ms))
                    .is_some()
                {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                events::cache_operation(&self.name, "get", key, false);
                None
            }
        }
    }

    pub fn put(&self, key: impl Into<String>, value: V) {
        self.put_weighted(key, value, 1);
    }

    /// Insert with a relative cost hint, evicting LRU entries when full.
    pub fn put_weighted(&self, key: impl Into<String>, value: V, weight_hint: usize) {
        let key = key.into();
        if !self.entries.contains_key(&key) {
            let len = self.entries.len();
            if len >= self.max_size {
                self.evict_least_recently_used(len + 1 - self.max_size);
            }
        }
        let entry = CacheEntry {
            value,
            last_access: AtomicU64::new(self.tick()),
            touched_at_ms: AtomicU64::new(self.now_ms()),
            weight_hint,
        };
        events::cache_operation(&self.name, "put", &key, false);
        self.entries.insert(key, entry);
    }

    /// Return the cached value or build, insert and return a new one.
    ///
    /// Two threads missing on the same key may both build; the later insert
    /// wins. Build errors are returned without caching anything.
    pub fn get_or_try_insert_with<E, F>(&self, key: &str, build: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<(V, usize), E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let (value, weight_hint) = build()?;
        self.put_weighted(key, value.clone(), weight_hint);
        Ok(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, entry)| {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            entry.value
        })
    }

    /// Evict up to `count` entries in least-recently-used order.
    ///
    /// An entry touched after the ordering snapshot is skipped rather than
    /// evicted. Returns how many entries were removed.
    pub fn evict_least_recently_used(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let mut candidates: Vec<(String, u64)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().last_access.load(Ordering::Relaxed)))
            .collect();
        candidates.sort_by_key(|(_, tick)| *tick);

        let mut removed = 0;
        for (key, tick) in candidates.into_iter().take(count) {
            if self
                .entries
                .remove_if(&key, |_, entry| entry.last_access.load(Ordering::Relaxed) == tick)
                .is_some()
            {
                removed += 1;
            }
        }
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Drop every entry. Returns how many were removed.
    ///
    /// Only entries actually removed are counted; an insert racing the sweep
    /// either survives or is counted, never both.
    pub fn evict_all(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, _| {
            removed += 1;
            false
        });
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Drop entries whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let matched = key.starts_with(prefix);
            removed += usize::from(matched);
            !matched
        });
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of weight hints over live entries.
    pub fn total_weight(&self) -> usize {
        self.entries.iter().map(|e| e.value().weight_hint).sum()
    }

    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics::new(
            self.name.clone(),
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.evictions.load(Ordering::Relaxed),
            self.entries.len() as u64,
            self.max_size as u64,
        )
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now_ms: u64) -> bool {
        match self.expire_after_access {
            Some(ttl) => {
                now_ms.saturating_sub(entry.touched_at_ms.load(Ordering::Relaxed)) > ttl.as_millis() as u64
            }
            None => false,
        }
    }
}
