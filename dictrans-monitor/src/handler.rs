//! Pressure handler: the listener that shrinks caches as pressure rises.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dictrans_core::config::MonitoringConfig;
use dictrans_core::models::{MemoryUsageSnapshot, PressureLevel};
use dictrans_core::traits::{IEvictable, IMemoryPressureListener, IReferenceTracker};
use dictrans_observability::events;
use tracing::info;

/// Hook run on a HIGH or CRITICAL event to ask the host to release memory,
/// for example an allocator purge. Invoked once for HIGH and twice for CRITICAL.
pub type ReleaseHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerStatistics {
    pub medium_events: u64,
    pub high_events: u64,
    pub critical_events: u64,
    pub relief_events: u64,
    pub entries_evicted: u64,
    pub release_hints: u64,
}

/// Graduated response per level:
///
/// | level    | structural cache        | reflective cache | weak refs       | release hints |
/// |----------|-------------------------|------------------|-----------------|---------------|
/// | MEDIUM   | evict `medium_ratio` LRU | kept            | kept            | 0             |
/// | HIGH     | evict `high_ratio` LRU   | flushed         | swept           | 1             |
/// | CRITICAL | flushed                  | flushed         | pressure sweep  | 2             |
pub struct MemoryPressureHandler {
    structural: Arc<dyn IEvictable>,
    reflection: Arc<dyn IEvictable>,
    tracker: Arc<dyn IReferenceTracker>,
    medium_ratio: f64,
    high_ratio: f64,
    release_hook: Option<ReleaseHook>,
    medium_events: AtomicU64,
    high_events: AtomicU64,
    critical_events: AtomicU64,
    relief_events: AtomicU64,
    entries_evicted: AtomicU64,
    release_hints: AtomicU64,
}

impl MemoryPressureHandler {
    pub fn new(
        structural: Arc<dyn IEvictable>,
        reflection: Arc<dyn IEvictable>,
        tracker: Arc<dyn IReferenceTracker>,
        config: &MonitoringConfig,
    ) -> Self {
        Self {
            structural,
            reflection,
            tracker,
            medium_ratio: config.medium_eviction_ratio.clamp(0.0, 1.0),
            high_ratio: config.high_eviction_ratio.clamp(0.0, 1.0),
            release_hook: None,
            medium_events: AtomicU64::new(0),
            high_events: AtomicU64::new(0),
            critical_events: AtomicU64::new(0),
            relief_events: AtomicU64::new(0),
            entries_evicted: AtomicU64::new(0),
            release_hints: AtomicU64::new(0),
        }
    }

    pub fn with_release_hook(mut self, hook: ReleaseHook) -> Self {
        self.release_hook = Some(hook);
        self
    }

    /// Apply the response for `level`. Returns the number of entries removed.
    pub fn handle(&self, level: PressureLevel) -> usize {
        let removed = match level {
            PressureLevel::Low => 0,
            PressureLevel::Medium => {
                self.medium_events.fetch_add(1, Ordering::Relaxed);
                self.evict_share(self.medium_ratio)
            }
            PressureLevel::High => {
                self.high_events.fetch_add(1, Ordering::Relaxed);
                let removed = self.evict_share(self.high_ratio)
                    + self.reflection.evict_all()
                    + self.tracker.cleanup();
                self.release_hint();
                removed
            }
            PressureLevel::Critical => {
                self.critical_events.fetch_add(1, Ordering::Relaxed);
                let removed = self.structural.evict_all()
                    + self.reflection.evict_all()
                    + self.tracker.trigger_memory_pressure_cleanup();
                self.release_hint();
                self.release_hint();
                removed
            }
        };

        self.entries_evicted
            .fetch_add(removed as u64, Ordering::Relaxed);
        if level > PressureLevel::Low {
            info!(level = %level, removed, "memory pressure handled");
            events::cache_statistics(&self.structural.statistics());
            events::cache_statistics(&self.reflection.statistics());
        }
        removed
    }

    pub fn statistics(&self) -> HandlerStatistics {
        HandlerStatistics {
            medium_events: self.medium_events.load(Ordering::Relaxed),
            high_events: self.high_events.load(Ordering::Relaxed),
            critical_events: self.critical_events.load(Ordering::Relaxed),
            relief_events: self.relief_events.load(Ordering::Relaxed),
            entries_evicted: self.entries_evicted.load(Ordering::Relaxed),
            release_hints: self.release_hints.load(Ordering::Relaxed),
        }
    }

    /// Evict `ceil(size * share)` least recently used structural entries.
    fn evict_share(&self, share: f64) -> usize {
        let size = self.structural.size();
        if size == 0 || share <= 0.0 {
            return 0;
        }
        let count = ((size as f64) * share).ceil() as usize;
        self.structural.evict_least_recently_used(count.min(size))
    }

    fn release_hint(&self) {
        self.release_hints.fetch_add(1, Ordering::Relaxed);
        if let Some(hook) = &self.release_hook {
            hook();
        }
    }
}

impl IMemoryPressureListener for MemoryPressureHandler {
    fn on_memory_pressure(&self, _snapshot: &MemoryUsageSnapshot, level: PressureLevel) {
        self.handle(level);
    }

    fn on_memory_pressure_relieved(&self, snapshot: &MemoryUsageSnapshot) {
        self.relief_events.fetch_add(1, Ordering::Relaxed);
        info!(ratio = snapshot.pressure_ratio(), "memory pressure relieved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictrans_cache::{CacheManager, WeakReferenceTracker};
    use dictrans_core::models::CacheStatistics;

    struct Managed(CacheManager<u32>);

    impl Managed {
        fn with_entries(n: usize) -> Arc<Self> {
            let cache = CacheManager::new("test", 1_000, None);
            for i in 0..n {
                cache.put(format!("k{i}"), i as u32);
            }
            Arc::new(Self(cache))
        }
    }

    impl IEvictable for Managed {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn evict_least_recently_used(&self, count: usize) -> usize {
            self.0.evict_least_recently_used(count)
        }
        fn evict_all(&self) -> usize {
            self.0.evict_all()
        }
        fn statistics(&self) -> CacheStatistics {
            self.0.statistics()
        }
        fn size(&self) -> usize {
            self.0.len()
        }
    }

    fn handler(
        structural: &Arc<Managed>,
        reflection: &Arc<Managed>,
    ) -> (MemoryPressureHandler, Arc<WeakReferenceTracker>) {
        let tracker = Arc::new(WeakReferenceTracker::new());
        let handler = MemoryPressureHandler::new(
            structural.clone(),
            reflection.clone(),
            tracker.clone(),
            &MonitoringConfig::default(),
        );
        (handler, tracker)
    }

    #[test]
    fn medium_evicts_a_quarter_rounded_up() {
        let structural = Managed::with_entries(10);
        let reflection = Managed::with_entries(5);
        let (handler, _) = handler(&structural, &reflection);
        assert_eq!(handler.handle(PressureLevel::Medium), 3);
        assert_eq!(structural.size(), 7);
        assert_eq!(reflection.size(), 5);
        assert_eq!(handler.statistics().release_hints, 0);
    }

    #[test]
    fn high_halves_structural_and_flushes_reflection() {
        let structural = Managed::with_entries(10);
        let reflection = Managed::with_entries(5);
        let (handler, _) = handler(&structural, &reflection);
        handler.handle(PressureLevel::High);
        assert_eq!(structural.size(), 5);
        assert_eq!(reflection.size(), 0);
        assert_eq!(handler.statistics().release_hints, 1);
    }

    #[test]
    fn critical_flushes_everything() {
        let structural = Managed::with_entries(10);
        let reflection = Managed::with_entries(5);
        let (handler, tracker) = handler(&structural, &reflection);
        tracker.track("x", &Arc::new(1u8));

        assert_eq!(handler.handle(PressureLevel::Critical), 16);
        assert_eq!(structural.size(), 0);
        assert_eq!(tracker.statistics().pressure_cleanups, 1);
        let stats = handler.statistics();
        assert_eq!(stats.critical_events, 1);
        assert_eq!(stats.release_hints, 2);
        assert_eq!(stats.entries_evicted, 16);
    }

    #[test]
    fn release_hook_runs_per_hint() {
        let structural = Managed::with_entries(1);
        let reflection = Managed::with_entries(1);
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let (handler, _) = handler(&structural, &reflection);
        let handler = handler.with_release_hook(Arc::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
        handler.handle(PressureLevel::High);
        handler.handle(PressureLevel::Critical);
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn relief_is_counted() {
        let structural = Managed::with_entries(0);
        let reflection = Managed::with_entries(0);
        let (handler, _) = handler(&structural, &reflection);
        handler.on_memory_pressure_relieved(&MemoryUsageSnapshot::new(1, 10, 0, 0));
        assert_eq!(handler.statistics().relief_events, 1);
        assert_eq!(handler.handle(PressureLevel::Low), 0);
    }
}
