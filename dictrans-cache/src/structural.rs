//! Structural accessor cache.

use std::sync::Arc;
use std::time::Duration;

use dictrans_core::config::StructuralCacheConfig;
use dictrans_core::errors::CacheError;
use dictrans_core::models::CacheStatistics;
use dictrans_core::traits::IEvictable;
use dictrans_core::TypeSchema;
use dictrans_observability::events;
use moka::sync::Cache;
use tracing::{debug, warn};

use crate::{CacheManager, WeakReferenceTracker};

pub const STRUCTURAL_CACHE_NAME: &str = "structural";

/// Per-type accessor registries, keyed by the type's stable name.
///
/// A failed build is remembered for `failed_build_retry_secs`; lookups in
/// that window fail fast instead of rebuilding.
pub struct StructuralCache {
    entries: CacheManager<Arc<TypeSchema>>,
    failures: Cache<String, String>,
    retry_after: Duration,
    tracker: Option<Arc<WeakReferenceTracker>>,
}

impl StructuralCache {
    pub fn new(config: &StructuralCacheConfig) -> Self {
        let idle = (config.expire_after_access_secs > 0)
            .then(|| Duration::from_secs(config.expire_after_access_secs));
        let retry_after = Duration::from_secs(config.failed_build_retry_secs);
        let failures = Cache::builder()
            .max_capacity(config.max_size)
            .time_to_live(retry_after)
            .build();

        Self {
            entries: CacheManager::new(STRUCTURAL_CACHE_NAME, config.max_size as usize, idle),
            failures,
            retry_after,
            tracker: None,
        }
    }

    /// Register every newly built schema with `tracker`.
    pub fn with_tracker(mut self, tracker: Arc<WeakReferenceTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Return the accessor registry for `type_name`, building it on a miss.
    pub fn get_or_build<F>(&self, type_name: &str, build: F) -> Result<Arc<TypeSchema>, CacheError>
    where
        F: FnOnce() -> TypeSchema,
    {
        if let Some(schema) = self.entries.get(type_name) {
            return Ok(schema);
        }

        if self.failures.contains_key(type_name) {
            return Err(CacheError::RecentBuildFailure {
                key: type_name.to_string(),
                retry_in_secs: self.retry_after.as_secs(),
            });
        }

        let schema = build();
        if let Err(reason) = schema.validate() {
            warn!(key = %type_name, reason = %reason, "accessor build failed");
            self.failures.insert(type_name.to_string(), reason.clone());
            return Err(CacheError::BuildFailed {
                key: type_name.to_string(),
                reason,
            });
        }

        debug!(key = %type_name, signature = %schema.signature(), "accessor built");
        let weight = schema.fields().len().max(1);
        let schema = Arc::new(schema);
        if let Some(tracker) = &self.tracker {
            tracker.track(type_name, &schema);
        }
        self.entries.put_weighted(type_name, Arc::clone(&schema), weight);
        Ok(schema)
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<TypeSchema>> {
        self.entries.get(type_name)
    }

    /// Whether a build for `type_name` failed within the retry window.
    pub fn has_recent_failure(&self, type_name: &str) -> bool {
        self.failures.contains_key(type_name)
    }

    pub fn invalidate(&self, type_name: &str) -> bool {
        self.failures.invalidate(type_name);
        self.entries.remove(type_name).is_some()
    }

    pub fn max_size(&self) -> usize {
        self.entries.max_size()
    }
}

impl IEvictable for StructuralCache {
    fn name(&self) -> &str {
        STRUCTURAL_CACHE_NAME
    }

    fn evict_least_recently_used(&self, count: usize) -> usize {
        let removed = self.entries.evict_least_recently_used(count);
        events::cache_cleared(STRUCTURAL_CACHE_NAME, removed, "lru");
        removed
    }

    fn evict_all(&self) -> usize {
        self.failures.invalidate_all();
        let removed = self.entries.evict_all();
        events::cache_cleared(STRUCTURAL_CACHE_NAME, removed, "evict_all");
        removed
    }

    fn statistics(&self) -> CacheStatistics {
        self.entries.statistics()
    }

    fn size(&self) -> usize {
        self.entries.len()
    }
}
