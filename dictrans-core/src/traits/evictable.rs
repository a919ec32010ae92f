use crate::models::CacheStatistics;

/// A cache the pressure handler can shrink.
pub trait IEvictable: Send + Sync {
    fn name(&self) -> &str;

    /// Evict up to `count` least-recently-used entries. Returns how many
    /// were removed.
    fn evict_least_recently_used(&self, count: usize) -> usize;

    /// Drop every entry. Returns how many were removed.
    fn evict_all(&self) -> usize;

    fn statistics(&self) -> CacheStatistics;

    fn size(&self) -> usize;
}
