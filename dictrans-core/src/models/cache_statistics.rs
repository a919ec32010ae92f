use serde::{Deserialize, Serialize};

/// Read-only snapshot of one cache's counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub name: String,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
    pub eviction_count: u64,
    pub size: u64,
    pub max_size: u64,
}

impl CacheStatistics {
    pub fn new(
        name: impl Into<String>,
        hit_count: u64,
        miss_count: u64,
        eviction_count: u64,
        size: u64,
        max_size: u64,
    ) -> Self {
        let requests = hit_count + miss_count;
        let hit_rate = if requests == 0 {
            0.0
        } else {
            hit_count as f64 / requests as f64
        };
        Self {
            name: name.into(),
            hit_count,
            miss_count,
            hit_rate,
            eviction_count,
            size,
            max_size,
        }
    }

    /// Sum two snapshots under a new name (used for multi-table caches).
    pub fn combine(name: impl Into<String>, parts: &[CacheStatistics]) -> Self {
        Self::new(
            name,
            parts.iter().map(|p| p.hit_count).sum(),
            parts.iter().map(|p| p.miss_count).sum(),
            parts.iter().map(|p| p.eviction_count).sum(),
            parts.iter().map(|p| p.size).sum(),
            parts.iter().map(|p| p.max_size).sum(),
        )
    }
}
