use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One memory sample. Produced once per sampling tick and never mutated.
///
/// "Heap" is the primary pool the process allocates from; "off-heap" is the
/// secondary pool (swap, mapped regions, or whatever the source reports).
/// A max of zero means the pool is unbounded or unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsageSnapshot {
    pub heap_used: u64,
    pub heap_max: u64,
    pub off_heap_used: u64,
    pub off_heap_max: u64,
    pub gc_count: u64,
    pub gc_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl MemoryUsageSnapshot {
    /// Snapshot with the given pool usage, stamped now.
    pub fn new(heap_used: u64, heap_max: u64, off_heap_used: u64, off_heap_max: u64) -> Self {
        Self {
            heap_used,
            heap_max,
            off_heap_used,
            off_heap_max,
            gc_count: 0,
            gc_time_ms: 0,
            timestamp: Utc::now(),
        }
    }

    /// Heap usage as a fraction of its max, 0.0 when the max is unknown.
    pub fn heap_ratio(&self) -> f64 {
        ratio(self.heap_used, self.heap_max)
    }

    /// Off-heap usage as a fraction of its max, 0.0 when the max is unknown.
    pub fn off_heap_ratio(&self) -> f64 {
        ratio(self.off_heap_used, self.off_heap_max)
    }

    /// The larger of the two ratios. Pressure is classified against this.
    pub fn pressure_ratio(&self) -> f64 {
        self.heap_ratio().max(self.off_heap_ratio())
    }
}

fn ratio(used: u64, max: u64) -> f64 {
    if max == 0 {
        0.0
    } else {
        used as f64 / max as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_ratio_takes_the_larger_pool() {
        let snapshot = MemoryUsageSnapshot::new(50, 100, 90, 100);
        assert!((snapshot.heap_ratio() - 0.5).abs() < f64::EPSILON);
        assert!((snapshot.pressure_ratio() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_max_counts_as_zero_usage() {
        let snapshot = MemoryUsageSnapshot::new(500, 0, 10, 0);
        assert_eq!(snapshot.pressure_ratio(), 0.0);
    }
}
