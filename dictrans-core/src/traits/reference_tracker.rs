use crate::models::TrackingStatistics;

/// Tracker of weakly-held objects that can be swept on demand.
pub trait IReferenceTracker: Send + Sync {
    /// Drop entries whose referent is gone. Returns how many were removed.
    fn cleanup(&self) -> usize;

    /// Aggressive sweep run under memory pressure.
    fn trigger_memory_pressure_cleanup(&self) -> usize;

    fn statistics(&self) -> TrackingStatistics;

    fn clear(&self);
}
