use serde::{Deserialize, Serialize};

/// Counters exposed by the weak reference tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStatistics {
    pub total_tracked: u64,
    pub currently_tracked: usize,
    pub cleaned_up: u64,
    pub pressure_cleanups: u64,
}
