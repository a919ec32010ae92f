use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PressureLevel;

/// Aggregate counters and rolling averages of the memory monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringStatistics {
    pub started_at: Option<DateTime<Utc>>,
    pub total_checks: u64,
    pub failed_checks: u64,
    pub pressure_events: u64,
    pub cleanups_triggered: u64,
    pub average_heap_ratio: f64,
    pub average_off_heap_ratio: f64,
    pub peak_heap_ratio: f64,
    pub peak_off_heap_ratio: f64,
    pub last_cleanup_at: Option<DateTime<Utc>>,
    pub current_level: PressureLevel,
}
