use serde::{Deserialize, Serialize};

use super::defaults;

/// Memory monitor and pressure handler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Start the background sampler when the lifecycle starts.
    pub enabled: bool,
    /// Sampling interval in milliseconds.
    pub interval_ms: u64,
    /// Number of samples kept in the rolling history.
    pub history_size: usize,
    /// Usage ratio at which pressure becomes MEDIUM.
    pub medium_threshold: f64,
    /// Usage ratio at which pressure becomes HIGH.
    pub high_threshold: f64,
    /// Usage ratio at which pressure becomes CRITICAL.
    pub critical_threshold: f64,
    /// Share of the structural cache evicted on entering MEDIUM.
    pub medium_eviction_ratio: f64,
    /// Share of the structural cache evicted on entering HIGH.
    pub high_eviction_ratio: f64,
    /// Upper bound on waiting for the sampler thread at shutdown (milliseconds).
    pub shutdown_timeout_ms: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_MONITORING_ENABLED,
            interval_ms: defaults::DEFAULT_MONITORING_INTERVAL_MS,
            history_size: defaults::DEFAULT_HISTORY_SIZE,
            medium_threshold: defaults::DEFAULT_MEDIUM_THRESHOLD,
            high_threshold: defaults::DEFAULT_HIGH_THRESHOLD,
            critical_threshold: defaults::DEFAULT_CRITICAL_THRESHOLD,
            medium_eviction_ratio: defaults::DEFAULT_MEDIUM_EVICTION_RATIO,
            high_eviction_ratio: defaults::DEFAULT_HIGH_EVICTION_RATIO,
            shutdown_timeout_ms: defaults::DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }
}

impl MonitoringConfig {
    /// Whether the three thresholds are inside `0..=1` and strictly increasing.
    pub fn thresholds_are_ordered(&self) -> bool {
        let in_range = |t: f64| (0.0..=1.0).contains(&t);
        in_range(self.medium_threshold)
            && in_range(self.high_threshold)
            && in_range(self.critical_threshold)
            && self.medium_threshold < self.high_threshold
            && self.high_threshold < self.critical_threshold
    }
}
