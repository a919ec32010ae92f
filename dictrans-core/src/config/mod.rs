//! Configuration for every subsystem.
//!
//! # Examples
//!
//! ```
//! use dictrans_core::config::DictTransConfig;
//!
//! let config = DictTransConfig::from_toml("[processing]\nmax_depth = 4\n").unwrap();
//! assert_eq!(config.processing.max_depth, 4);
//! assert_eq!(config.structural_cache.max_size, 1_000);
//! ```

mod cache_config;
pub mod defaults;
mod monitoring_config;
mod processing_config;

pub use cache_config::{ReflectionCacheConfig, StructuralCacheConfig};
pub use monitoring_config::MonitoringConfig;
pub use processing_config::{CircuitBreakerConfig, ProcessingConfig};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{DictTransError, DictTransResult};

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DictTransConfig {
    pub structural_cache: StructuralCacheConfig,
    pub reflection_cache: ReflectionCacheConfig,
    pub processing: ProcessingConfig,
    pub monitoring: MonitoringConfig,
}

impl DictTransConfig {
    /// Parse a TOML document. Missing sections and keys keep their defaults.
    pub fn from_toml(source: &str) -> DictTransResult<Self> {
        toml::from_str(source).map_err(|e| DictTransError::ConfigError(e.to_string()))
    }

    /// Replace invalid values with safe defaults, logging each correction.
    pub fn validated(mut self) -> Self {
        if self.structural_cache.max_size == 0 {
            warn!(
                section = "structural_cache",
                value = self.structural_cache.max_size,
                default = defaults::DEFAULT_STRUCTURAL_CACHE_MAX_SIZE,
                "invalid max_size, using default"
            );
            self.structural_cache.max_size = defaults::DEFAULT_STRUCTURAL_CACHE_MAX_SIZE;
        }
        if self.reflection_cache.max_size == 0 {
            warn!(
                section = "reflection_cache",
                value = self.reflection_cache.max_size,
                default = defaults::DEFAULT_REFLECTION_CACHE_MAX_SIZE,
                "invalid max_size, using default"
            );
            self.reflection_cache.max_size = defaults::DEFAULT_REFLECTION_CACHE_MAX_SIZE;
        }

        let processing = &mut self.processing;
        if processing.max_depth == 0 {
            warn!(default = defaults::DEFAULT_MAX_DEPTH, "invalid max_depth 0, using default");
            processing.max_depth = defaults::DEFAULT_MAX_DEPTH;
        }
        if processing.max_collection_size == 0 {
            warn!(
                default = defaults::DEFAULT_MAX_COLLECTION_SIZE,
                "invalid max_collection_size 0, using default"
            );
            processing.max_collection_size = defaults::DEFAULT_MAX_COLLECTION_SIZE;
        }
        if processing.default_delimiter.is_empty() {
            warn!(
                default = defaults::DEFAULT_DELIMITER,
                "empty default_delimiter, using default"
            );
            processing.default_delimiter = defaults::DEFAULT_DELIMITER.to_string();
        }

        let breaker = &mut processing.circuit_breaker;
        if breaker.sliding_window_size == 0 {
            warn!(
                default = defaults::DEFAULT_CIRCUIT_SLIDING_WINDOW_SIZE,
                "invalid sliding_window_size 0, using default"
            );
            breaker.sliding_window_size = defaults::DEFAULT_CIRCUIT_SLIDING_WINDOW_SIZE;
        }
        if breaker.failure_threshold == 0 || breaker.failure_threshold > breaker.sliding_window_size {
            warn!(
                value = breaker.failure_threshold,
                window = breaker.sliding_window_size,
                "failure_threshold outside 1..=sliding_window_size, using default"
            );
            breaker.failure_threshold = defaults::DEFAULT_CIRCUIT_FAILURE_THRESHOLD
                .min(breaker.sliding_window_size);
        }
        if breaker.success_threshold == 0 {
            warn!(
                default = defaults::DEFAULT_CIRCUIT_SUCCESS_THRESHOLD,
                "invalid success_threshold 0, using default"
            );
            breaker.success_threshold = defaults::DEFAULT_CIRCUIT_SUCCESS_THRESHOLD;
        }

        let monitoring = &mut self.monitoring;
        if monitoring.interval_ms == 0 {
            warn!(
                default = defaults::DEFAULT_MONITORING_INTERVAL_MS,
                "invalid interval_ms 0, using default"
            );
            monitoring.interval_ms = defaults::DEFAULT_MONITORING_INTERVAL_MS;
        }
        if monitoring.history_size == 0 {
            warn!(
                default = defaults::DEFAULT_HISTORY_SIZE,
                "invalid history_size 0, using default"
            );
            monitoring.history_size = defaults::DEFAULT_HISTORY_SIZE;
        }
        if !monitoring.thresholds_are_ordered() {
            warn!(
                medium = monitoring.medium_threshold,
                high = monitoring.high_threshold,
                critical = monitoring.critical_threshold,
                "pressure thresholds out of range or unordered, using defaults"
            );
            monitoring.medium_threshold = defaults::DEFAULT_MEDIUM_THRESHOLD;
            monitoring.high_threshold = defaults::DEFAULT_HIGH_THRESHOLD;
            monitoring.critical_threshold = defaults::DEFAULT_CRITICAL_THRESHOLD;
        }
        if !(0.0..=1.0).contains(&monitoring.medium_eviction_ratio) {
            warn!(
                value = monitoring.medium_eviction_ratio,
                "invalid medium_eviction_ratio, using default"
            );
            monitoring.medium_eviction_ratio = defaults::DEFAULT_MEDIUM_EVICTION_RATIO;
        }
        if !(0.0..=1.0).contains(&monitoring.high_eviction_ratio) {
            warn!(
                value = monitoring.high_eviction_ratio,
                "invalid high_eviction_ratio, using default"
            );
            monitoring.high_eviction_ratio = defaults::DEFAULT_HIGH_EVICTION_RATIO;
        }
        if monitoring.shutdown_timeout_ms == 0 {
            warn!(
                default = defaults::DEFAULT_SHUTDOWN_TIMEOUT_MS,
                "invalid shutdown_timeout_ms 0, using default"
            );
            monitoring.shutdown_timeout_ms = defaults::DEFAULT_SHUTDOWN_TIMEOUT_MS;
        }

        self
    }
}
