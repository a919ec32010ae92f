use serde::{Deserialize, Serialize};

use super::defaults;

/// Limits applied while walking object graphs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum nesting depth below a root object. Roots are depth 0.
    pub max_depth: usize,
    /// Collections up to twice this size are truncated to it; larger ones
    /// are not descended into.
    pub max_collection_size: usize,
    /// Delimiter for multi-value fields when the annotation names none.
    pub default_delimiter: String,
    /// Wall-clock budget for one translation call. `0` disables the check.
    pub timeout_ms: u64,
    pub enable_circuit_breaker: bool,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_depth: defaults::DEFAULT_MAX_DEPTH,
            max_collection_size: defaults::DEFAULT_MAX_COLLECTION_SIZE,
            default_delimiter: defaults::DEFAULT_DELIMITER.to_string(),
            timeout_ms: defaults::DEFAULT_PROCESSING_TIMEOUT_MS,
            enable_circuit_breaker: defaults::DEFAULT_CIRCUIT_BREAKER_ENABLED,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Sliding-window circuit breaker around the backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failures within the window that open the circuit.
    pub failure_threshold: usize,
    /// Consecutive half-open successes that close it again.
    pub success_threshold: usize,
    /// Time spent open before a trial call is let through.
    pub open_timeout_ms: u64,
    pub sliding_window_size: usize,
    /// Calls recorded before the failure rate is considered at all.
    pub minimum_throughput: usize,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: defaults::DEFAULT_CIRCUIT_FAILURE_THRESHOLD,
            success_threshold: defaults::DEFAULT_CIRCUIT_SUCCESS_THRESHOLD,
            open_timeout_ms: defaults::DEFAULT_CIRCUIT_OPEN_TIMEOUT_MS,
            sliding_window_size: defaults::DEFAULT_CIRCUIT_SLIDING_WINDOW_SIZE,
            minimum_throughput: defaults::DEFAULT_CIRCUIT_MINIMUM_THROUGHPUT,
        }
    }
}
