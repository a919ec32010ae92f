// Single source of truth for all default values.

// --- Structural cache ---
pub const DEFAULT_STRUCTURAL_CACHE_MAX_SIZE: u64 = 1_000;
pub const DEFAULT_STRUCTURAL_EXPIRE_AFTER_ACCESS_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_FAILED_BUILD_RETRY_SECS: u64 = 60;

// --- Reflective-metadata cache ---
pub const DEFAULT_REFLECTION_CACHE_MAX_SIZE: u64 = 500;
pub const DEFAULT_REFLECTION_EXPIRE_AFTER_ACCESS_SECS: u64 = 1_800; // 30 minutes

// --- Processing ---
pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_MAX_COLLECTION_SIZE: usize = 1_000;
pub const DEFAULT_DELIMITER: &str = crate::constants::DEFAULT_DELIMITER;
pub const DEFAULT_PROCESSING_TIMEOUT_MS: u64 = 30_000; // 30 seconds
pub const DEFAULT_CIRCUIT_BREAKER_ENABLED: bool = true;
pub const DEFAULT_PROCESSING_TIME_HISTORY: usize = 100;

// --- Circuit breaker ---
pub const DEFAULT_CIRCUIT_FAILURE_THRESHOLD: usize = 5;
pub const DEFAULT_CIRCUIT_SUCCESS_THRESHOLD: usize = 3;
pub const DEFAULT_CIRCUIT_OPEN_TIMEOUT_MS: u64 = 120_000; // 2 minutes
pub const DEFAULT_CIRCUIT_SLIDING_WINDOW_SIZE: usize = 20;
pub const DEFAULT_CIRCUIT_MINIMUM_THROUGHPUT: usize = 10;

// --- Monitoring ---
pub const DEFAULT_MONITORING_ENABLED: bool = true;
pub const DEFAULT_MONITORING_INTERVAL_MS: u64 = 60_000; // 1 minute
pub const DEFAULT_HISTORY_SIZE: usize = 100;
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 0.70;
pub const DEFAULT_HIGH_THRESHOLD: f64 = 0.85;
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 0.95;
pub const DEFAULT_MEDIUM_EVICTION_RATIO: f64 = 0.25;
pub const DEFAULT_HIGH_EVICTION_RATIO: f64 = 0.50;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5_000;
