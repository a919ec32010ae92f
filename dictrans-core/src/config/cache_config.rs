use serde::{Deserialize, Serialize};

use super::defaults;

/// Structural (accessor) cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralCacheConfig {
    /// Maximum number of accessor tables kept.
    pub max_size: u64,
    /// Entries idle longer than this are treated as misses (seconds, 0 = never).
    pub expire_after_access_secs: u64,
    /// How long a failed accessor build is remembered before retrying (seconds).
    pub failed_build_retry_secs: u64,
}

impl Default for StructuralCacheConfig {
    fn default() -> Self {
        Self {
            max_size: defaults::DEFAULT_STRUCTURAL_CACHE_MAX_SIZE,
            expire_after_access_secs: defaults::DEFAULT_STRUCTURAL_EXPIRE_AFTER_ACCESS_SECS,
            failed_build_retry_secs: defaults::DEFAULT_FAILED_BUILD_RETRY_SECS,
        }
    }
}

/// Reflective-metadata (directive) cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionCacheConfig {
    /// Maximum number of entries kept (directive tables and field lookups).
    pub max_size: u64,
    /// Entries idle longer than this are treated as misses (seconds, 0 = never).
    pub expire_after_access_secs: u64,
}

impl Default for ReflectionCacheConfig {
    fn default() -> Self {
        Self {
            max_size: defaults::DEFAULT_REFLECTION_CACHE_MAX_SIZE,
            expire_after_access_secs: defaults::DEFAULT_REFLECTION_EXPIRE_AFTER_ACCESS_SECS,
        }
    }
}
