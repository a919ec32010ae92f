use crate::errors::DictTransResult;
use crate::models::MemoryUsageSnapshot;

/// Source of memory usage samples for the monitor.
pub trait IMemorySource: Send + Sync {
    fn sample(&self) -> DictTransResult<MemoryUsageSnapshot>;

    /// Human-readable source name.
    fn name(&self) -> &str;
}
