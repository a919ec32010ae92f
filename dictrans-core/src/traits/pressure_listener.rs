use crate::models::{MemoryUsageSnapshot, PressureLevel};

/// Subscriber to pressure level transitions.
///
/// Called synchronously on the sampling thread. Implementations must not
/// block for long and must not call back into the monitor's `stop`.
pub trait IMemoryPressureListener: Send + Sync {
    /// Fired once per upward transition into `level`.
    fn on_memory_pressure(&self, snapshot: &MemoryUsageSnapshot, level: PressureLevel);

    /// Fired when the level drops out of `High`/`Critical`.
    fn on_memory_pressure_relieved(&self, snapshot: &MemoryUsageSnapshot);
}
