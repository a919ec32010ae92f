/// Memory monitor errors.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("memory sampling failed: {reason}")]
    SamplingFailed { reason: String },

    #[error("failed to spawn sampler thread: {reason}")]
    SpawnFailed { reason: String },

    #[error("sampler did not stop within {timeout_ms}ms")]
    ShutdownTimeout { timeout_ms: u64 },
}
