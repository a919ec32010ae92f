/// Cache manager errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("accessor build failed for {key}: {reason}")]
    BuildFailed { key: String, reason: String },

    #[error("accessor build for {key} failed recently, retry in {retry_in_secs}s")]
    RecentBuildFailure { key: String, retry_in_secs: u64 },
}
