use super::{BackingStoreError, CacheError, DirectiveError, MonitorError};

/// Top-level error for every fallible operation in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum DictTransError {
    #[error("backing store error: {0}")]
    BackingStoreError(#[from] BackingStoreError),

    #[error("directive error: {0}")]
    DirectiveError(#[from] DirectiveError),

    #[error("cache error: {0}")]
    CacheError(#[from] CacheError),

    #[error("monitor error: {0}")]
    MonitorError(#[from] MonitorError),

    #[error("processing aborted: {0}")]
    ProcessingAborted(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type DictTransResult<T> = Result<T, DictTransError>;
