mod backing_store_error;
mod cache_error;
mod directive_error;
mod monitor_error;
mod trans_error;

pub use backing_store_error::BackingStoreError;
pub use cache_error::CacheError;
pub use directive_error::DirectiveError;
pub use monitor_error::MonitorError;
pub use trans_error::{DictTransError, DictTransResult};
