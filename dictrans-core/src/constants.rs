/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Suffix appended to the source field name when a directive writes its label
/// to a separate field and no alias is given.
pub const DICT_TEXT_SUFFIX: &str = "Text";

/// Default delimiter for multi-value fields.
pub const DEFAULT_DELIMITER: &str = ",";

/// Separator between a type name and a member name in cache keys.
pub const CACHE_KEY_SEPARATOR: char = '#';

/// Joiner used when a batch of keys is handed to the backing store.
pub const BATCH_KEY_JOINER: &str = ",";
