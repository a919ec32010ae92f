/// Failures reported by the external dictionary backing store.
#[derive(Debug, thiserror::Error)]
pub enum BackingStoreError {
    #[error("dictionary lookup failed for {dict_code}: {reason}")]
    DictLookupFailed { dict_code: String, reason: String },

    #[error("table lookup failed for {table}({code_column} -> {name_column}): {reason}")]
    TableLookupFailed {
        table: String,
        code_column: String,
        name_column: String,
        reason: String,
    },

    #[error("backing store unavailable: {reason}")]
    Unavailable { reason: String },
}
