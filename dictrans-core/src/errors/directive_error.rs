/// Directive extraction and validation errors.
///
/// These never abort a translation call; the classifier turns them into
/// per-field warnings and skips the field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("{type_name}.{field}: missing required attribute `{attribute}`")]
    MissingAttribute {
        type_name: String,
        field: String,
        attribute: &'static str,
    },

    #[error("{type_name}.{field}: annotation names neither a dictionary, a table, nor an expression")]
    Unclassifiable { type_name: String, field: String },

    #[error("{type_name}.{field}: target field `{target}` does not exist")]
    UnknownTarget {
        type_name: String,
        field: String,
        target: String,
    },

    #[error("{type_name}.{field}: delimiter must not be empty")]
    EmptyDelimiter { type_name: String, field: String },
}
