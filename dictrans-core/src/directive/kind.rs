use serde::{Deserialize, Serialize};

/// What a directive translates against. Exactly one per directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectiveKind {
    /// A built-in enumeration identified by its dictionary code.
    SystemDict { dict_code: String },
    /// An arbitrary lookup table.
    TableDict {
        table: String,
        code_column: String,
        name_column: String,
        /// Opaque filter clause handed through to the backing store owner.
        condition: Option<String>,
    },
    /// An opaque expression evaluated by a collaborator.
    Expression { expression: String },
}

/// Classification of one field occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationKind {
    SystemDictSingle,
    SystemDictMulti,
    TableDictSingle,
    TableDictMulti,
    Expression,
}

impl ClassificationKind {
    pub fn is_multi(self) -> bool {
        matches!(self, Self::SystemDictMulti | Self::TableDictMulti)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SystemDictSingle => "system-dict-single",
            Self::SystemDictMulti => "system-dict-multi",
            Self::TableDictSingle => "table-dict-single",
            Self::TableDictMulti => "table-dict-multi",
            Self::Expression => "expression",
        }
    }
}

/// Immutable per-field descriptor, extracted once per declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranslationDirective {
    /// Field holding the raw value.
    pub source_field: String,
    /// Field receiving the translated value. Equal to `source_field` unless
    /// `ignore_original` is set.
    pub target_field: String,
    /// Separator for multi-value fields.
    pub delimiter: String,
    /// Write to a separate target field instead of overwriting the source.
    pub ignore_original: bool,
    pub kind: DirectiveKind,
}

impl TranslationDirective {
    /// Classify an occurrence by its raw value.
    ///
    /// A raw value containing the delimiter is multi-valued; expressions are
    /// never split.
    pub fn classify(&self, raw: &str) -> ClassificationKind {
        let multi = raw.contains(self.delimiter.as_str());
        match (&self.kind, multi) {
            (DirectiveKind::SystemDict { .. }, false) => ClassificationKind::SystemDictSingle,
            (DirectiveKind::SystemDict { .. }, true) => ClassificationKind::SystemDictMulti,
            (DirectiveKind::TableDict { .. }, false) => ClassificationKind::TableDictSingle,
            (DirectiveKind::TableDict { .. }, true) => ClassificationKind::TableDictMulti,
            (DirectiveKind::Expression { .. }, _) => ClassificationKind::Expression,
        }
    }

    pub fn writes_separate_field(&self) -> bool {
        self.source_field != self.target_field
    }
}
