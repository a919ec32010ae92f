use serde::{Deserialize, Serialize};

/// Which way a translation call maps values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Code to label.
    Code2Name,
    /// Label to code.
    Name2Code,
}

/// Why a field was not (fully) translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The annotation was incomplete or contradictory.
    InvalidDirective,
    /// Depth or collection-size limit reached.
    ProcessingLimit,
    /// The setter rejected the translated value or the field is read-only.
    WriteFailed,
    /// An expression directive was found but no evaluator is configured,
    /// or the evaluator failed.
    ExpressionUnavailable,
}

/// A structured per-field warning collected during one translation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub type_name: String,
    pub field: String,
    pub kind: WarningKind,
    pub message: String,
}

impl FieldWarning {
    pub fn new(
        type_name: impl Into<String>,
        field: impl Into<String>,
        kind: WarningKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of one `code2name` / `name2code` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationReport {
    pub direction: Direction,
    /// Directive occurrences found by the classifier.
    pub occurrences: usize,
    /// Classification groups planned.
    pub groups: usize,
    /// Batched calls issued to the backing store.
    pub backing_store_calls: usize,
    /// Fields actually overwritten.
    pub fields_written: usize,
    pub warnings: Vec<FieldWarning>,
}

impl TranslationReport {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            occurrences: 0,
            groups: 0,
            backing_store_calls: 0,
            fields_written: 0,
            warnings: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings of one kind.
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &FieldWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}
