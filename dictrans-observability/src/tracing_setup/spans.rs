//! Span definitions for translation calls and memory checks.

/// Create a translation span.
#[macro_export]
macro_rules! translation_span {
    ($direction:expr, $roots:expr) => {
        tracing::info_span!("dictrans.translation", direction = ?$direction, roots = $roots)
    };
}

/// Create a memory check span.
#[macro_export]
macro_rules! memory_check_span {
    ($source:expr) => {
        tracing::debug_span!("dictrans.memory_check", source = %$source)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const TRANSLATION: &str = "dictrans.translation";
    pub const MEMORY_CHECK: &str = "dictrans.memory_check";
}
