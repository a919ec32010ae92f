//! # dictrans-core
//!
//! Foundation crate for the dictionary translation engine.
//! Defines the directive model, accessor schemas, traits, errors, config,
//! and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod directive;
pub mod errors;
pub mod models;
pub mod schema;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::DictTransConfig;
pub use directive::{ClassificationKind, DictAnnotation, DirectiveKind, TranslationDirective};
pub use errors::{DictTransError, DictTransResult};
pub use models::{
    CacheStatistics, DictModel, Direction, MemoryUsageSnapshot, PressureLevel, TableRow,
    TranslationReport,
};
pub use schema::TypeSchema;
pub use traits::{ITransApi, Translatable};
