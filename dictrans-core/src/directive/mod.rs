//! Translation directives.
//!
//! A [`DictAnnotation`] is the raw attribute bag attached to a field by the
//! code generator. It is extracted once per declaring type into a
//! [`TranslationDirective`], whose [`DirectiveKind`] is a closed sum type so
//! the planner and executor can match on it exhaustively instead of probing
//! attributes at translation time.

mod annotation;
mod kind;

pub use annotation::DictAnnotation;
pub use kind::{ClassificationKind, DirectiveKind, TranslationDirective};
