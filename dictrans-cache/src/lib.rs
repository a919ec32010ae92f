//! # dictrans-cache
//!
//! Two cache tiers sit in front of accessor construction:
//!
//! - [`StructuralCache`]: per-type [`TypeSchema`](dictrans_core::TypeSchema)
//!   accessors. Expensive to build, long-lived, partially evicted under pressure.
//! - [`ReflectionCache`]: extracted directives and field lookups. Cheap to
//!   rebuild and flushed first.
//!
//! Both are keyed by stable type-name strings, never by live type handles.
//! [`WeakReferenceTracker`] watches the accessor registries handed out so
//! that evicted entries can be accounted for once their last user drops them.

mod manager;
mod reflection;
mod structural;
mod tracker;

pub use manager::CacheManager;
pub use reflection::{ReflectionCache, TypeDirectives};
pub use structural::StructuralCache;
pub use tracker::WeakReferenceTracker;
