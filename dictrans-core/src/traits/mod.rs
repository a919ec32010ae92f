mod evictable;
mod expression;
mod memory_source;
mod pressure_gate;
mod pressure_listener;
mod reference_tracker;
mod trans_api;
mod translatable;

pub use evictable::IEvictable;
pub use expression::IExpressionEvaluator;
pub use memory_source::IMemorySource;
pub use pressure_gate::IPressureGate;
pub use pressure_listener::IMemoryPressureListener;
pub use reference_tracker::IReferenceTracker;
pub use trans_api::ITransApi;
pub use translatable::{Nested, NestedMut, Translatable};
