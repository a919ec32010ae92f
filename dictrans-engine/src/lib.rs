//! # dictrans-engine
//!
//! Dictionary translation in three passes:
//!
//! 1. [`classifier`]: walk the object graph breadth-first and collect every
//!    annotated field occurrence with its raw value.
//! 2. [`planner`]: group occurrences by dictionary identity so each distinct
//!    dictionary or table is queried once, whatever the number of objects.
//! 3. [`executor`]: issue one batched backing-store call per group and write
//!    the results back.
//!
//! [`TransEngine`] ties the passes to the caches and is the public entry point;
//! [`limits`] holds the circuit breaker, timeout and memory-pressure gate
//! applied around each call.

pub mod classifier;
pub mod engine;
pub mod executor;
pub mod limits;
pub mod planner;

pub use engine::TransEngine;
pub use limits::{CircuitBreaker, ProcessingAction, ProcessingLimitManager};
