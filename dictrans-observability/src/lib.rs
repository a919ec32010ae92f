//! # dictrans-observability
//!
//! Tracing setup, structured log events, and span macros shared by every
//! crate in the workspace.

pub mod tracing_setup;

pub use tracing_setup::{events, init_tracing, init_tracing_with_filter};
