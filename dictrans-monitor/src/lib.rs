//! # dictrans-monitor
//!
//! Samples memory usage on a background thread, classifies it into a
//! [`PressureLevel`](dictrans_core::PressureLevel), and notifies listeners on
//! level transitions. [`MemoryPressureHandler`] is the listener that shrinks
//! the caches; [`MemoryManagementLifecycle`] wires everything together and
//! tears it down on drop.

pub mod handler;
pub mod lifecycle;
pub mod monitor;
pub mod source;

pub use handler::{HandlerStatistics, MemoryPressureHandler};
pub use lifecycle::{LifecycleGuard, MemoryManagementLifecycle};
pub use monitor::MemoryMonitor;
pub use source::SystemMemorySource;
