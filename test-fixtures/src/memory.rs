use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use dictrans_core::errors::MonitorError;
use dictrans_core::models::{MemoryUsageSnapshot, PressureLevel};
use dictrans_core::traits::{IMemoryPressureListener, IMemorySource};
use dictrans_core::DictTransResult;

/// Pool size reported by [`ScriptedMemorySource`].
pub const SCRIPTED_HEAP_MAX: u64 = 1_000;

/// Memory source that replays a list of usage ratios, then repeats the last.
pub struct ScriptedMemorySource {
    ratios: Mutex<VecDeque<f64>>,
    last: Mutex<f64>,
    fail_next: AtomicBool,
}

impl ScriptedMemorySource {
    pub fn new(ratios: &[f64]) -> Self {
        Self {
            ratios: Mutex::new(ratios.iter().copied().collect()),
            last: Mutex::new(0.0),
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn push(&self, ratio: f64) {
        self.ratios
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(ratio);
    }

    /// Make the next sample fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl IMemorySource for ScriptedMemorySource {
    fn sample(&self) -> DictTransResult<MemoryUsageSnapshot> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(MonitorError::SamplingFailed {
                reason: "scripted failure".to_string(),
            }
            .into());
        }
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = self
            .ratios
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            *last = next;
        }
        let used = (*last * SCRIPTED_HEAP_MAX as f64).round() as u64;
        Ok(MemoryUsageSnapshot::new(used, SCRIPTED_HEAP_MAX, 0, 0))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Listener that records every notification.
#[derive(Default)]
pub struct RecordingListener {
    levels: Mutex<Vec<PressureLevel>>,
    reliefs: AtomicUsize,
}

impl RecordingListener {
    pub fn pressure_levels(&self) -> Vec<PressureLevel> {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn relief_count(&self) -> usize {
        self.reliefs.load(Ordering::SeqCst)
    }
}

impl IMemoryPressureListener for RecordingListener {
    fn on_memory_pressure(&self, _snapshot: &MemoryUsageSnapshot, level: PressureLevel) {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(level);
    }

    fn on_memory_pressure_relieved(&self, _snapshot: &MemoryUsageSnapshot) {
        self.reliefs.fetch_add(1, Ordering::SeqCst);
    }
}
