//! Memory monitor: periodic sampling and the pressure level state machine.
//!
//! Transitions:
//! - moving up into MEDIUM, HIGH or CRITICAL fires `on_memory_pressure` once
//!   for the new level;
//! - dropping from HIGH/CRITICAL to MEDIUM/LOW fires
//!   `on_memory_pressure_relieved` once;
//! - any other move (CRITICAL to HIGH, MEDIUM to LOW) is recorded silently.
//!
//! Every sample also sweeps released references from the tracker, whatever
//! the level.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dictrans_core::config::MonitoringConfig;
use dictrans_core::errors::MonitorError;
use dictrans_core::models::{MemoryUsageSnapshot, MonitoringStatistics, PressureLevel};
use dictrans_core::traits::{
    IEvictable, IMemoryPressureListener, IMemorySource, IPressureGate, IReferenceTracker,
};
use dictrans_core::DictTransResult;
use dictrans_observability::{events, memory_check_span};
use tracing::{debug, info, warn};

/// Entries evicted from the structural cache by a manual cleanup.
pub const MANUAL_CLEANUP_LRU_COUNT: usize = 10;

const SAMPLER_THREAD_NAME: &str = "dictrans-memory-monitor";

#[derive(Default)]
struct Counters {
    started_at: Option<DateTime<Utc>>,
    total_checks: u64,
    failed_checks: u64,
    pressure_events: u64,
    cleanups_triggered: u64,
    heap_ratio_sum: f64,
    off_heap_ratio_sum: f64,
    peak_heap_ratio: f64,
    peak_off_heap_ratio: f64,
    last_cleanup_at: Option<DateTime<Utc>>,
    level: Option<PressureLevel>,
}

struct CleanupTargets {
    structural: Arc<dyn IEvictable>,
    reflection: Arc<dyn IEvictable>,
    tracker: Arc<dyn IReferenceTracker>,
}

struct MonitorState {
    source: Arc<dyn IMemorySource>,
    config: MonitoringConfig,
    listeners: RwLock<Vec<Arc<dyn IMemoryPressureListener>>>,
    history: Mutex<VecDeque<MemoryUsageSnapshot>>,
    counters: Mutex<Counters>,
    swept: RwLock<Option<Arc<dyn IReferenceTracker>>>,
}

struct Sampler {
    stop_tx: mpsc::Sender<()>,
    done_rx: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

/// Samples an [`IMemorySource`] and drives the pressure state machine.
pub struct MemoryMonitor {
    state: Arc<MonitorState>,
    cleanup: Option<CleanupTargets>,
    running: AtomicBool,
    sampler: Mutex<Option<Sampler>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryMonitor {
    pub fn new(source: Arc<dyn IMemorySource>, config: MonitoringConfig) -> Self {
        Self {
            state: Arc::new(MonitorState {
                source,
                config,
                listeners: RwLock::new(Vec::new()),
                history: Mutex::new(VecDeque::new()),
                counters: Mutex::new(Counters::default()),
                swept: RwLock::new(None),
            }),
            cleanup: None,
            running: AtomicBool::new(false),
            sampler: Mutex::new(None),
        }
    }

    /// Caches and tracker swept by [`trigger_cleanup`](Self::trigger_cleanup).
    /// The tracker is also swept on every sample.
    pub fn with_cleanup_targets(
        mut self,
        structural: Arc<dyn IEvictable>,
        reflection: Arc<dyn IEvictable>,
        tracker: Arc<dyn IReferenceTracker>,
    ) -> Self {
        *self
            .state
            .swept
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&tracker));
        self.cleanup = Some(CleanupTargets {
            structural,
            reflection,
            tracker,
        });
        self
    }

    pub fn add_listener(&self, listener: Arc<dyn IMemoryPressureListener>) {
        self.state
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.state
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.state.config
    }

    /// Start the background sampler. A no-op when already running.
    pub fn start(&self) -> DictTransResult<()> {
        let mut sampler = lock(&self.sampler);
        if sampler.is_some() {
            return Ok(());
        }

        let state = Arc::clone(&self.state);
        let interval = Duration::from_millis(self.state.config.interval_ms);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name(SAMPLER_THREAD_NAME.to_string())
            .spawn(move || {
                while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(interval) {
                    // Failures are logged and counted inside; keep sampling.
                    let _ = state.tick();
                }
                let _ = done_tx.send(());
            })
            .map_err(|e| MonitorError::SpawnFailed {
                reason: e.to_string(),
            })?;

        lock(&self.state.counters).started_at = Some(Utc::now());
        self.running.store(true, Ordering::SeqCst);
        *sampler = Some(Sampler {
            stop_tx,
            done_rx,
            handle,
        });

        events::system_event(
            "monitor_started",
            &format!("source={} interval_ms={}", self.state.source.name(), interval.as_millis()),
        );
        Ok(())
    }

    /// Stop the sampler and wait for it within the configured timeout.
    ///
    /// Must not be called from a listener: the sampler would wait on itself
    /// until the timeout expires.
    pub fn stop(&self) -> DictTransResult<()> {
        let Some(sampler) = lock(&self.sampler).take() else {
            return Ok(());
        };
        self.running.store(false, Ordering::SeqCst);
        let _ = sampler.stop_tx.send(());

        let timeout_ms = self.state.config.shutdown_timeout_ms;
        match sampler.done_rx.recv_timeout(Duration::from_millis(timeout_ms)) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if sampler.handle.join().is_err() {
                    warn!("memory sampler thread panicked");
                }
                events::system_event("monitor_stopped", "sampler joined");
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout_ms, "memory sampler did not stop in time, detaching");
                Err(MonitorError::ShutdownTimeout { timeout_ms }.into())
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Take one sample now, on the caller's thread.
    pub fn check_now(&self) -> DictTransResult<PressureLevel> {
        self.state.tick()
    }

    /// Level after the most recent successful sample, LOW before any.
    pub fn current_level(&self) -> PressureLevel {
        lock(&self.state.counters).level.unwrap_or(PressureLevel::Low)
    }

    /// HIGH or CRITICAL.
    pub fn is_memory_pressure_high(&self) -> bool {
        self.current_level().is_elevated()
    }

    /// Samples oldest first, at most `history_size` of them.
    pub fn history(&self) -> Vec<MemoryUsageSnapshot> {
        lock(&self.state.history).iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<MemoryUsageSnapshot> {
        lock(&self.state.history).back().cloned()
    }

    /// Manual cleanup: trim the structural cache, flush the reflective cache
    /// and sweep weak references. Returns the number of entries removed.
    pub fn trigger_cleanup(&self) -> usize {
        let Some(targets) = &self.cleanup else {
            debug!("cleanup requested without cleanup targets");
            return 0;
        };
        let removed = targets
            .structural
            .evict_least_recently_used(MANUAL_CLEANUP_LRU_COUNT)
            + targets.reflection.evict_all()
            + targets.tracker.cleanup();

        let mut counters = lock(&self.state.counters);
        counters.cleanups_triggered += 1;
        counters.last_cleanup_at = Some(Utc::now());
        info!(removed, "manual memory cleanup");
        removed
    }

    pub fn statistics(&self) -> MonitoringStatistics {
        let counters = lock(&self.state.counters);
        let successful = counters.total_checks.saturating_sub(counters.failed_checks);
        let average = |sum: f64| {
            if successful == 0 {
                0.0
            } else {
                sum / successful as f64
            }
        };
        MonitoringStatistics {
            started_at: counters.started_at,
            total_checks: counters.total_checks,
            failed_checks: counters.failed_checks,
            pressure_events: counters.pressure_events,
            cleanups_triggered: counters.cleanups_triggered,
            average_heap_ratio: average(counters.heap_ratio_sum),
            average_off_heap_ratio: average(counters.off_heap_ratio_sum),
            peak_heap_ratio: counters.peak_heap_ratio,
            peak_off_heap_ratio: counters.peak_off_heap_ratio,
            last_cleanup_at: counters.last_cleanup_at,
            current_level: counters.level.unwrap_or(PressureLevel::Low),
        }
    }
}

impl IPressureGate for MemoryMonitor {
    fn current_level(&self) -> PressureLevel {
        MemoryMonitor::current_level(self)
    }
}

impl Drop for MemoryMonitor {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

impl MonitorState {
    fn tick(&self) -> DictTransResult<PressureLevel> {
        let span = memory_check_span!(self.source.name());
        let _guard = span.enter();

        let snapshot = match self.source.sample() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                let mut counters = lock(&self.counters);
                counters.total_checks += 1;
                counters.failed_checks += 1;
                warn!(error = %err, "memory sampling failed");
                return Err(err);
            }
        };

        let ratio = snapshot.pressure_ratio();
        let level = PressureLevel::from_config(ratio, &self.config);

        let previous = {
            let mut counters = lock(&self.counters);
            counters.total_checks += 1;
            counters.heap_ratio_sum += snapshot.heap_ratio();
            counters.off_heap_ratio_sum += snapshot.off_heap_ratio();
            counters.peak_heap_ratio = counters.peak_heap_ratio.max(snapshot.heap_ratio());
            counters.peak_off_heap_ratio = counters.peak_off_heap_ratio.max(snapshot.off_heap_ratio());
            let previous = counters.level.replace(level).unwrap_or(PressureLevel::Low);
            if level > previous {
                counters.pressure_events += 1;
            }
            previous
        };

        {
            let mut history = lock(&self.history);
            history.push_back(snapshot.clone());
            while history.len() > self.config.history_size {
                history.pop_front();
            }
        }

        events::memory_usage_sampled(&snapshot, level);

        let swept = self
            .swept
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(tracker) = swept {
            tracker.cleanup();
        }

        if level > previous {
            events::pressure_level_changed(previous, level, ratio);
            for listener in self.listeners() {
                listener.on_memory_pressure(&snapshot, level);
            }
        } else if previous.is_elevated() && !level.is_elevated() {
            events::pressure_relieved(previous, level, ratio);
            for listener in self.listeners() {
                listener.on_memory_pressure_relieved(&snapshot);
            }
        }

        Ok(level)
    }

    /// Snapshot of the listener list so callbacks run without the lock held.
    fn listeners(&self) -> Vec<Arc<dyn IMemoryPressureListener>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
