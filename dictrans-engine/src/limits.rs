//! Processing limits applied around each translation call.
//!
//! - a memory-pressure gate consulted before anything is classified;
//! - a sliding-window circuit breaker around the backing store;
//! - a wall-clock budget checked between groups;
//! - the collection-size decision used by the classifier.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use dictrans_core::config::{CircuitBreakerConfig, ProcessingConfig};
use dictrans_core::models::{CircuitState, PressureLevel, ProcessingStatistics};
use dictrans_core::traits::IPressureGate;
use dictrans_observability::events;
use tracing::{debug, info, warn};

/// What a limit check asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingAction {
    Continue,
    /// Process only the first `max_collection_size` elements.
    Batch,
    /// Leave the input untouched.
    Skip,
    /// Stop and report an error.
    Abort,
    /// The circuit is open; leave the input untouched.
    RetryLater,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitDecision {
    pub action: ProcessingAction,
    pub reason: String,
}

impl LimitDecision {
    fn allow() -> Self {
        Self {
            action: ProcessingAction::Continue,
            reason: String::new(),
        }
    }

    fn deny(action: ProcessingAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
        }
    }

    pub fn allowed(&self) -> bool {
        self.action == ProcessingAction::Continue
    }
}

/// Decide how to treat a collection of `size` elements.
///
/// Up to `max` is processed whole, up to twice `max` is truncated, anything
/// larger is skipped.
pub fn collection_action(size: usize, max: usize) -> ProcessingAction {
    if size <= max {
        ProcessingAction::Continue
    } else if size <= max.saturating_mul(2) {
        ProcessingAction::Batch
    } else {
        ProcessingAction::Skip
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct BreakerState {
    state: CircuitState,
    /// Most recent outcomes, `true` for a failure.
    window: VecDeque<bool>,
    consecutive_successes: usize,
    last_failure: Option<Instant>,
}

/// Sliding-window circuit breaker.
///
/// Opens once at least `minimum_throughput` outcomes are recorded and the
/// failure rate in the window reaches `failure_threshold / sliding_window_size`.
/// After `open_timeout_ms` without a failure one call is let through in
/// HALF_OPEN; `success_threshold` successes close it, any failure reopens it.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                window: VecDeque::new(),
                consecutive_successes: 0,
                last_failure: None,
            }),
        }
    }

    pub fn state(&self) -> CircuitState {
        lock(&self.inner).state
    }

    pub fn allow_execution(&self) -> bool {
        let mut inner = lock(&self.inner);
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let timeout = Duration::from_millis(self.config.open_timeout_ms);
                let elapsed = inner.last_failure.map_or(Duration::MAX, |at| at.elapsed());
                if elapsed >= timeout {
                    transition(&mut inner, CircuitState::HalfOpen);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = lock(&self.inner);
        self.push(&mut inner, false);
        match inner.state {
            CircuitState::HalfOpen => {
                inner.consecutive_successes += 1;
                if inner.consecutive_successes >= self.config.success_threshold {
                    transition(&mut inner, CircuitState::Closed);
                }
            }
            CircuitState::Closed | CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = lock(&self.inner);
        inner.last_failure = Some(Instant::now());
        self.push(&mut inner, true);
        match inner.state {
            CircuitState::Closed if self.should_open(&inner) => {
                transition(&mut inner, CircuitState::Open);
            }
            CircuitState::HalfOpen => transition(&mut inner, CircuitState::Open),
            _ => {}
        }
    }

    /// Close the circuit and forget recorded outcomes.
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        inner.window.clear();
        inner.last_failure = None;
        transition(&mut inner, CircuitState::Closed);
    }

    pub fn force_open(&self) {
        let mut inner = lock(&self.inner);
        inner.last_failure = Some(Instant::now());
        transition(&mut inner, CircuitState::Open);
    }

    fn push(&self, inner: &mut BreakerState, failed: bool) {
        inner.window.push_back(failed);
        while inner.window.len() > self.config.sliding_window_size {
            inner.window.pop_front();
        }
    }

    fn should_open(&self, inner: &BreakerState) -> bool {
        if inner.window.len() < self.config.minimum_throughput {
            return false;
        }
        let window = self.config.sliding_window_size.max(1);
        let failures = inner.window.iter().filter(|failed| **failed).count();
        let rate = failures as f64 / inner.window.len().min(window) as f64;
        rate >= self.config.failure_threshold as f64 / window as f64
    }
}

fn transition(inner: &mut BreakerState, to: CircuitState) {
    let from = inner.state;
    if from == to {
        return;
    }
    inner.state = to;
    inner.consecutive_successes = 0;
    events::circuit_state_changed(from, to);
}

#[derive(Default)]
struct Counters {
    total: u64,
    successful: u64,
    failed: u64,
    skipped: u64,
    memory_pressure_events: u64,
    circuit_breaker_trips: u64,
    durations_ms: VecDeque<u64>,
}

/// Applies the processing limits and keeps call statistics.
pub struct ProcessingLimitManager {
    config: ProcessingConfig,
    breaker: CircuitBreaker,
    gate: Option<Arc<dyn IPressureGate>>,
    history: usize,
    counters: Mutex<Counters>,
}

impl ProcessingLimitManager {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            breaker: CircuitBreaker::new(config.circuit_breaker.clone()),
            config: config.clone(),
            gate: None,
            history: dictrans_core::config::defaults::DEFAULT_PROCESSING_TIME_HISTORY,
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn set_pressure_gate(&mut self, gate: Arc<dyn IPressureGate>) {
        self.gate = Some(gate);
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// HIGH skips the call, CRITICAL aborts it. Without a gate every call passes.
    pub fn check_memory_pressure(&self) -> LimitDecision {
        let Some(gate) = &self.gate else {
            return LimitDecision::allow();
        };
        let level = gate.current_level();
        let action = match level {
            PressureLevel::Critical => ProcessingAction::Abort,
            PressureLevel::High => ProcessingAction::Skip,
            PressureLevel::Low | PressureLevel::Medium => return LimitDecision::allow(),
        };
        lock(&self.counters).memory_pressure_events += 1;
        warn!(level = %level, "memory pressure gate refused translation");
        LimitDecision::deny(action, format!("memory pressure {level}"))
    }

    pub fn check_circuit(&self) -> LimitDecision {
        if !self.config.enable_circuit_breaker || self.breaker.allow_execution() {
            return LimitDecision::allow();
        }
        lock(&self.counters).circuit_breaker_trips += 1;
        LimitDecision::deny(ProcessingAction::RetryLater, "circuit breaker is open")
    }

    /// Point in time after which the call is aborted, if a budget is set.
    pub fn deadline(&self, started: Instant) -> Option<Instant> {
        (self.config.timeout_ms > 0).then(|| started + Duration::from_millis(self.config.timeout_ms))
    }

    pub fn check_time(&self, started: Instant) -> LimitDecision {
        match self.deadline(started) {
            Some(deadline) if Instant::now() >= deadline => LimitDecision::deny(
                ProcessingAction::Abort,
                format!("exceeded timeout of {} ms", self.config.timeout_ms),
            ),
            _ => LimitDecision::allow(),
        }
    }

    pub fn record_success(&self, elapsed: Duration) {
        {
            let mut counters = lock(&self.counters);
            counters.total += 1;
            counters.successful += 1;
            counters.durations_ms.push_back(elapsed.as_millis() as u64);
            while counters.durations_ms.len() > self.history {
                counters.durations_ms.pop_front();
            }
        }
        if self.config.enable_circuit_breaker {
            self.breaker.record_success();
        }
    }

    pub fn record_failure(&self, reason: &str) {
        {
            let mut counters = lock(&self.counters);
            counters.total += 1;
            counters.failed += 1;
        }
        debug!(reason = %reason, "translation call failed");
        if self.config.enable_circuit_breaker {
            self.breaker.record_failure();
        }
    }

    /// Count calls or collections held back by a limit.
    pub fn record_limited(&self, count: usize) {
        if count > 0 {
            lock(&self.counters).skipped += count as u64;
        }
    }

    pub fn statistics(&self) -> ProcessingStatistics {
        let counters = lock(&self.counters);
        let average_processing_ms = if counters.durations_ms.is_empty() {
            0.0
        } else {
            counters.durations_ms.iter().sum::<u64>() as f64 / counters.durations_ms.len() as f64
        };
        ProcessingStatistics {
            total_processed: counters.total,
            successful_processed: counters.successful,
            failed_processed: counters.failed,
            skipped_due_to_limits: counters.skipped,
            memory_pressure_events: counters.memory_pressure_events,
            circuit_breaker_trips: counters.circuit_breaker_trips,
            average_processing_ms,
            circuit_state: self.breaker.state(),
        }
    }

    /// Zero the counters and close the circuit.
    pub fn reset(&self) {
        *lock(&self.counters) = Counters::default();
        self.breaker.reset();
        info!("processing limits reset");
    }
}
