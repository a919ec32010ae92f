use serde::{Deserialize, Serialize};

/// State of the backing-store circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Calls flow normally.
    Closed,
    /// Calls are refused until the open timeout elapses.
    Open,
    /// Trial calls are let through; one failure reopens.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Counters kept by the processing limit manager across translation calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStatistics {
    pub total_processed: u64,
    pub successful_processed: u64,
    pub failed_processed: u64,
    /// Calls or collections skipped, truncated or refused by a limit.
    pub skipped_due_to_limits: u64,
    pub memory_pressure_events: u64,
    pub circuit_breaker_trips: u64,
    /// Mean duration of the most recent calls, in milliseconds.
    pub average_processing_ms: f64,
    pub circuit_state: CircuitState,
}
