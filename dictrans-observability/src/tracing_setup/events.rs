//! Structured log events for key operations.
//!
//! Each function emits a `tracing` event with an `event` name and typed fields.

use dictrans_core::models::{
    CacheStatistics, CircuitState, MemoryUsageSnapshot, PressureLevel, TranslationReport,
};

/// Log a single cache lookup or mutation.
pub fn cache_operation(cache: &str, operation: &str, key: &str, hit: bool) {
    tracing::debug!(
        event = "cache_operation",
        cache = %cache,
        operation = %operation,
        key = %key,
        hit = hit,
        "cache operation"
    );
}

/// Log a cache statistics snapshot.
pub fn cache_statistics(stats: &CacheStatistics) {
    tracing::info!(
        event = "cache_statistics",
        cache = %stats.name,
        hits = stats.hit_count,
        misses = stats.miss_count,
        hit_rate = stats.hit_rate,
        evictions = stats.eviction_count,
        size = stats.size,
        max_size = stats.max_size,
        "cache statistics"
    );
}

/// Log a bulk eviction.
pub fn cache_cleared(cache: &str, removed: usize, reason: &str) {
    tracing::info!(
        event = "cache_cleared",
        cache = %cache,
        removed = removed,
        reason = %reason,
        "cache cleared"
    );
}

/// Log a memory sample.
pub fn memory_usage_sampled(snapshot: &MemoryUsageSnapshot, level: PressureLevel) {
    tracing::debug!(
        event = "memory_usage_sampled",
        heap_used = snapshot.heap_used,
        heap_max = snapshot.heap_max,
        heap_ratio = snapshot.heap_ratio(),
        off_heap_ratio = snapshot.off_heap_ratio(),
        level = %level,
        "memory usage sampled"
    );
}

/// Log an upward pressure transition.
pub fn pressure_level_changed(from: PressureLevel, to: PressureLevel, ratio: f64) {
    tracing::warn!(
        event = "pressure_level_changed",
        from = %from,
        to = %to,
        ratio = ratio,
        "memory pressure level changed"
    );
}

/// Log leaving HIGH or CRITICAL.
pub fn pressure_relieved(from: PressureLevel, to: PressureLevel, ratio: f64) {
    tracing::info!(
        event = "pressure_relieved",
        from = %from,
        to = %to,
        ratio = ratio,
        "memory pressure relieved"
    );
}

/// Log a lifecycle event (start, stop, shutdown).
pub fn system_event(kind: &str, detail: &str) {
    tracing::info!(
        event = "system_event",
        kind = %kind,
        detail = %detail,
        "system event"
    );
}

/// Log a field skipped because its directive is invalid.
pub fn directive_skipped(type_name: &str, field: &str, reason: &str) {
    tracing::warn!(
        event = "directive_skipped",
        type_name = %type_name,
        field = %field,
        reason = %reason,
        "directive skipped"
    );
}

/// Log a setter that rejected a translated value.
pub fn write_back_failed(type_name: &str, field: &str, reason: &str) {
    tracing::warn!(
        event = "write_back_failed",
        type_name = %type_name,
        field = %field,
        reason = %reason,
        "write-back failed"
    );
}

/// Log a depth or collection-size limit being hit.
pub fn processing_limit_hit(type_name: &str, limit: &str, value: usize, max: usize) {
    tracing::warn!(
        event = "processing_limit_hit",
        type_name = %type_name,
        limit = %limit,
        value = value,
        max = max,
        "processing limit hit"
    );
}

/// Log a whole translation call held back by a limit.
pub fn translation_refused(limit: &str, reason: &str) {
    tracing::warn!(
        event = "translation_refused",
        limit = %limit,
        reason = %reason,
        "translation refused"
    );
}

/// Log a circuit breaker transition.
pub fn circuit_state_changed(from: CircuitState, to: CircuitState) {
    tracing::warn!(
        event = "circuit_state_changed",
        from = %from,
        to = %to,
        "circuit breaker state changed"
    );
}

/// Log the outcome of a translation call.
pub fn translation_completed(report: &TranslationReport, elapsed_ms: u64) {
    tracing::info!(
        event = "translation_completed",
        direction = ?report.direction,
        occurrences = report.occurrences,
        groups = report.groups,
        backing_store_calls = report.backing_store_calls,
        fields_written = report.fields_written,
        warnings = report.warnings.len(),
        elapsed_ms = elapsed_ms,
        "translation completed"
    );
}
