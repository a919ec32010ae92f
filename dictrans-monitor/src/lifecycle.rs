//! Startup and teardown of memory management.

use std::sync::Arc;

use dictrans_core::traits::{IEvictable, IMemorySource, IReferenceTracker};
use dictrans_core::{DictTransConfig, DictTransResult};
use dictrans_observability::events;
use tracing::{info, warn};

use crate::{MemoryMonitor, MemoryPressureHandler};

/// Wires a monitor, its pressure handler and the caches together.
pub struct MemoryManagementLifecycle {
    monitor: Arc<MemoryMonitor>,
    handler: Arc<MemoryPressureHandler>,
    structural: Arc<dyn IEvictable>,
    reflection: Arc<dyn IEvictable>,
    tracker: Arc<dyn IReferenceTracker>,
    enabled: bool,
}

impl MemoryManagementLifecycle {
    pub fn new(
        source: Arc<dyn IMemorySource>,
        config: &DictTransConfig,
        structural: Arc<dyn IEvictable>,
        reflection: Arc<dyn IEvictable>,
        tracker: Arc<dyn IReferenceTracker>,
    ) -> Self {
        let handler = Arc::new(MemoryPressureHandler::new(
            Arc::clone(&structural),
            Arc::clone(&reflection),
            Arc::clone(&tracker),
            &config.monitoring,
        ));
        let monitor = MemoryMonitor::new(source, config.monitoring.clone()).with_cleanup_targets(
            Arc::clone(&structural),
            Arc::clone(&reflection),
            Arc::clone(&tracker),
        );
        monitor.add_listener(handler.clone());

        Self {
            monitor: Arc::new(monitor),
            handler,
            structural,
            reflection,
            tracker,
            enabled: config.monitoring.enabled,
        }
    }

    pub fn monitor(&self) -> &Arc<MemoryMonitor> {
        &self.monitor
    }

    pub fn handler(&self) -> &Arc<MemoryPressureHandler> {
        &self.handler
    }

    /// Start sampling (when enabled) and hand back the guard that owns
    /// shutdown. Dropping the guard shuts everything down.
    pub fn start(self) -> DictTransResult<LifecycleGuard> {
        if self.enabled {
            self.monitor.start()?;
        } else {
            info!("memory monitoring disabled; caches run without pressure handling");
        }
        events::system_event(
            "memory_management_started",
            &format!("monitoring={}", self.enabled),
        );
        Ok(LifecycleGuard {
            inner: Some(self),
        })
    }
}

/// Owns a started [`MemoryManagementLifecycle`].
pub struct LifecycleGuard {
    inner: Option<MemoryManagementLifecycle>,
}

impl LifecycleGuard {
    pub fn monitor(&self) -> Option<&Arc<MemoryMonitor>> {
        self.inner.as_ref().map(|l| &l.monitor)
    }

    pub fn handler(&self) -> Option<&Arc<MemoryPressureHandler>> {
        self.inner.as_ref().map(|l| &l.handler)
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.is_none()
    }

    /// Stop the monitor, report final cache statistics, then release every
    /// cache entry and tracked reference. Later calls do nothing.
    pub fn shutdown(&mut self) {
        let Some(lifecycle) = self.inner.take() else {
            return;
        };

        if let Err(err) = lifecycle.monitor.stop() {
            warn!(error = %err, "memory monitor did not stop cleanly");
        }

        events::cache_statistics(&lifecycle.structural.statistics());
        events::cache_statistics(&lifecycle.reflection.statistics());
        let monitoring = lifecycle.monitor.statistics();
        info!(
            checks = monitoring.total_checks,
            failed = monitoring.failed_checks,
            pressure_events = monitoring.pressure_events,
            "final monitoring statistics"
        );

        let removed = lifecycle.structural.evict_all() + lifecycle.reflection.evict_all();
        lifecycle.tracker.clear();
        events::system_event(
            "memory_management_stopped",
            &format!("entries_released={removed}"),
        );
    }
}

impl Drop for LifecycleGuard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictrans_cache::{ReflectionCache, StructuralCache, WeakReferenceTracker};
    use dictrans_core::PressureLevel;
    use test_fixtures::{schema_of, ScriptedMemorySource, User};

    struct Parts {
        structural: Arc<StructuralCache>,
        reflection: Arc<ReflectionCache>,
        tracker: Arc<WeakReferenceTracker>,
    }

    fn lifecycle(ratios: &[f64], config: DictTransConfig) -> (MemoryManagementLifecycle, Parts) {
        let tracker = Arc::new(WeakReferenceTracker::new());
        let structural = Arc::new(
            StructuralCache::new(&config.structural_cache).with_tracker(tracker.clone()),
        );
        let reflection = Arc::new(ReflectionCache::new(&config.reflection_cache));
        let lifecycle = MemoryManagementLifecycle::new(
            Arc::new(ScriptedMemorySource::new(ratios)),
            &config,
            structural.clone(),
            reflection.clone(),
            tracker.clone(),
        );
        (
            lifecycle,
            Parts {
                structural,
                reflection,
                tracker,
            },
        )
    }

    #[test]
    fn shutdown_flushes_caches_and_tracker() {
        let (lifecycle, parts) = lifecycle(&[0.1], DictTransConfig::default());
        parts
            .structural
            .get_or_build("User", schema_of::<User>)
            .unwrap();
        parts.reflection.field_index("User", "status", || Some(0));
        assert_eq!(parts.tracker.len(), 1);

        let mut guard = lifecycle.start().unwrap();
        assert!(guard.monitor().is_some_and(|m| m.is_running()));
        guard.shutdown();
        assert!(guard.is_shut_down());
        assert_eq!(parts.structural.size(), 0);
        assert_eq!(parts.reflection.size(), 0);
        assert!(parts.tracker.is_empty());
        guard.shutdown();
    }

    #[test]
    fn disabled_monitoring_does_not_spawn() {
        let mut config = DictTransConfig::default();
        config.monitoring.enabled = false;
        let (lifecycle, _parts) = lifecycle(&[0.1], config);
        let guard = lifecycle.start().unwrap();
        assert!(guard.monitor().is_some_and(|m| !m.is_running()));
    }

    #[test]
    fn handler_is_registered_with_the_monitor() {
        let (lifecycle, parts) = lifecycle(&[0.97], DictTransConfig::default());
        parts
            .structural
            .get_or_build("User", schema_of::<User>)
            .unwrap();
        assert_eq!(lifecycle.monitor().listener_count(), 1);
        assert_eq!(lifecycle.monitor().check_now().unwrap(), PressureLevel::Critical);
        assert_eq!(lifecycle.handler().statistics().critical_events, 1);
        assert_eq!(parts.structural.size(), 0);
    }

    #[test]
    fn manual_cleanup_counts() {
        let (lifecycle, parts) = lifecycle(&[0.1], DictTransConfig::default());
        parts.reflection.field_index("User", "status", || Some(0));
        assert_eq!(lifecycle.monitor().trigger_cleanup(), 1);
        let stats = lifecycle.monitor().statistics();
        assert_eq!(stats.cleanups_triggered, 1);
        assert!(stats.last_cleanup_at.is_some());
    }
}
