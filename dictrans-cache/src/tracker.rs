//! Weak reference tracker.
//!
//! Records objects handed out by the caches without keeping them alive.
//! Explicit releases go through a queue that the next sweep drains; entries
//! whose referent has been dropped are swept as well.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dictrans_core::models::TrackingStatistics;
use dictrans_core::traits::IReferenceTracker;
use tracing::debug;

struct Tracked {
    owner: String,
    referent: Weak<dyn Any + Send + Sync>,
    tracked_at: DateTime<Utc>,
}

impl Tracked {
    fn is_alive(&self) -> bool {
        self.referent.strong_count() > 0
    }
}

#[derive(Default)]
pub struct WeakReferenceTracker {
    entries: DashMap<u64, Tracked>,
    released: Mutex<Vec<u64>>,
    next_id: AtomicU64,
    total_tracked: AtomicU64,
    cleaned_up: AtomicU64,
    pressure_cleanups: AtomicU64,
}

impl WeakReferenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `referent` under `owner`. Returns a tracking id.
    pub fn track<T>(&self, owner: impl Into<String>, referent: &Arc<T>) -> u64
    where
        T: Any + Send + Sync,
    {
        let weak: Weak<T> = Arc::downgrade(referent);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.insert(
            id,
            Tracked {
                owner: owner.into(),
                referent: weak,
                tracked_at: Utc::now(),
            },
        );
        self.total_tracked.fetch_add(1, Ordering::Relaxed);
        id
    }

    /// Whether `id` is tracked and its referent is still alive.
    pub fn is_tracked(&self, id: u64) -> bool {
        self.entries.get(&id).is_some_and(|t| t.is_alive())
    }

    /// Whether any live referent is tracked under `owner`.
    pub fn is_tracking_owner(&self, owner: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.value().owner == owner && e.value().is_alive())
    }

    /// When `id` started being tracked.
    pub fn tracked_at(&self, id: u64) -> Option<DateTime<Utc>> {
        self.entries.get(&id).map(|t| t.tracked_at)
    }

    /// Queue `id` for removal on the next sweep.
    pub fn release(&self, id: u64) {
        if let Ok(mut queue) = self.released.lock() {
            queue.push(id);
        }
    }

    /// Number of entries, live or not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep(&self) -> usize {
        let queued: Vec<u64> = match self.released.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        };
        let mut removed = queued
            .iter()
            .filter(|id| self.entries.remove(*id).is_some())
            .count();

        let before = self.entries.len();
        self.entries.retain(|_, t| t.is_alive());
        removed += before.saturating_sub(self.entries.len());

        self.cleaned_up.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }
}

impl IReferenceTracker for WeakReferenceTracker {
    fn cleanup(&self) -> usize {
        let removed = self.sweep();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "weak references swept");
        }
        removed
    }

    fn trigger_memory_pressure_cleanup(&self) -> usize {
        let removed = self.sweep();
        self.entries.shrink_to_fit();
        self.pressure_cleanups.fetch_add(1, Ordering::Relaxed);
        debug!(removed, "pressure sweep of weak references");
        removed
    }

    fn statistics(&self) -> TrackingStatistics {
        TrackingStatistics {
            total_tracked: self.total_tracked.load(Ordering::Relaxed),
            currently_tracked: self.entries.len(),
            cleaned_up: self.cleaned_up.load(Ordering::Relaxed),
            pressure_cleanups: self.pressure_cleanups.load(Ordering::Relaxed),
        }
    }

    fn clear(&self) {
        self.entries.clear();
        if let Ok(mut queue) = self.released.lock() {
            queue.clear();
        }
    }
}
