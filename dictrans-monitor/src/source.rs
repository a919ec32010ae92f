//! Memory sources backed by the operating system.

use std::sync::{Mutex, PoisonError};

use dictrans_core::errors::MonitorError;
use dictrans_core::models::MemoryUsageSnapshot;
use dictrans_core::traits::IMemorySource;
use dictrans_core::DictTransResult;
use sysinfo::{get_current_pid, Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Samples this process through `sysinfo`.
///
/// "Heap" is the process resident set against the configured limit, or total
/// physical memory when no limit is set. "Off-heap" is system swap.
pub struct SystemMemorySource {
    system: Mutex<System>,
    pid: Option<Pid>,
    limit_bytes: Option<u64>,
}

impl SystemMemorySource {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: get_current_pid().ok(),
            limit_bytes: None,
        }
    }

    /// Measure against a fixed budget instead of total physical memory.
    pub fn with_limit(limit_bytes: u64) -> Self {
        Self {
            limit_bytes: Some(limit_bytes),
            ..Self::new()
        }
    }
}

impl Default for SystemMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl IMemorySource for SystemMemorySource {
    fn sample(&self) -> DictTransResult<MemoryUsageSnapshot> {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_memory();

        let process_memory = self.pid.and_then(|pid| {
            let targets = [pid];
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&targets),
                false,
                ProcessRefreshKind::nothing().with_memory(),
            );
            system.process(pid).map(|process| process.memory())
        });
        let used = process_memory.unwrap_or_else(|| system.used_memory());

        let max = self.limit_bytes.unwrap_or_else(|| system.total_memory());
        if max == 0 {
            return Err(MonitorError::SamplingFailed {
                reason: "total memory reported as zero".to_string(),
            }
            .into());
        }

        Ok(MemoryUsageSnapshot::new(
            used,
            max,
            system.used_swap(),
            system.total_swap(),
        ))
    }

    fn name(&self) -> &str {
        "system"
    }
}
