//! Process memory query for budgeted contractions

use sysinfo::System;

/// Resident memory of the current process in MB, `None` when the platform
/// does not report it.
pub fn current_memory_mb() -> Option<f64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut sys = System::new();
    sys.refresh_process(pid);
    sys.process(pid).map(|process| process.memory() as f64 / 1e6)
}

/// Memory still available under `max_memory` MB, never negative.
///
/// An unknown usage counts as zero, so the ceiling itself is the budget.
pub fn available_memory_mb(max_memory: f64) -> f64 {
    (max_memory - current_memory_mb().unwrap_or(0.0)).max(0.0)
}
