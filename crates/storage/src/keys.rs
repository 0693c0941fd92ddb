// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authoritative state-store key layout.
//!
//! Every key written by the platform is built here so the layout can be
//! audited in one place. Operators grep the store by these patterns;
//! changing a format is a breaking deployment change.

use sweep_core::{JobId, Platform};

/// Ordered set of job ids by score (priority or enqueue time).
pub fn platform_queue(platform: &Platform) -> String {
    format!("workflow:queue:platform:{platform}")
}

/// Hash with field `data` holding the serialized job.
pub fn job(job_id: &JobId) -> String {
    format!("workflow:job:{job_id}")
}

/// Platform mutual-exclusion lock string.
pub fn platform_lock(platform: &Platform) -> String {
    format!("workflow:lock:platform:{platform}")
}

/// Currently-running job record for a platform.
pub fn running_job(platform: &Platform) -> String {
    format!("workflow:running:platform:{platform}")
}

/// Short-TTL flag asking the platform's worker to exit.
pub fn kill_flag(platform: &Platform) -> String {
    format!("worker:kill:{platform}")
}

/// Epoch-ms of the scheduler's most recent enqueue (global pacing).
pub const SCHEDULER_LAST_ENQUEUE_AT: &str = "scheduler:last_enqueue_at";

/// Per-platform `{on_sale_counter, last_completed_at}` JSON.
pub fn scheduler_platform_state(platform: &Platform) -> String {
    format!("scheduler:state:{platform}")
}

pub const SCHEDULER_ENABLED: &str = "scheduler:enabled";
pub const SCHEDULER_STATUS: &str = "scheduler:status";
pub const SCHEDULER_JOBS_TOTAL: &str = "scheduler:jobs_scheduled_total";

pub const WATCHER_ENABLED: &str = "alert_watcher:enabled";
pub const WATCHER_STATUS: &str = "alert_watcher:status";
pub const WATCHER_EXECUTED_TOTAL: &str = "alert_watcher:executed_total";

/// Epoch-ms a monitor task last completed.
pub fn watcher_task_completed_at(task_id: &str) -> String {
    format!("alert_watcher:task:{task_id}:completed_at")
}

/// Fixed-window outbound request counter for a platform.
pub fn rate_window(platform: &Platform, window_index: u64) -> String {
    format!("ratelimit:{platform}:{window_index}")
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
