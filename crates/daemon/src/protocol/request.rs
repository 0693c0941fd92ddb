// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// Admin request to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Aggregate daemon status: scheduler, watcher, queues, running jobs
    Status,

    /// Resume scan scheduling
    SchedulerStart,

    /// Pause scan scheduling
    SchedulerStop,

    /// Scheduler flag, heartbeat, and totals
    SchedulerStatus,

    /// Resume content monitoring
    WatcherStart,

    /// Pause content monitoring
    WatcherStop,

    /// Watcher flag, heartbeat, and totals
    WatcherStatus,

    /// Jobs currently running, with elapsed seconds
    JobsRunning,

    /// Monitor task cooldown states
    MonitorTasks,

    /// Break a stuck platform: fail the running job and free the lock
    ForceRelease { platform: String },

    /// Ask a platform's worker to exit at its next safe point
    WorkerRestart { platform: String },

    /// Drop queued jobs for one platform, or all queues when omitted
    ClearQueue {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform: Option<String>,
    },

    /// Request daemon shutdown
    Shutdown,
}
