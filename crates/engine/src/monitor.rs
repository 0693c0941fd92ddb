// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert-watcher loop: enqueues periodic content-surface checks.
//!
//! Each monitor task gets its own FIFO queue under a pseudo-platform
//! (`monitor-{task}`), consumed by the same worker substrate as the
//! platform queues. A task's `completed_at` is written by the executing
//! node; the loop only reads it for the cooldown check.

use serde_json::Value;
use std::sync::Arc;
use sweep_core::{Clock, JobDraft, MonitorTaskDef, Params, Platform, WatcherSettings};
use sweep_storage::{
    JobQueueRepo, MonitorStateRepo, PlatformLock, QueueDiscipline, StateStore, StoreError,
};
use tokio_util::sync::CancellationToken;

/// Queue/lock pseudo-platform for a monitor task.
pub fn monitor_platform(task_id: &str) -> Platform {
    Platform::new(format!("monitor-{task_id}"))
}

pub struct AlertWatcher<S, C> {
    state: Arc<MonitorStateRepo<S, C>>,
    queue: Arc<JobQueueRepo<S, C>>,
    lock: Arc<PlatformLock<S, C>>,
    tasks: Vec<MonitorTaskDef>,
    settings: WatcherSettings,
    clock: C,
}

impl<S: StateStore, C: Clock> AlertWatcher<S, C> {
    pub fn new(
        state: Arc<MonitorStateRepo<S, C>>,
        queue: Arc<JobQueueRepo<S, C>>,
        lock: Arc<PlatformLock<S, C>>,
        tasks: Vec<MonitorTaskDef>,
        settings: WatcherSettings,
        clock: C,
    ) -> Self {
        Self { state, queue, lock, tasks, settings, clock }
    }

    /// One pass over the task list. Returns the ids of tasks that got a
    /// job enqueued this tick.
    pub async fn tick(&self) -> Result<Vec<String>, StoreError> {
        self.state.heartbeat().await?;

        if !self.state.is_enabled().await? {
            return Ok(Vec::new());
        }

        let mut enqueued = Vec::new();
        for task in &self.tasks {
            if !self.state.cooldown_complete(&task.id, task.interval()).await? {
                continue;
            }

            let platform = monitor_platform(&task.id);
            // A check already queued or running covers this interval;
            // completed_at only moves when the node finishes.
            if self.queue.queue_length(&platform).await? > 0 {
                continue;
            }
            if self.lock.running_job(&platform).await?.is_some() {
                continue;
            }

            let mut params = Params::new();
            params.insert("task_id".into(), Value::String(task.id.clone()));
            params.insert("task_name".into(), Value::String(task.name.clone()));

            let job = JobDraft::new(task.workflow.clone(), platform)
                .params(params)
                .create(&self.clock);
            let job_id = job.job_id;
            self.queue.enqueue(&job, QueueDiscipline::Fifo).await?;

            tracing::info!(task = task.id.as_str(), job = %job_id, "monitor job scheduled");
            enqueued.push(task.id.clone());
        }

        Ok(enqueued)
    }

    /// Cooperative control loop, same shape as the scheduler's.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(tasks = self.tasks.len(), "alert watcher started");
        loop {
            if let Err(error) = self.tick().await {
                tracing::warn!(error = %error, "alert watcher tick failed");
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.settings.check_interval()) => {}
            }
        }
        tracing::info!("alert watcher stopped");
    }
}

#[cfg(test)]
#[path = "monitor_loop_tests.rs"]
mod tests;
