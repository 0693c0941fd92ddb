// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin control surface.
//!
//! Out-of-band mutations of the shared operational state: enable flags,
//! queue clearing, stuck-job force release, worker restart requests, and
//! read-only introspection. The daemon's IPC listener is a thin shell
//! over this type.

use crate::kill::KillSignal;
use crate::monitor::monitor_platform;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use sweep_core::{Clock, MonitorTaskDef, Platform, PlatformConfig, WorkerSettings};
use sweep_storage::{
    JobQueueRepo, MonitorStateRepo, PlatformLock, SchedulerStateRepo, StateStore, StoreError,
};

/// Result of a force release.
#[derive(Debug, Clone, Serialize)]
pub struct ForceReleaseReport {
    pub platform: Platform,
    pub had_running_job: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunningJobEntry {
    pub platform: Platform,
    pub job_id: String,
    pub workflow_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueLengthEntry {
    pub platform: Platform,
    pub length: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatusReport {
    pub enabled: bool,
    pub heartbeat_at: Option<u64>,
    pub scheduled_jobs_total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatcherStatusReport {
    pub enabled: bool,
    pub heartbeat_at: Option<u64>,
    pub executed_total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorTaskState {
    pub id: String,
    pub name: String,
    pub interval_ms: u64,
    pub completed_at: Option<u64>,
    pub eligible: bool,
}

pub struct AdminSurface<S, C> {
    store: Arc<S>,
    queue: Arc<JobQueueRepo<S, C>>,
    lock: Arc<PlatformLock<S, C>>,
    scheduler_state: Arc<SchedulerStateRepo<S, C>>,
    monitor_state: Arc<MonitorStateRepo<S, C>>,
    platforms: Vec<PlatformConfig>,
    monitor_tasks: Vec<MonitorTaskDef>,
    worker_settings: WorkerSettings,
    clock: C,
}

impl<S: StateStore, C: Clock> AdminSurface<S, C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<S>,
        queue: Arc<JobQueueRepo<S, C>>,
        lock: Arc<PlatformLock<S, C>>,
        scheduler_state: Arc<SchedulerStateRepo<S, C>>,
        monitor_state: Arc<MonitorStateRepo<S, C>>,
        platforms: Vec<PlatformConfig>,
        monitor_tasks: Vec<MonitorTaskDef>,
        worker_settings: WorkerSettings,
        clock: C,
    ) -> Self {
        Self {
            store,
            queue,
            lock,
            scheduler_state,
            monitor_state,
            platforms,
            monitor_tasks,
            worker_settings,
            clock,
        }
    }

    /// Every queue this deployment owns: platforms plus monitor tasks.
    fn all_platforms(&self) -> Vec<Platform> {
        self.platforms
            .iter()
            .map(|p| p.name.clone())
            .chain(self.monitor_tasks.iter().map(|t| monitor_platform(&t.id)))
            .collect()
    }

    pub async fn set_scheduler_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        tracing::info!(enabled, "scheduler enable flag changed");
        self.scheduler_state.set_enabled(enabled).await
    }

    pub async fn scheduler_status(&self) -> Result<SchedulerStatusReport, StoreError> {
        Ok(SchedulerStatusReport {
            enabled: self.scheduler_state.is_enabled().await?,
            heartbeat_at: self.scheduler_state.status().await?.map(|s| s.heartbeat_at),
            scheduled_jobs_total: self.scheduler_state.scheduled_jobs_total().await?,
        })
    }

    pub async fn set_watcher_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        tracing::info!(enabled, "alert watcher enable flag changed");
        self.monitor_state.set_enabled(enabled).await
    }

    pub async fn watcher_status(&self) -> Result<WatcherStatusReport, StoreError> {
        Ok(WatcherStatusReport {
            enabled: self.monitor_state.is_enabled().await?,
            heartbeat_at: self.monitor_state.status().await?.map(|s| s.heartbeat_at),
            executed_total: self.monitor_state.executed_total().await?,
        })
    }

    pub async fn queue_lengths(&self) -> Result<Vec<QueueLengthEntry>, StoreError> {
        let mut entries = Vec::new();
        for platform in self.all_platforms() {
            let length = self.queue.queue_length(&platform).await?;
            entries.push(QueueLengthEntry { platform, length });
        }
        Ok(entries)
    }

    pub async fn clear_queue(&self, platform: &Platform) -> Result<u64, StoreError> {
        self.queue.clear_queue(platform).await
    }

    pub async fn clear_all_queues(&self) -> Result<u64, StoreError> {
        let mut total = 0;
        for platform in self.all_platforms() {
            total += self.queue.clear_queue(&platform).await?;
        }
        Ok(total)
    }

    /// Jobs currently running, with elapsed seconds for stuck-job triage.
    pub async fn running_jobs(&self) -> Result<Vec<RunningJobEntry>, StoreError> {
        let now = self.clock.now_utc();
        let mut entries = Vec::new();
        for platform in self.all_platforms() {
            if let Some(running) = self.lock.running_job(&platform).await? {
                entries.push(RunningJobEntry {
                    platform,
                    job_id: running.job_id.to_string(),
                    workflow_id: running.workflow_id.to_string(),
                    started_at: running.started_at,
                    elapsed_secs: (now - running.started_at).num_seconds().max(0),
                });
            }
        }
        Ok(entries)
    }

    /// Break a stuck platform: fail the running job, clear the
    /// running-job record, release the lock.
    pub async fn force_release(
        &self,
        platform: &Platform,
    ) -> Result<ForceReleaseReport, StoreError> {
        let running = self.lock.running_job(platform).await?;
        let had_running_job = running.is_some();

        if let Some(running) = running {
            if let Some(mut job) = self.queue.get(&running.job_id).await? {
                job.mark_failed(
                    "Force released via API — stuck job detected",
                    job.current_node.clone(),
                    &self.clock,
                );
                self.queue.update(&job).await?;
            }
            self.lock.clear_running_job(platform).await?;
        }
        self.lock.release(platform).await?;

        tracing::warn!(platform = %platform, had_running_job, "platform force released");
        Ok(ForceReleaseReport { platform: platform.clone(), had_running_job })
    }

    /// Ask the platform's worker to exit at its next safe point.
    pub async fn restart_worker(&self, platform: &Platform) -> Result<(), StoreError> {
        KillSignal::new(self.store.clone(), platform.clone())
            .request(self.worker_settings.kill_flag_ttl())
            .await
    }

    pub async fn monitor_task_states(&self) -> Result<Vec<MonitorTaskState>, StoreError> {
        let mut states = Vec::new();
        for task in &self.monitor_tasks {
            let completed_at = self.monitor_state.completed_at(&task.id).await?;
            let eligible =
                self.monitor_state.cooldown_complete(&task.id, task.interval()).await?;
            states.push(MonitorTaskState {
                id: task.id.clone(),
                name: task.name.clone(),
                interval_ms: task.interval_ms,
                completed_at,
                eligible,
            });
        }
        Ok(states)
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
