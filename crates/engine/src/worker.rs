// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-platform worker: acquire lock, dequeue, execute, release, repeat.
//!
//! A crashed worker leaves its lock and running-job record to expire by
//! TTL; the scheduler then resumes enqueuing for the platform. The kill
//! flag exits the loop at the next safe point: between polls, or
//! between node levels of a running job.

use crate::engine::{ExecutionOutcome, WorkflowEngine};
use crate::kill::KillSignal;
use std::sync::Arc;
use sweep_core::{Clock, JobId, Platform, WorkerSettings};
use sweep_storage::{
    JobQueueRepo, PlatformLock, QueueDiscipline, RunningJob, SchedulerStateRepo, StateStore,
    StoreError,
};
use tokio_util::sync::CancellationToken;

/// Outcome of one worker poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPoll {
    /// Kill flag observed; the worker must exit.
    KillRequested,
    /// Another holder has the platform lock.
    LockBusy,
    /// Lock held but the queue was empty.
    Idle,
    /// A job ran to a terminal state.
    Executed(JobId, ExecutionOutcome),
}

pub struct Worker<S, C> {
    platform: Platform,
    discipline: QueueDiscipline,
    queue: Arc<JobQueueRepo<S, C>>,
    lock: Arc<PlatformLock<S, C>>,
    scheduler_state: Arc<SchedulerStateRepo<S, C>>,
    engine: Arc<WorkflowEngine<S, C>>,
    kill: KillSignal<S>,
    settings: WorkerSettings,
    clock: C,
}

impl<S: StateStore, C: Clock> Worker<S, C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        platform: Platform,
        discipline: QueueDiscipline,
        queue: Arc<JobQueueRepo<S, C>>,
        lock: Arc<PlatformLock<S, C>>,
        scheduler_state: Arc<SchedulerStateRepo<S, C>>,
        engine: Arc<WorkflowEngine<S, C>>,
        store: Arc<S>,
        settings: WorkerSettings,
        clock: C,
    ) -> Self {
        let kill = KillSignal::new(store, platform.clone());
        Self {
            platform,
            discipline,
            queue,
            lock,
            scheduler_state,
            engine,
            kill,
            settings,
            clock,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// One iteration of the worker loop.
    pub async fn poll_once(&self) -> Result<WorkerPoll, StoreError> {
        if self.kill.is_set().await {
            return Ok(WorkerPoll::KillRequested);
        }

        if !self.lock.acquire(&self.platform).await? {
            return Ok(WorkerPoll::LockBusy);
        }

        let Some(mut job) = self.queue.dequeue(&self.platform, self.discipline).await? else {
            self.lock.release(&self.platform).await?;
            return Ok(WorkerPoll::Idle);
        };

        job.mark_running(&self.clock);
        self.queue.update(&job).await?;
        self.lock
            .set_running_job(
                &self.platform,
                &RunningJob {
                    job_id: job.job_id,
                    workflow_id: job.workflow_id.clone(),
                    started_at: self.clock.now_utc(),
                },
            )
            .await?;

        let job_id = job.job_id;
        tracing::info!(platform = %self.platform, job = %job_id, "job started");

        match self.engine.execute(job, Some(&self.kill)).await {
            Ok((_, outcome)) => {
                if outcome != ExecutionOutcome::Killed {
                    // The scheduler watches this stamp for the
                    // same-platform cooldown.
                    self.scheduler_state.record_platform_completed(&self.platform).await?;
                }
                self.lock.clear_running_job(&self.platform).await?;
                self.lock.release(&self.platform).await?;
                if outcome == ExecutionOutcome::Killed {
                    return Ok(WorkerPoll::KillRequested);
                }
                Ok(WorkerPoll::Executed(job_id, outcome))
            }
            Err(error) => {
                // Store failure mid-job: release what we can and let the
                // job record's TTL clean up the rest.
                tracing::error!(platform = %self.platform, job = %job_id, error = %error, "job execution errored");
                let _ = self.lock.clear_running_job(&self.platform).await;
                let _ = self.lock.release(&self.platform).await;
                let crate::error::EngineError::Store(store_error) = error;
                Err(store_error)
            }
        }
    }

    /// Worker loop. Returns when the kill flag or the shutdown token
    /// fires; the supervisor decides whether to relaunch.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(platform = %self.platform, "worker started");
        loop {
            let poll = match self.poll_once().await {
                Ok(poll) => poll,
                Err(error) => {
                    tracing::warn!(platform = %self.platform, error = %error, "worker poll failed");
                    WorkerPoll::Idle
                }
            };

            match poll {
                WorkerPoll::KillRequested => {
                    tracing::warn!(platform = %self.platform, "worker exiting on kill flag");
                    break;
                }
                WorkerPoll::Executed(..) => {
                    // Immediately look for the next job.
                    if shutdown.is_cancelled() {
                        break;
                    }
                }
                WorkerPoll::LockBusy | WorkerPoll::Idle => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.settings.poll_interval()) => {}
                    }
                }
            }
        }
        tracing::info!(platform = %self.platform, "worker stopped");
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
