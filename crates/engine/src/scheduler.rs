// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler loop: decides which platform receives the next scan job.
//!
//! At most one enqueue per tick, which together with the global cooldown
//! guarantees the inter-platform gap. A platform is skipped while its
//! queue is non-empty, a job is running on it, or its own cooldown has
//! not elapsed.

use serde_json::Value;
use std::sync::Arc;
use sweep_core::{Clock, JobDraft, JobId, Params, Platform, PlatformConfig, SchedulerSettings};
use sweep_storage::{
    JobQueueRepo, PlatformLock, QueueDiscipline, SchedulerStateRepo, StateStore, StoreError,
};
use tokio_util::sync::CancellationToken;

pub struct Scheduler<S, C> {
    state: Arc<SchedulerStateRepo<S, C>>,
    queue: Arc<JobQueueRepo<S, C>>,
    lock: Arc<PlatformLock<S, C>>,
    platforms: Vec<PlatformConfig>,
    settings: SchedulerSettings,
    clock: C,
}

impl<S: StateStore, C: Clock> Scheduler<S, C> {
    pub fn new(
        state: Arc<SchedulerStateRepo<S, C>>,
        queue: Arc<JobQueueRepo<S, C>>,
        lock: Arc<PlatformLock<S, C>>,
        platforms: Vec<PlatformConfig>,
        settings: SchedulerSettings,
        clock: C,
    ) -> Self {
        Self { state, queue, lock, platforms, settings, clock }
    }

    /// One scheduling decision. Returns the platform and job id when a
    /// job was enqueued.
    pub async fn tick(&self) -> Result<Option<(Platform, JobId)>, StoreError> {
        self.state.heartbeat().await?;

        if !self.state.is_enabled().await? {
            return Ok(None);
        }
        if !self.state.global_cooldown_complete().await? {
            return Ok(None);
        }

        for platform_cfg in &self.platforms {
            let platform = &platform_cfg.name;

            if self.queue.queue_length(platform).await? > 0 {
                continue;
            }
            if self.lock.running_job(platform).await?.is_some() {
                continue;
            }
            if !self.state.platform_cooldown_complete(platform).await? {
                continue;
            }

            let sale_status = self.state.next_sale_status(platform).await?;
            let job = JobDraft::new(platform_cfg.workflow_id(), platform.clone())
                .params(self.job_params(platform_cfg, sale_status))
                .create(&self.clock);
            let job_id = job.job_id;

            self.queue.enqueue(&job, QueueDiscipline::Priority).await?;
            self.state.set_last_enqueue_at(self.clock.epoch_ms()).await?;
            self.state.increment_on_sale_counter(platform, sale_status).await?;
            self.state.increment_scheduled_jobs().await?;

            tracing::info!(
                platform = %platform,
                job = %job_id,
                sale_status = %sale_status,
                "scan job scheduled"
            );
            // One enqueue per tick keeps the inter-platform gap.
            return Ok(Some((platform.clone(), job_id)));
        }

        Ok(None)
    }

    fn job_params(
        &self,
        platform_cfg: &PlatformConfig,
        sale_status: sweep_core::SaleStatus,
    ) -> Params {
        let mut params = Params::new();
        params.insert("platform".into(), Value::String(platform_cfg.name.to_string()));
        params.insert(
            "link_url_pattern".into(),
            Value::String(platform_cfg.link_url_pattern.clone()),
        );
        params.insert("sale_status".into(), Value::String(sale_status.as_str().into()));
        params.insert(
            "limit".into(),
            Value::from(platform_cfg.limit.unwrap_or(self.settings.limit)),
        );
        params.insert(
            "batch_size".into(),
            Value::from(platform_cfg.batch_size.unwrap_or(self.settings.batch_size)),
        );
        params.insert(
            "concurrency".into(),
            Value::from(platform_cfg.concurrency.unwrap_or(self.settings.concurrency)),
        );
        params.insert("update_sale_status".into(), Value::Bool(true));
        params
    }

    /// Cooperative control loop. Tick errors are logged and swallowed;
    /// the shutdown token ends the loop after the current tick.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(platforms = self.platforms.len(), "scheduler started");
        loop {
            if let Err(error) = self.tick().await {
                tracing::warn!(error = %error, "scheduler tick failed");
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.settings.check_interval()) => {}
            }
        }
        tracing::info!("scheduler stopped");
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
