// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-platform job queues and job-record storage.
//!
//! A pending job lives in exactly one platform queue (ordered set of job
//! ids) plus a job-record hash under a state-dependent TTL. Dequeue is
//! peek-then-atomic-remove: two workers racing on the same entry produce
//! exactly one winner, the loser sees `None` and moves on.

use crate::error::StoreError;
use crate::keys;
use crate::store::{Op, Order, StateStore};
use std::sync::Arc;
use std::time::Duration;
use sweep_core::{Clock, Job, JobId, JobStatus, Platform};

/// TTL for pending job records.
pub const TTL_PENDING: Duration = Duration::from_secs(60 * 60);
/// TTL for running job records.
pub const TTL_RUNNING: Duration = Duration::from_secs(2 * 60 * 60);
/// TTL for terminal (completed/failed/cancelled) job records.
pub const TTL_TERMINAL: Duration = Duration::from_secs(24 * 60 * 60);

/// How a platform queue orders its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueDiscipline {
    /// Highest priority first (scheduler queues).
    Priority,
    /// Oldest enqueue first (monitor queues).
    Fifo,
}

pub struct JobQueueRepo<S, C> {
    store: Arc<S>,
    clock: C,
}

impl<S: StateStore, C: Clock> JobQueueRepo<S, C> {
    pub fn new(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    fn record_ttl(status: JobStatus) -> Duration {
        match status {
            JobStatus::Pending => TTL_PENDING,
            JobStatus::Running => TTL_RUNNING,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled => TTL_TERMINAL,
        }
    }

    fn score(&self, job: &Job, discipline: QueueDiscipline) -> f64 {
        match discipline {
            QueueDiscipline::Priority => job.priority as f64,
            QueueDiscipline::Fifo => self.clock.epoch_ms() as f64,
        }
    }

    /// Add a pending job to its platform queue and write its record.
    pub async fn enqueue(
        &self,
        job: &Job,
        discipline: QueueDiscipline,
    ) -> Result<(), StoreError> {
        if job.platform.as_str().is_empty() {
            return Err(StoreError::MissingPlatform { job_id: job.job_id.to_string() });
        }
        let data = serde_json::to_string(job)?;
        self.store
            .pipeline(vec![
                Op::ZAdd {
                    key: keys::platform_queue(&job.platform),
                    member: job.job_id.to_string(),
                    score: self.score(job, discipline),
                },
                Op::HSet {
                    key: keys::job(&job.job_id),
                    field: "data".into(),
                    value: data,
                },
                Op::Expire { key: keys::job(&job.job_id), ttl: TTL_PENDING },
            ])
            .await?;
        tracing::debug!(job = %job.job_id, platform = %job.platform, "enqueued");
        Ok(())
    }

    /// Claim the next job from a platform queue. Never blocks; returns
    /// `None` when the queue is empty or another worker won the race.
    pub async fn dequeue(
        &self,
        platform: &Platform,
        discipline: QueueDiscipline,
    ) -> Result<Option<Job>, StoreError> {
        let order = match discipline {
            QueueDiscipline::Priority => Order::Desc,
            QueueDiscipline::Fifo => Order::Asc,
        };
        let queue_key = keys::platform_queue(platform);
        let candidates = self.store.zrange(&queue_key, 1, order).await?;
        let Some(member) = candidates.first() else {
            return Ok(None);
        };
        if !self.store.zrem(&queue_key, member).await? {
            // Another worker removed it first.
            return Ok(None);
        }
        self.get(&JobId::from_string(member)).await
    }

    pub async fn get(&self, job_id: &JobId) -> Result<Option<Job>, StoreError> {
        match self.store.hget(&keys::job(job_id), "data").await? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    /// Rewrite a job record, refreshing the TTL for its current status.
    pub async fn update(&self, job: &Job) -> Result<(), StoreError> {
        let key = keys::job(&job.job_id);
        let data = serde_json::to_string(job)?;
        self.store
            .pipeline(vec![
                Op::HSet { key: key.clone(), field: "data".into(), value: data },
                Op::Expire { key, ttl: Self::record_ttl(job.status) },
            ])
            .await?;
        Ok(())
    }

    /// Remove a job from its queue and delete its record.
    pub async fn delete(&self, job_id: &JobId) -> Result<(), StoreError> {
        let Some(job) = self.get(job_id).await? else {
            return Ok(());
        };
        self.store
            .pipeline(vec![
                Op::ZRem {
                    key: keys::platform_queue(&job.platform),
                    member: job_id.to_string(),
                },
                Op::Del { key: keys::job(job_id) },
            ])
            .await?;
        Ok(())
    }

    pub async fn queue_length(&self, platform: &Platform) -> Result<u64, StoreError> {
        self.store.zcard(&keys::platform_queue(platform)).await
    }

    /// Snapshot of queued jobs in dequeue order. Records that expired out
    /// from under their queue entry are skipped.
    pub async fn queued_jobs(
        &self,
        platform: &Platform,
        limit: usize,
        discipline: QueueDiscipline,
    ) -> Result<Vec<Job>, StoreError> {
        let order = match discipline {
            QueueDiscipline::Priority => Order::Desc,
            QueueDiscipline::Fifo => Order::Asc,
        };
        let members = self.store.zrange(&keys::platform_queue(platform), limit, order).await?;
        let mut jobs = Vec::with_capacity(members.len());
        for member in &members {
            if let Some(job) = self.get(&JobId::from_string(member)).await? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    /// Drop every queued job for a platform. Returns how many entries
    /// were removed.
    pub async fn clear_queue(&self, platform: &Platform) -> Result<u64, StoreError> {
        let queue_key = keys::platform_queue(platform);
        let members = self.store.zrange(&queue_key, 0, Order::Asc).await?;
        if members.is_empty() {
            return Ok(0);
        }
        let mut ops = Vec::with_capacity(members.len() + 1);
        for member in &members {
            ops.push(Op::Del { key: keys::job(&JobId::from_string(member)) });
        }
        ops.push(Op::Del { key: queue_key });
        self.store.pipeline(ops).await?;
        tracing::info!(platform = %platform, count = members.len(), "cleared queue");
        Ok(members.len() as u64)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
