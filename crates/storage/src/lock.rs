// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform mutual exclusion and the running-job record.
//!
//! One job per platform at a time. Acquisition is set-if-absent with TTL,
//! so a crashed worker's lock expires on its own instead of deadlocking
//! the platform; no fencing tokens. Release is an unconditional delete;
//! the caller is trusted to release only its own lock.

use crate::error::StoreError;
use crate::keys;
use crate::store::StateStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use sweep_core::{Clock, JobId, Platform, WorkflowId};

/// What a platform's worker is executing right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningJob {
    pub job_id: JobId,
    pub workflow_id: WorkflowId,
    pub started_at: DateTime<Utc>,
}

pub struct PlatformLock<S, C> {
    store: Arc<S>,
    clock: C,
    ttl: Duration,
}

impl<S: StateStore, C: Clock> PlatformLock<S, C> {
    pub fn new(store: Arc<S>, clock: C, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Try to take the platform lock. Returns whether this caller got it.
    pub async fn acquire(&self, platform: &Platform) -> Result<bool, StoreError> {
        let acquired = self
            .store
            .set_nx_ex(
                &keys::platform_lock(platform),
                &self.clock.epoch_ms().to_string(),
                self.ttl,
            )
            .await?;
        if acquired {
            tracing::debug!(platform = %platform, "lock acquired");
        }
        Ok(acquired)
    }

    /// Unconditional release.
    pub async fn release(&self, platform: &Platform) -> Result<(), StoreError> {
        self.store.del(&keys::platform_lock(platform)).await?;
        tracing::debug!(platform = %platform, "lock released");
        Ok(())
    }

    pub async fn is_locked(&self, platform: &Platform) -> Result<bool, StoreError> {
        self.store.exists(&keys::platform_lock(platform)).await
    }

    /// Remaining lock TTL, for status introspection.
    pub async fn ttl_remaining(
        &self,
        platform: &Platform,
    ) -> Result<Option<Duration>, StoreError> {
        self.store.ttl(&keys::platform_lock(platform)).await
    }

    /// Record what this platform's worker is executing. Carries the same
    /// TTL as the lock so both expire together after a crash.
    pub async fn set_running_job(
        &self,
        platform: &Platform,
        running: &RunningJob,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_string(running)?;
        self.store.set_ex(&keys::running_job(platform), &value, self.ttl).await
    }

    pub async fn clear_running_job(&self, platform: &Platform) -> Result<(), StoreError> {
        self.store.del(&keys::running_job(platform)).await
    }

    pub async fn running_job(
        &self,
        platform: &Platform,
    ) -> Result<Option<RunningJob>, StoreError> {
        match self.store.get(&keys::running_job(platform)).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
