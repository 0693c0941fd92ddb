// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert-watcher bookkeeping: per-task completion times, enable flag,
//! heartbeat, and the executed-jobs counter.

use crate::error::StoreError;
use crate::keys;
use crate::scheduler_state::{
    bool_str, read_counter, read_enabled, read_epoch_ms, read_heartbeat, write_heartbeat,
    HeartbeatStatus,
};
use crate::store::StateStore;
use std::sync::Arc;
use std::time::Duration;
use sweep_core::Clock;

pub struct MonitorStateRepo<S, C> {
    store: Arc<S>,
    clock: C,
}

impl<S: StateStore, C: Clock> MonitorStateRepo<S, C> {
    pub fn new(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    pub async fn completed_at(&self, task_id: &str) -> Result<Option<u64>, StoreError> {
        read_epoch_ms(self.store.as_ref(), &keys::watcher_task_completed_at(task_id)).await
    }

    /// Stamp a task's completion time. Written by the executing monitor
    /// node, not by the watcher loop.
    pub async fn set_completed_at(&self, task_id: &str) -> Result<(), StoreError> {
        self.store
            .set(
                &keys::watcher_task_completed_at(task_id),
                &self.clock.epoch_ms().to_string(),
            )
            .await
    }

    /// A task without a completion record is immediately eligible.
    pub async fn cooldown_complete(
        &self,
        task_id: &str,
        interval: Duration,
    ) -> Result<bool, StoreError> {
        match self.completed_at(task_id).await? {
            Some(completed) => {
                let elapsed = self.clock.epoch_ms().saturating_sub(completed);
                Ok(elapsed >= interval.as_millis() as u64)
            }
            None => Ok(true),
        }
    }

    /// Missing flag means enabled, same as the scheduler.
    pub async fn is_enabled(&self) -> Result<bool, StoreError> {
        read_enabled(self.store.as_ref(), keys::WATCHER_ENABLED).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.store.set(keys::WATCHER_ENABLED, bool_str(enabled)).await
    }

    pub async fn heartbeat(&self) -> Result<(), StoreError> {
        write_heartbeat(self.store.as_ref(), keys::WATCHER_STATUS, self.clock.epoch_ms()).await
    }

    pub async fn status(&self) -> Result<Option<HeartbeatStatus>, StoreError> {
        read_heartbeat(self.store.as_ref(), keys::WATCHER_STATUS).await
    }

    pub async fn increment_executed(&self) -> Result<i64, StoreError> {
        self.store.incr(keys::WATCHER_EXECUTED_TOTAL).await
    }

    pub async fn executed_total(&self) -> Result<i64, StoreError> {
        read_counter(self.store.as_ref(), keys::WATCHER_EXECUTED_TOTAL).await
    }
}

#[cfg(test)]
#[path = "monitor_state_tests.rs"]
mod tests;
