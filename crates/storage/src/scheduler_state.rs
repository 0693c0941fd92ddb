// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler bookkeeping: pacing timestamps, the on/off-sale rotation
//! counter, enable flag, and heartbeat.

use crate::error::StoreError;
use crate::keys;
use crate::store::StateStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sweep_core::{Clock, Platform, SaleStatus, SchedulerSettings};

/// Per-platform rotation state, stored as JSON under
/// `scheduler:state:{platform}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformState {
    /// Position in the on-sale rotation, in `[0, ratio]`.
    #[serde(default)]
    pub on_sale_counter: u32,
    /// Epoch-ms the platform's last job completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed_at: Option<u64>,
}

/// Heartbeat record written under a component's `:status` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatStatus {
    pub status: String,
    pub heartbeat_at: u64,
}

pub struct SchedulerStateRepo<S, C> {
    store: Arc<S>,
    clock: C,
    settings: SchedulerSettings,
}

impl<S: StateStore, C: Clock> SchedulerStateRepo<S, C> {
    pub fn new(store: Arc<S>, clock: C, settings: SchedulerSettings) -> Self {
        Self { store, clock, settings }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub async fn last_enqueue_at(&self) -> Result<Option<u64>, StoreError> {
        read_epoch_ms(self.store.as_ref(), keys::SCHEDULER_LAST_ENQUEUE_AT).await
    }

    pub async fn set_last_enqueue_at(&self, epoch_ms: u64) -> Result<(), StoreError> {
        self.store.set(keys::SCHEDULER_LAST_ENQUEUE_AT, &epoch_ms.to_string()).await
    }

    /// Missing flag means enabled: a fresh deployment schedules without an
    /// explicit enable call.
    pub async fn is_enabled(&self) -> Result<bool, StoreError> {
        read_enabled(self.store.as_ref(), keys::SCHEDULER_ENABLED).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.store.set(keys::SCHEDULER_ENABLED, bool_str(enabled)).await
    }

    pub async fn heartbeat(&self) -> Result<(), StoreError> {
        write_heartbeat(self.store.as_ref(), keys::SCHEDULER_STATUS, self.clock.epoch_ms()).await
    }

    pub async fn status(&self) -> Result<Option<HeartbeatStatus>, StoreError> {
        read_heartbeat(self.store.as_ref(), keys::SCHEDULER_STATUS).await
    }

    pub async fn platform_state(&self, platform: &Platform) -> Result<PlatformState, StoreError> {
        match self.store.get(&keys::scheduler_platform_state(platform)).await? {
            Some(value) => Ok(serde_json::from_str(&value)?),
            None => Ok(PlatformState::default()),
        }
    }

    async fn write_platform_state(
        &self,
        platform: &Platform,
        state: &PlatformState,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_string(state)?;
        self.store.set(&keys::scheduler_platform_state(platform), &value).await
    }

    /// `now − last_enqueue_at ≥ inter_platform_delay`, or no enqueue yet.
    pub async fn global_cooldown_complete(&self) -> Result<bool, StoreError> {
        match self.last_enqueue_at().await? {
            Some(last) => {
                let elapsed = self.clock.epoch_ms().saturating_sub(last);
                Ok(elapsed >= self.settings.inter_platform_delay_ms)
            }
            None => Ok(true),
        }
    }

    /// No completion recorded, or `now − last_completed_at ≥ cooldown`.
    pub async fn platform_cooldown_complete(
        &self,
        platform: &Platform,
    ) -> Result<bool, StoreError> {
        match self.platform_state(platform).await?.last_completed_at {
            Some(completed) => {
                let elapsed = self.clock.epoch_ms().saturating_sub(completed);
                Ok(elapsed >= self.settings.same_platform_cooldown_ms)
            }
            None => Ok(true),
        }
    }

    /// Which subset the platform's next job refreshes.
    pub async fn next_sale_status(&self, platform: &Platform) -> Result<SaleStatus, StoreError> {
        let state = self.platform_state(platform).await?;
        if state.on_sale_counter < self.settings.on_sale_ratio {
            Ok(SaleStatus::OnSale)
        } else {
            Ok(SaleStatus::OffSale)
        }
    }

    /// Advance the rotation after enqueuing a job with `current` status.
    /// An off-sale job resets the counter; on-sale jobs count up to the
    /// ratio, where the rotation flips.
    pub async fn increment_on_sale_counter(
        &self,
        platform: &Platform,
        current: SaleStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.platform_state(platform).await?;
        state.on_sale_counter = match current {
            SaleStatus::OffSale => 0,
            SaleStatus::OnSale => {
                (state.on_sale_counter + 1).min(self.settings.on_sale_ratio)
            }
        };
        self.write_platform_state(platform, &state).await
    }

    /// Stamp a platform's completion time (written by the worker; the
    /// scheduler only reads it for the cooldown check).
    pub async fn record_platform_completed(&self, platform: &Platform) -> Result<(), StoreError> {
        let mut state = self.platform_state(platform).await?;
        state.last_completed_at = Some(self.clock.epoch_ms());
        self.write_platform_state(platform, &state).await
    }

    pub async fn increment_scheduled_jobs(&self) -> Result<i64, StoreError> {
        self.store.incr(keys::SCHEDULER_JOBS_TOTAL).await
    }

    pub async fn scheduled_jobs_total(&self) -> Result<i64, StoreError> {
        read_counter(self.store.as_ref(), keys::SCHEDULER_JOBS_TOTAL).await
    }
}

pub(crate) fn bool_str(enabled: bool) -> &'static str {
    if enabled {
        "true"
    } else {
        "false"
    }
}

pub(crate) async fn read_enabled<S: StateStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<bool, StoreError> {
    Ok(store.get(key).await?.map(|v| v != "false").unwrap_or(true))
}

pub(crate) async fn read_epoch_ms<S: StateStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<u64>, StoreError> {
    match store.get(key).await? {
        Some(value) => {
            let parsed = value.parse().map_err(|_| StoreError::Corrupt {
                key: key.to_string(),
                message: format!("expected epoch-ms integer, got {value:?}"),
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

pub(crate) async fn read_counter<S: StateStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<i64, StoreError> {
    match store.get(key).await? {
        Some(value) => value.parse().map_err(|_| StoreError::Corrupt {
            key: key.to_string(),
            message: format!("expected integer counter, got {value:?}"),
        }),
        None => Ok(0),
    }
}

pub(crate) async fn write_heartbeat<S: StateStore + ?Sized>(
    store: &S,
    key: &str,
    epoch_ms: u64,
) -> Result<(), StoreError> {
    let status = HeartbeatStatus { status: "running".into(), heartbeat_at: epoch_ms };
    store.set(key, &serde_json::to_string(&status)?).await
}

pub(crate) async fn read_heartbeat<S: StateStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<HeartbeatStatus>, StoreError> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_str(&value)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
#[path = "scheduler_state_tests.rs"]
mod tests;
