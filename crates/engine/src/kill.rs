// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-platform kill flag.
//!
//! A short-lived key whose presence asks a specific worker to exit. The
//! TTL auto-expires the flag so a relaunched worker does not immediately
//! self-kill; the worker only honors it at node boundaries.

use std::sync::Arc;
use std::time::Duration;
use sweep_core::Platform;
use sweep_storage::{keys, StateStore, StoreError};

pub struct KillSignal<S> {
    store: Arc<S>,
    platform: Platform,
}

impl<S: StateStore> KillSignal<S> {
    pub fn new(store: Arc<S>, platform: Platform) -> Self {
        Self { store, platform }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Raise the flag. `ttl` bounds how long a restart request lingers.
    pub async fn request(&self, ttl: Duration) -> Result<(), StoreError> {
        self.store
            .set_ex(&keys::kill_flag(&self.platform), "restart", ttl)
            .await?;
        tracing::info!(platform = %self.platform, "worker restart requested");
        Ok(())
    }

    /// Check the flag. Store errors read as "not set" so a flaky store
    /// cannot kill workers.
    pub async fn is_set(&self) -> bool {
        match self.store.exists(&keys::kill_flag(&self.platform)).await {
            Ok(set) => set,
            Err(error) => {
                tracing::warn!(platform = %self.platform, error = %error, "kill flag check failed");
                false
            }
        }
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.del(&keys::kill_flag(&self.platform)).await
    }
}
