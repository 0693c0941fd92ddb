// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-window outbound request budget per platform.
//!
//! Extract nodes call [`RateLimiter::try_acquire`] before each scraper
//! request and sleep out the window when the budget is spent. The counter
//! key embeds the window index, so stale windows expire on their own.

use crate::error::StoreError;
use crate::keys;
use crate::store::StateStore;
use std::sync::Arc;
use std::time::Duration;
use sweep_core::{Clock, Platform, RateLimitSettings};

pub struct RateLimiter<S, C> {
    store: Arc<S>,
    clock: C,
}

impl<S: StateStore, C: Clock> RateLimiter<S, C> {
    pub fn new(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    fn window_index(&self, settings: &RateLimitSettings) -> u64 {
        (self.clock.epoch_ms() / 1_000) / settings.window_secs.max(1)
    }

    /// Spend one request from the current window. Returns whether the
    /// request is within budget.
    pub async fn try_acquire(
        &self,
        platform: &Platform,
        settings: &RateLimitSettings,
    ) -> Result<bool, StoreError> {
        let key = keys::rate_window(platform, self.window_index(settings));
        let used = self.store.incr(&key).await?;
        if used == 1 {
            // Two windows of slack so a slow reader can still observe it.
            self.store
                .expire(&key, Duration::from_secs(settings.window_secs.max(1) * 2))
                .await?;
        }
        let allowed = used <= settings.budget as i64;
        if !allowed {
            tracing::debug!(platform = %platform, used, budget = settings.budget, "rate limited");
        }
        Ok(allowed)
    }

    /// Requests left in the current window.
    pub async fn remaining(
        &self,
        platform: &Platform,
        settings: &RateLimitSettings,
    ) -> Result<u32, StoreError> {
        let key = keys::rate_window(platform, self.window_index(settings));
        let used = match self.store.get(&key).await? {
            Some(value) => value.parse::<i64>().map_err(|_| StoreError::Corrupt {
                key: key.clone(),
                message: format!("expected integer counter, got {value:?}"),
            })?,
            None => 0,
        };
        Ok((settings.budget as i64 - used).max(0) as u32)
    }

    /// Time until the current window rolls over.
    pub fn window_remaining(&self, settings: &RateLimitSettings) -> Duration {
        let window_ms = settings.window_secs.max(1) * 1_000;
        let into_window = self.clock.epoch_ms() % window_ms;
        Duration::from_millis(window_ms - into_window)
    }
}

#[cfg(test)]
#[path = "ratelimit_tests.rs"]
mod tests;
