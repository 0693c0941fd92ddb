// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment configuration (`sweep.toml`).
//!
//! Platform list, monitor tasks, and the pacing constants. Store address
//! and paths come from the environment (see the daemon's `env` module);
//! everything that describes *what to scan* lives here.

use crate::platform::Platform;
use crate::workflow::WorkflowId;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level deployment settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub watcher: WatcherSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
    #[serde(default, rename = "platform")]
    pub platforms: Vec<PlatformConfig>,
    #[serde(default, rename = "monitor_task")]
    pub monitor_tasks: Vec<MonitorTaskDef>,
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.on_sale_ratio == 0 {
            return Err(ConfigError::Invalid("scheduler.on_sale_ratio must be >= 1".into()));
        }

        let mut names: HashSet<&str> = HashSet::new();
        for platform in &self.platforms {
            if platform.name.as_str().is_empty() {
                return Err(ConfigError::Invalid("platform.name must not be empty".into()));
            }
            if !names.insert(platform.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate platform '{}'",
                    platform.name
                )));
            }
        }

        let mut task_ids: HashSet<&str> = HashSet::new();
        for task in &self.monitor_tasks {
            if !task_ids.insert(task.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate monitor task '{}'", task.id)));
            }
        }

        Ok(())
    }

    pub fn platform(&self, name: &str) -> Option<&PlatformConfig> {
        self.platforms.iter().find(|p| p.name == *name)
    }
}

/// Scheduler pacing constants and scan-size defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerSettings {
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    #[serde(default = "default_inter_platform_delay_ms")]
    pub inter_platform_delay_ms: u64,
    #[serde(default = "default_same_platform_cooldown_ms")]
    pub same_platform_cooldown_ms: u64,
    /// On-sale jobs per off-sale job in the rotation.
    #[serde(default = "default_on_sale_ratio")]
    pub on_sale_ratio: u32,
    /// Products refreshed per job run before a continuation is enqueued.
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl SchedulerSettings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn inter_platform_delay(&self) -> Duration {
        Duration::from_millis(self.inter_platform_delay_ms)
    }

    pub fn same_platform_cooldown(&self) -> Duration {
        Duration::from_millis(self.same_platform_cooldown_ms)
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval_ms(),
            inter_platform_delay_ms: default_inter_platform_delay_ms(),
            same_platform_cooldown_ms: default_same_platform_cooldown_ms(),
            on_sale_ratio: default_on_sale_ratio(),
            limit: default_limit(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
        }
    }
}

/// Alert-watcher loop constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatcherSettings {
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
}

impl WatcherSettings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self { check_interval_ms: default_check_interval_ms() }
    }
}

/// Worker loop and lock constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on how long a crashed worker can hold a platform.
    #[serde(default = "default_lock_ttl_secs")]
    pub lock_ttl_secs: u64,
    /// Kill flags auto-expire so a relaunched worker does not self-kill.
    #[serde(default = "default_kill_flag_ttl_secs")]
    pub kill_flag_ttl_secs: u64,
}

impl WorkerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    pub fn kill_flag_ttl(&self) -> Duration {
        Duration::from_secs(self.kill_flag_ttl_secs)
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            lock_ttl_secs: default_lock_ttl_secs(),
            kill_flag_ttl_secs: default_kill_flag_ttl_secs(),
        }
    }
}

/// One scanned e-commerce site.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    pub name: Platform,
    /// Product page URL pattern handed to the update workflow.
    pub link_url_pattern: String,
    /// Workflow override; defaults to `{name}-update-v2`.
    #[serde(default)]
    pub workflow: Option<WorkflowId>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub batch_size: Option<u32>,
    #[serde(default)]
    pub concurrency: Option<u32>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitSettings>,
}

impl PlatformConfig {
    pub fn workflow_id(&self) -> WorkflowId {
        self.workflow.clone().unwrap_or_else(|| WorkflowId::update_for(&self.name))
    }
}

/// Fixed-window outbound request budget for one platform.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSettings {
    #[serde(default = "default_rate_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_rate_budget")]
    pub budget: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self { window_secs: default_rate_window_secs(), budget: default_rate_budget() }
    }
}

/// One periodic content-surface check (banner, vote, pick).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorTaskDef {
    pub id: String,
    /// Human-readable name used in alerts and status output.
    pub name: String,
    pub interval_ms: u64,
    pub workflow: WorkflowId,
}

impl MonitorTaskDef {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_check_interval_ms() -> u64 {
    1_000
}

fn default_inter_platform_delay_ms() -> u64 {
    30_000
}

fn default_same_platform_cooldown_ms() -> u64 {
    60_000
}

fn default_on_sale_ratio() -> u32 {
    4
}

fn default_limit() -> u32 {
    500
}

fn default_batch_size() -> u32 {
    50
}

fn default_concurrency() -> u32 {
    5
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_lock_ttl_secs() -> u64 {
    7_200
}

fn default_kill_flag_ttl_secs() -> u64 {
    60
}

fn default_rate_window_secs() -> u64 {
    60
}

fn default_rate_budget() -> u32 {
    60
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
