// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: SWEEP_STATE_DIR > XDG_STATE_HOME/sweep >
/// ~/.local/state/sweep
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("SWEEP_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("sweep"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/sweep"))
}

/// State store address, e.g. `redis://127.0.0.1:6379`.
pub fn store_url() -> String {
    std::env::var("SWEEP_STORE_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// Deployment config file; defaults to `{state_dir}/sweep.toml`.
pub fn config_path(state_dir: &std::path::Path) -> PathBuf {
    std::env::var("SWEEP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir.join("sweep.toml"))
}

/// Workflow definition directory; defaults to `{state_dir}/workflows`.
pub fn workflows_dir(state_dir: &std::path::Path) -> PathBuf {
    std::env::var("SWEEP_WORKFLOWS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir.join("workflows"))
}

/// Admin listener socket; defaults to `{state_dir}/sweepd.sock`.
pub fn socket_path(state_dir: &std::path::Path) -> PathBuf {
    std::env::var("SWEEP_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir.join("sweepd.sock"))
}

/// Log directory; defaults to `{state_dir}/logs`.
pub fn log_dir(state_dir: &std::path::Path) -> PathBuf {
    std::env::var("SWEEP_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir.join("logs"))
}

/// Base URL of the scraper sidecar service.
pub fn scraper_url() -> Result<String, LifecycleError> {
    std::env::var("SWEEP_SCRAPER_URL").map_err(|_| LifecycleError::MissingEnv("SWEEP_SCRAPER_URL"))
}

/// Base URL of the product API sidecar.
pub fn product_api_url() -> Result<String, LifecycleError> {
    std::env::var("SWEEP_PRODUCT_API_URL")
        .map_err(|_| LifecycleError::MissingEnv("SWEEP_PRODUCT_API_URL"))
}

/// Base URL of the curated-content API.
pub fn content_api_url() -> Result<String, LifecycleError> {
    std::env::var("SWEEP_CONTENT_API_URL")
        .map_err(|_| LifecycleError::MissingEnv("SWEEP_CONTENT_API_URL"))
}

/// Slack incoming-webhook URL for alerts.
pub fn slack_webhook_url() -> Result<String, LifecycleError> {
    std::env::var("SWEEP_SLACK_WEBHOOK_URL")
        .map_err(|_| LifecycleError::MissingEnv("SWEEP_SLACK_WEBHOOK_URL"))
}
