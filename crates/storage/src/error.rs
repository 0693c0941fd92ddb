// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage error taxonomy.

use thiserror::Error;

/// Errors surfaced by the state store and its repositories.
///
/// `Transport` is retryable at the caller's discretion; the scheduler and
/// watcher loops log it and continue on the next tick.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store transport error: {0}")]
    Transport(String),

    #[error("failed to decode stored value: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("corrupt value at {key}: {message}")]
    Corrupt { key: String, message: String },

    #[error("job {job_id} has no platform; cannot route to a queue")]
    MissingPlatform { job_id: String },
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Transport(e.to_string())
    }
}
