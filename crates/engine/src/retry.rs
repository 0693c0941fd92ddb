// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node retry policy: bounded attempts with linear backoff.

use crate::error::NodeError;
use crate::node::NodeOutput;
use std::future::Future;
use std::time::Duration;
use sweep_workflow::RetryPolicy;

/// Run `attempt_fn` up to `policy.max_attempts` times, sleeping
/// `attempt * backoff_ms` between attempts. Validation errors abort
/// immediately; a node is never invoked more than `max_attempts` times.
pub async fn execute_with_retry<F, Fut>(
    policy: &RetryPolicy,
    mut attempt_fn: F,
) -> Result<NodeOutput, NodeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<NodeOutput, NodeError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match attempt_fn().await {
            Ok(output) => return Ok(output),
            Err(error) if !error.is_retryable() || attempt >= max_attempts => {
                return Err(error);
            }
            Err(error) => {
                let backoff = Duration::from_millis(attempt as u64 * policy.backoff_ms);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %error,
                    "node attempt failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
