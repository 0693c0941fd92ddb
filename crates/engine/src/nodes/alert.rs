// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert delivery node.
//!
//! Notifier failures are logged and swallowed; a broken Slack webhook
//! must not fail the monitor job.

use crate::error::NodeError;
use crate::node::{NodeContext, TypedNode, TypedOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sweep_adapters::Notifier;

pub struct SendAlert<N> {
    notifier: N,
}

#[derive(Debug, Deserialize)]
pub struct SendAlertConfig {
    /// Message override; defaults to a summary built from the broken
    /// links in the node input.
    #[serde(default)]
    pub message: Option<String>,
    /// Skip delivery when the input reports nothing broken.
    #[serde(default)]
    pub only_on_broken: bool,
}

#[derive(Debug, Serialize)]
pub struct SendAlertOutput {
    pub delivered: bool,
    pub skipped: bool,
}

impl<N: Notifier> SendAlert<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }
}

fn default_message(ctx: &NodeContext) -> String {
    let surface = ctx
        .input
        .get("surface")
        .and_then(Value::as_str)
        .unwrap_or("content");
    let empty = Vec::new();
    let broken = ctx
        .input
        .get("broken")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let mut message = format!("{} check: {} broken link(s)", surface, broken.len());
    for item in broken {
        let title = item.get("title").and_then(Value::as_str).unwrap_or("?");
        let url = item.get("url").and_then(Value::as_str).unwrap_or("?");
        let reason = item.get("reason").and_then(Value::as_str).unwrap_or("unknown");
        message.push_str(&format!("\n- {title} {url} ({reason})"));
    }
    message
}

#[async_trait]
impl<N: Notifier> TypedNode for SendAlert<N> {
    type Config = SendAlertConfig;
    type Output = SendAlertOutput;

    async fn run(
        &self,
        config: Self::Config,
        ctx: &NodeContext,
    ) -> Result<TypedOutput<Self::Output>, NodeError> {
        let broken_count = ctx
            .input
            .get("broken_count")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        if config.only_on_broken && broken_count == 0 {
            return Ok(TypedOutput::new(SendAlertOutput { delivered: false, skipped: true }));
        }

        let message = config.message.unwrap_or_else(|| default_message(ctx));
        let delivered = match self.notifier.send(&message).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(job = %ctx.job_id, error = %error, "alert delivery failed");
                false
            }
        };

        Ok(TypedOutput::new(SendAlertOutput { delivered, skipped: false }))
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
