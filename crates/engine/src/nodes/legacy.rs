// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Legacy untyped nodes: raw JSON config in, raw JSON out.

use crate::error::NodeError;
use crate::node::{NodeContext, NodeOutput, NodeStrategy};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Merge the resolved config object into the accumulated data as-is.
pub struct SetValues;

#[async_trait]
impl NodeStrategy for SetValues {
    async fn execute(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        match &ctx.config {
            Value::Object(map) => Ok(NodeOutput { data: map.clone(), next_nodes: None }),
            _ => Err(NodeError::Validation("set_values config must be an object".into())),
        }
    }
}

/// Sleep for `ms` milliseconds. Pacing aid for hand-written workflows.
pub struct Delay;

#[async_trait]
impl NodeStrategy for Delay {
    async fn execute(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let ms = ctx
            .config
            .get("ms")
            .and_then(Value::as_u64)
            .ok_or_else(|| NodeError::Validation("delay config requires integer 'ms'".into()))?;
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(NodeOutput::default())
    }
}

#[cfg(test)]
#[path = "legacy_tests.rs"]
mod tests;
