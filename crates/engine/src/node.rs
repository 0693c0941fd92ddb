// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node strategy contract: the untyped engine boundary and the typed
//! wrapper new nodes implement.

use crate::error::NodeError;
use crate::job_logger::JobLogger;
use crate::shared_state::JobSharedState;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use sweep_core::{JobId, NodeId, Params, Platform, PlatformConfig, WorkflowId};

/// Everything a strategy can see while executing one node.
#[derive(Clone)]
pub struct NodeContext {
    pub job_id: JobId,
    pub workflow_id: WorkflowId,
    pub node_id: NodeId,
    /// Node config with `${var}` tokens resolved against job params.
    pub config: Value,
    /// Accumulated outputs of executed nodes, plus job params and timing.
    pub input: Params,
    pub params: Params,
    pub platform: Platform,
    pub platform_config: Option<PlatformConfig>,
    pub shared: JobSharedState,
    /// Per-job activity log; strategies append operator-facing lines.
    pub logger: Arc<JobLogger>,
}

/// What a node hands back to the engine.
#[derive(Debug, Clone, Default)]
pub struct NodeOutput {
    /// Merged into the job's accumulated data (last-writer-wins).
    pub data: Params,
    /// Dynamic routing override; `None` uses the node's static edges.
    pub next_nodes: Option<Vec<NodeId>>,
}

/// The engine-facing strategy boundary. Legacy nodes implement this
/// directly with raw JSON config and result.
#[async_trait]
pub trait NodeStrategy: Send + Sync {
    async fn execute(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError>;
}

/// Typed output of a [`TypedNode`].
#[derive(Debug, Clone)]
pub struct TypedOutput<T> {
    pub data: T,
    pub next_nodes: Option<Vec<NodeId>>,
}

impl<T> TypedOutput<T> {
    pub fn new(data: T) -> Self {
        Self { data, next_nodes: None }
    }

    pub fn with_next(data: T, next_nodes: Vec<NodeId>) -> Self {
        Self { data, next_nodes: Some(next_nodes) }
    }
}

/// A node with declared input/output shapes. Every new node declares its
/// schema this way; the registry adapts it to the untyped boundary.
#[async_trait]
pub trait TypedNode: Send + Sync {
    type Config: DeserializeOwned + Send;
    type Output: Serialize + Send;

    async fn run(
        &self,
        config: Self::Config,
        ctx: &NodeContext,
    ) -> Result<TypedOutput<Self::Output>, NodeError>;
}

/// Adapter upcasting a [`TypedNode`] to the untyped [`NodeStrategy`]
/// boundary: config is downcast with serde on the way in, output upcast
/// on the way out.
pub struct Typed<T>(pub T);

#[async_trait]
impl<T: TypedNode> NodeStrategy for Typed<T> {
    async fn execute(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let config: T::Config = serde_json::from_value(ctx.config.clone())
            .map_err(|e| NodeError::Validation(format!("config does not match schema: {e}")))?;

        let output = self.0.run(config, ctx).await?;

        let data = match serde_json::to_value(&output.data) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Params::new(),
            Ok(other) => {
                let mut map = Params::new();
                map.insert("value".into(), other);
                map
            }
            Err(e) => {
                return Err(NodeError::Failed(format!("output serialization failed: {e}")))
            }
        };

        Ok(NodeOutput { data, next_nodes: output.next_nodes })
    }
}
