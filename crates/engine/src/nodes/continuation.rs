// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Continuation enqueue: long sweeps yield to queue fairness.
//!
//! When the extract step reports products remaining, this node enqueues
//! a successor job with `current_node` pointed back at the resume node
//! and the advanced cursor in params; the workflow continues after
//! other jobs have had a turn. Continuations enter the queue at LOW
//! priority so fresh scheduler jobs win ties.

use crate::error::NodeError;
use crate::node::{NodeContext, TypedNode, TypedOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use sweep_core::{priority, Clock, JobDraft, NodeId};
use sweep_storage::{JobQueueRepo, QueueDiscipline, StateStore};

pub struct EnqueueContinuation<S, C> {
    queue: Arc<JobQueueRepo<S, C>>,
    clock: C,
}

#[derive(Debug, Deserialize)]
pub struct ContinuationConfig {
    /// Node the successor job resumes from.
    pub resume_node: String,
}

#[derive(Debug, Serialize)]
pub struct ContinuationOutput {
    pub continued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_job_id: Option<String>,
}

impl<S: StateStore, C: Clock> EnqueueContinuation<S, C> {
    pub fn new(queue: Arc<JobQueueRepo<S, C>>, clock: C) -> Self {
        Self { queue, clock }
    }
}

#[async_trait]
impl<S: StateStore, C: Clock> TypedNode for EnqueueContinuation<S, C> {
    type Config = ContinuationConfig;
    type Output = ContinuationOutput;

    async fn run(
        &self,
        config: Self::Config,
        ctx: &NodeContext,
    ) -> Result<TypedOutput<Self::Output>, NodeError> {
        if config.resume_node.is_empty() {
            return Err(NodeError::Validation("resume_node must not be empty".into()));
        }

        let remaining = ctx.input.get("remaining").and_then(Value::as_u64).unwrap_or(0);
        if remaining == 0 {
            return Ok(TypedOutput::new(ContinuationOutput {
                continued: false,
                continuation_job_id: None,
            }));
        }

        let next_offset = ctx.input.get("next_offset").and_then(Value::as_u64).unwrap_or(0);
        let mut params = ctx.params.clone();
        params.insert("offset".into(), Value::from(next_offset));

        let job = JobDraft::new(ctx.workflow_id.clone(), ctx.platform.clone())
            .priority(priority::LOW)
            .params(params)
            .current_node(NodeId::new(&config.resume_node))
            .create(&self.clock);
        self.queue.enqueue(&job, QueueDiscipline::Priority).await?;

        tracing::info!(
            platform = %ctx.platform,
            continuation = %job.job_id,
            remaining,
            next_offset,
            "sweep continuation enqueued"
        );

        Ok(TypedOutput::new(ContinuationOutput {
            continued: true,
            continuation_job_id: Some(job.job_id.to_string()),
        }))
    }
}

#[cfg(test)]
#[path = "continuation_tests.rs"]
mod tests;
