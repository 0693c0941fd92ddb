// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow engine: executes one job's DAG to completion.
//!
//! Same-level nodes run concurrently; their outputs merge into the
//! accumulated map in completion order, last-writer-wins. Progress and
//! `current_node` persist after every level so an interrupted job can be
//! resumed (or continued by a successor job) from where it stopped.

use crate::error::{EngineError, NodeError};
use crate::job_logger::JobLogger;
use crate::kill::KillSignal;
use crate::node::{NodeContext, NodeOutput};
use crate::registry::NodeRegistry;
use crate::retry::execute_with_retry;
use crate::shared_state::{JobSharedState, SharedStateMap};
use futures::stream::{FuturesUnordered, StreamExt};
use indexmap::IndexSet;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use sweep_core::{Clock, Job, NodeId, Params, Platform, PlatformConfig};
use sweep_storage::{JobQueueRepo, StateStore};
use sweep_workflow::{substitute, NodeDef, WorkflowDef, WorkflowLibrary};

/// How a job execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Completed,
    Failed,
    /// A kill flag interrupted the job between node levels.
    Killed,
}

pub struct WorkflowEngine<S, C> {
    queue: Arc<JobQueueRepo<S, C>>,
    library: Arc<WorkflowLibrary>,
    registry: Arc<NodeRegistry>,
    shared: SharedStateMap,
    logger: Arc<JobLogger>,
    platforms: Vec<PlatformConfig>,
    clock: C,
}

impl<S: StateStore, C: Clock> WorkflowEngine<S, C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<JobQueueRepo<S, C>>,
        library: Arc<WorkflowLibrary>,
        registry: Arc<NodeRegistry>,
        shared: SharedStateMap,
        logger: Arc<JobLogger>,
        platforms: Vec<PlatformConfig>,
        clock: C,
    ) -> Self {
        Self { queue, library, registry, shared, logger, platforms, clock }
    }

    pub fn shared_state(&self) -> &SharedStateMap {
        &self.shared
    }

    /// Execute a job to a terminal state. Job-level problems land on the
    /// job record; only store failures surface as errors. The job's
    /// shared-state entry is discarded on every exit path.
    pub async fn execute(
        &self,
        mut job: Job,
        kill: Option<&KillSignal<S>>,
    ) -> Result<(Job, ExecutionOutcome), EngineError> {
        let def = match self.library.load(&job.workflow_id) {
            Ok(def) => def,
            Err(error) => {
                tracing::error!(job = %job.job_id, workflow = %job.workflow_id, error = %error, "workflow unavailable");
                job.mark_failed(format!("workflow unavailable: {error}"), None, &self.clock);
                self.queue.update(&job).await?;
                self.shared.discard(&job.job_id);
                return Ok((job, ExecutionOutcome::Failed));
            }
        };

        let result = self.run_dag(&mut job, &def, kill).await;
        self.shared.discard(&job.job_id);
        let outcome = result?;
        Ok((job, outcome))
    }

    async fn run_dag(
        &self,
        job: &mut Job,
        def: &WorkflowDef,
        kill: Option<&KillSignal<S>>,
    ) -> Result<ExecutionOutcome, EngineError> {
        let predecessors = def.predecessor_map();
        let total = def.node_count().max(1);

        let mut executed: HashSet<NodeId> = HashSet::new();
        let mut pending: IndexSet<NodeId> = IndexSet::new();

        // Resume case: start from the persisted node with its
        // predecessors treated as already executed.
        match &job.current_node {
            Some(node) => match predecessors.get(node) {
                Some(preds) => {
                    executed.extend(preds.iter().cloned());
                    pending.insert(node.clone());
                }
                None => {
                    job.mark_failed(
                        format!("current_node '{node}' is not part of workflow '{}'", def.id),
                        None,
                        &self.clock,
                    );
                    self.queue.update(job).await?;
                    return Ok(ExecutionOutcome::Failed);
                }
            },
            None => {
                pending.insert(def.start_node.clone());
            }
        }

        let mut accumulated = job.params.clone();
        accumulated.insert("job_id".into(), Value::String(job.job_id.to_string()));
        if let Some(started) = job.started_at {
            accumulated.insert("job_started_at".into(), Value::String(started.to_rfc3339()));
        }

        let shared = self.shared.handle(job.job_id);
        shared.insert("job_params", Value::Object(job.params.clone()));

        while !pending.is_empty() {
            if let Some(kill) = kill {
                if kill.is_set().await {
                    tracing::warn!(job = %job.job_id, platform = %job.platform, "kill flag observed, abandoning job");
                    self.logger.append_job(&job.job_id, "abandoned: worker restart requested");
                    job.mark_failed(
                        "worker restart requested",
                        job.current_node.clone(),
                        &self.clock,
                    );
                    self.queue.update(job).await?;
                    return Ok(ExecutionOutcome::Killed);
                }
            }

            let executable: Vec<NodeId> = pending
                .iter()
                .filter(|node| {
                    predecessors.get(*node).map(|p| p.is_subset(&executed)).unwrap_or(false)
                })
                .cloned()
                .collect();

            if executable.is_empty() {
                tracing::error!(
                    job = %job.job_id,
                    workflow = %def.id,
                    pending = ?pending,
                    "workflow deadlock: pending nodes have unmet predecessors"
                );
                job.mark_failed("workflow deadlock detected", None, &self.clock);
                self.queue.update(job).await?;
                return Ok(ExecutionOutcome::Failed);
            }

            job.current_node = Some(executable[0].clone());
            self.queue.update(job).await?;

            let level = self.run_level(def, job, &executable, &accumulated, &shared).await;

            // First failure in completion order fails the whole step;
            // sibling outputs from the same level are not merged.
            if let Some((node_id, error)) =
                level.iter().find_map(|(id, r)| r.as_ref().err().map(|e| (id.clone(), e)))
            {
                tracing::error!(job = %job.job_id, node = %node_id, error = %error, "node failed");
                self.logger.append(&job.job_id, &node_id, &format!("failed: {error}"));
                job.mark_failed(error.to_string(), Some(node_id), &self.clock);
                self.queue.update(job).await?;
                return Ok(ExecutionOutcome::Failed);
            }

            for (node_id, result) in level {
                let output = match result {
                    Ok(output) => output,
                    Err(_) => continue,
                };

                for (key, value) in output.data {
                    accumulated.insert(key, value);
                }
                executed.insert(node_id.clone());
                pending.shift_remove(&node_id);

                let next_nodes = match output.next_nodes {
                    Some(dynamic) => dynamic,
                    None => match def.node(&node_id) {
                        Some(node) => node.next_nodes.clone(),
                        None => Vec::new(),
                    },
                };
                for next in next_nodes {
                    if !def.nodes.contains_key(&next) {
                        job.mark_failed(
                            format!("node '{node_id}' routed to undefined node '{next}'"),
                            Some(node_id.clone()),
                            &self.clock,
                        );
                        self.queue.update(job).await?;
                        return Ok(ExecutionOutcome::Failed);
                    }
                    if !executed.contains(&next) && !pending.contains(&next) {
                        pending.insert(next);
                    }
                }
            }

            job.progress = executed.len() as f64 / total as f64;
            self.queue.update(job).await?;
        }

        job.current_node = None;
        job.mark_completed(accumulated, &self.clock);
        self.queue.update(job).await?;
        tracing::info!(job = %job.job_id, workflow = %def.id, "job completed");
        self.logger.append_job(&job.job_id, "completed");
        Ok(ExecutionOutcome::Completed)
    }

    /// Execute one DAG level; results arrive in completion order.
    async fn run_level(
        &self,
        def: &WorkflowDef,
        job: &Job,
        executable: &[NodeId],
        accumulated: &Params,
        shared: &JobSharedState,
    ) -> Vec<(NodeId, Result<NodeOutput, NodeError>)> {
        if let [node_id] = executable {
            let result = self.run_node(def, job, node_id, accumulated, shared).await;
            return vec![(node_id.clone(), result)];
        }

        let mut in_flight = FuturesUnordered::new();
        for node_id in executable {
            in_flight.push(async move {
                let result = self.run_node(def, job, node_id, accumulated, shared).await;
                (node_id.clone(), result)
            });
        }

        let mut level = Vec::with_capacity(executable.len());
        while let Some(completed) = in_flight.next().await {
            level.push(completed);
        }
        level
    }

    async fn run_node(
        &self,
        def: &WorkflowDef,
        job: &Job,
        node_id: &NodeId,
        accumulated: &Params,
        shared: &JobSharedState,
    ) -> Result<NodeOutput, NodeError> {
        let node = def
            .node(node_id)
            .ok_or_else(|| NodeError::Validation(format!("node '{node_id}' is not defined")))?;
        if !self.registry.contains(&node.node_type) {
            return Err(NodeError::Validation(format!(
                "unknown node type '{}'",
                node.node_type
            )));
        }

        let ctx = self.node_context(node, job, accumulated, shared);
        let policy = node.retry_policy();
        execute_with_retry(&policy, || async {
            let strategy = self.registry.create(&node.node_type).ok_or_else(|| {
                NodeError::Validation(format!("unknown node type '{}'", node.node_type))
            })?;
            strategy.execute(&ctx).await
        })
        .await
    }

    fn node_context(
        &self,
        node: &NodeDef,
        job: &Job,
        accumulated: &Params,
        shared: &JobSharedState,
    ) -> NodeContext {
        NodeContext {
            job_id: job.job_id,
            workflow_id: job.workflow_id.clone(),
            node_id: node.id.clone(),
            config: substitute(&node.config, &job.params),
            input: accumulated.clone(),
            params: job.params.clone(),
            platform: job.platform.clone(),
            platform_config: self.platform_config(&job.platform),
            shared: shared.clone(),
            logger: self.logger.clone(),
        }
    }

    fn platform_config(&self, platform: &Platform) -> Option<PlatformConfig> {
        self.platforms.iter().find(|config| config.name == *platform).cloned()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
