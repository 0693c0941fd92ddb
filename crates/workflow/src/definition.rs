// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow DAG definition and load-time validation.

use crate::error::WorkflowError;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use sweep_core::{NodeId, WorkflowId};

/// Per-node retry policy: up to `max_attempts` calls with linear backoff
/// (`attempt * backoff_ms` between attempts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: default_max_attempts(), backoff_ms: 0 }
    }
}

fn default_max_attempts() -> u32 {
    1
}

/// One step of a workflow.
#[derive(Debug, Clone)]
pub struct NodeDef {
    pub id: NodeId,
    pub node_type: String,
    /// Raw config; `${var}` tokens are resolved against job params at
    /// execution time.
    pub config: Value,
    pub next_nodes: Vec<NodeId>,
    pub retry: Option<RetryPolicy>,
}

impl NodeDef {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.unwrap_or_default()
    }
}

/// A validated DAG of nodes.
#[derive(Debug, Clone)]
pub struct WorkflowDef {
    pub id: WorkflowId,
    pub start_node: NodeId,
    pub nodes: IndexMap<NodeId, NodeDef>,
}

impl WorkflowDef {
    pub fn node(&self, id: &NodeId) -> Option<&NodeDef> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// For each node, the set of nodes whose `next_nodes` point at it.
    pub fn predecessor_map(&self) -> HashMap<NodeId, HashSet<NodeId>> {
        let mut predecessors: HashMap<NodeId, HashSet<NodeId>> =
            self.nodes.keys().map(|id| (id.clone(), HashSet::new())).collect();
        for (id, node) in &self.nodes {
            for next in &node.next_nodes {
                if let Some(entry) = predecessors.get_mut(next) {
                    entry.insert(id.clone());
                }
            }
        }
        predecessors
    }

    /// Check edge integrity and acyclicity of the static graph.
    ///
    /// Nodes unreachable from `start_node` are legal: dynamic routing via
    /// a node's returned next-nodes may still reach them.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if !self.nodes.contains_key(&self.start_node) {
            return Err(self.invalid(format!("start_node '{}' is not defined", self.start_node)));
        }

        for (id, node) in &self.nodes {
            for next in &node.next_nodes {
                if !self.nodes.contains_key(next) {
                    return Err(self.invalid(format!(
                        "node '{id}' references undefined node '{next}'"
                    )));
                }
            }
        }

        self.check_acyclic()?;
        Ok(())
    }

    /// Depth-first cycle detection over the static edges.
    fn check_acyclic(&self) -> Result<(), WorkflowError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        let mut marks: HashMap<&NodeId, Mark> = HashMap::new();
        // Iterative DFS with an explicit stack; (node, child index) frames.
        for root in self.nodes.keys() {
            if marks.contains_key(root) {
                continue;
            }
            let mut stack: Vec<(&NodeId, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::Visiting);

            while let Some((id, child)) = stack.pop() {
                let node = match self.nodes.get(id) {
                    Some(n) => n,
                    None => continue,
                };
                if child < node.next_nodes.len() {
                    stack.push((id, child + 1));
                    let next = &node.next_nodes[child];
                    match marks.get(next) {
                        Some(Mark::Visiting) => {
                            return Err(self.invalid(format!(
                                "cycle detected through node '{next}'"
                            )));
                        }
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(next, Mark::Visiting);
                            stack.push((next, 0));
                        }
                    }
                } else {
                    marks.insert(id, Mark::Done);
                }
            }
        }
        Ok(())
    }

    fn invalid(&self, message: String) -> WorkflowError {
        WorkflowError::Invalid { workflow: self.id.to_string(), message }
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
