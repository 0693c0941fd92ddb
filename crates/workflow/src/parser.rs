// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HCL workflow parsing.

use crate::definition::{NodeDef, RetryPolicy, WorkflowDef};
use crate::error::WorkflowError;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use sweep_core::{NodeId, WorkflowId};

#[derive(Debug, Deserialize)]
struct WorkflowFile {
    workflow: IndexMap<String, WorkflowBody>,
}

#[derive(Debug, Deserialize)]
struct WorkflowBody {
    start_node: NodeId,
    #[serde(default, rename = "node")]
    nodes: IndexMap<String, NodeBody>,
}

#[derive(Debug, Deserialize)]
struct NodeBody {
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default = "empty_config")]
    config: Value,
    #[serde(default)]
    next_nodes: Vec<NodeId>,
    #[serde(default)]
    retry: Option<RetryPolicy>,
}

fn empty_config() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Parse one workflow document and validate it.
///
/// The file must contain exactly one `workflow "id" { ... }` block;
/// `${var}` template strings inside node configs survive as literals for
/// the engine to resolve against job params.
pub fn parse_workflow(content: &str) -> Result<WorkflowDef, WorkflowError> {
    let file: WorkflowFile = hcl::from_str(content)?;

    let mut blocks = file.workflow.into_iter();
    let (id, body) = match (blocks.next(), blocks.next()) {
        (Some(block), None) => block,
        (None, _) => {
            return Err(WorkflowError::Invalid {
                workflow: "<unnamed>".into(),
                message: "document contains no workflow block".into(),
            })
        }
        (Some((first, _)), Some(_)) => {
            return Err(WorkflowError::Invalid {
                workflow: first,
                message: "document contains more than one workflow block".into(),
            })
        }
    };

    let nodes = body
        .nodes
        .into_iter()
        .map(|(node_id, node)| {
            let id = NodeId::new(&node_id);
            let def = NodeDef {
                id: id.clone(),
                node_type: node.node_type,
                config: node.config,
                next_nodes: node.next_nodes,
                retry: node.retry,
            };
            (id, def)
        })
        .collect();

    let def = WorkflowDef { id: WorkflowId::new(id), start_node: body.start_node, nodes };
    def.validate()?;
    Ok(def)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
