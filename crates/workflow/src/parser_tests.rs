// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const UPDATE_FLOW: &str = r#"
workflow "gmarket-update-v2" {
  start_node = "load_products"

  node "load_products" {
    type       = "extract_by_product_set"
    config     = { sale_status = "${sale_status}", limit = "${limit}" }
    next_nodes = ["write_results"]

    retry {
      max_attempts = 3
      backoff_ms   = 1000
    }
  }

  node "write_results" {
    type = "write_results"
  }
}
"#;

#[test]
fn parses_nodes_edges_and_retry() {
    let def = parse_workflow(UPDATE_FLOW).unwrap();

    assert_eq!(def.id, "gmarket-update-v2");
    assert_eq!(def.start_node, NodeId::new("load_products"));
    assert_eq!(def.node_count(), 2);

    let load = def.node(&NodeId::new("load_products")).unwrap();
    assert_eq!(load.node_type, "extract_by_product_set");
    assert_eq!(load.next_nodes, vec![NodeId::new("write_results")]);
    let retry = load.retry.unwrap();
    assert_eq!(retry.max_attempts, 3);
    assert_eq!(retry.backoff_ms, 1000);

    // Template strings survive parsing for the engine to resolve.
    assert_eq!(load.config["sale_status"], Value::String("${sale_status}".into()));
}

#[test]
fn optional_fields_default() {
    let def = parse_workflow(UPDATE_FLOW).unwrap();
    let write = def.node(&NodeId::new("write_results")).unwrap();

    assert!(write.next_nodes.is_empty());
    assert!(write.retry.is_none());
    assert_eq!(write.config, Value::Object(serde_json::Map::new()));
    assert_eq!(write.retry_policy().max_attempts, 1);
}

#[test]
fn config_values_keep_their_types() {
    let def = parse_workflow(
        r#"
        workflow "typed" {
          start_node = "n"
          node "n" {
            type   = "set_values"
            config = { count = 3, enabled = true, name = "x", tags = ["a", "b"] }
          }
        }
        "#,
    )
    .unwrap();

    let config = &def.node(&NodeId::new("n")).unwrap().config;
    assert_eq!(config["count"], Value::from(3));
    assert_eq!(config["enabled"], Value::Bool(true));
    assert_eq!(config["name"], Value::String("x".into()));
    assert_eq!(config["tags"], serde_json::json!(["a", "b"]));
}

#[test]
fn empty_document_is_rejected() {
    assert!(matches!(parse_workflow(""), Err(WorkflowError::Parse(_) | WorkflowError::Invalid { .. })));
}

#[test]
fn two_workflow_blocks_are_rejected() {
    let err = parse_workflow(
        r#"
        workflow "a" {
          start_node = "n"
          node "n" { type = "set_values" }
        }
        workflow "b" {
          start_node = "n"
          node "n" { type = "set_values" }
        }
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("more than one"));
}

#[test]
fn invalid_graph_fails_at_parse_time() {
    let err = parse_workflow(
        r#"
        workflow "broken" {
          start_node = "n"
          node "n" {
            type       = "set_values"
            next_nodes = ["missing"]
          }
        }
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, WorkflowError::Invalid { .. }));
}
