// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::node::TypedNode;
use crate::test_helpers::{node_ctx, Harness};
use serde_json::json;
use sweep_core::Params;

fn node(
    harness: &Harness,
) -> CheckContentSurface<
    sweep_adapters::FakeScrapeAdapter,
    sweep_adapters::FakeContentSource,
    crate::test_helpers::MemStore,
    sweep_core::FakeClock,
> {
    CheckContentSurface::new(
        harness.scraper.clone(),
        harness.content.clone(),
        harness.monitor_state.clone(),
    )
}

#[tokio::test]
async fn reports_broken_links_and_stamps_task() {
    let harness = Harness::new();
    harness.content.put_link(Surface::Banner, "Sale banner", "https://shop.example/sale");
    harness.content.put_link(Surface::Banner, "Dead banner", "https://shop.example/dead");
    harness.scraper.put_broken_link("https://shop.example/dead", "404 not found");

    let mut params = Params::new();
    params.insert("task_id".into(), json!("banner"));
    let ctx = node_ctx(&harness, json!({}), params, "monitor-banner");

    let config = CheckSurfaceConfig { surface: "banner".into(), task_id: None };
    let output = node(&harness).run(config, &ctx).await.unwrap();

    assert_eq!(output.data.checked, 2);
    assert_eq!(output.data.broken_count, 1);
    assert_eq!(output.data.broken[0].url, "https://shop.example/dead");
    assert_eq!(output.data.broken[0].reason, "404 not found");

    // Bookkeeping is written by the node, not the watcher loop.
    assert_eq!(
        harness.monitor_state.completed_at("banner").await.unwrap(),
        Some(harness.clock.epoch_ms())
    );
    assert_eq!(harness.monitor_state.executed_total().await.unwrap(), 1);
}

#[tokio::test]
async fn config_task_id_overrides_params() {
    let harness = Harness::new();
    let mut params = Params::new();
    params.insert("task_id".into(), json!("from-params"));
    let ctx = node_ctx(&harness, json!({}), params, "monitor-banner");

    let config =
        CheckSurfaceConfig { surface: "vote".into(), task_id: Some("from-config".into()) };
    node(&harness).run(config, &ctx).await.unwrap();

    assert!(harness.monitor_state.completed_at("from-config").await.unwrap().is_some());
    assert!(harness.monitor_state.completed_at("from-params").await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_surface_is_a_validation_error() {
    let harness = Harness::new();
    let ctx = node_ctx(&harness, json!({}), Params::new(), "monitor-banner");

    let config = CheckSurfaceConfig { surface: "frontpage".into(), task_id: None };
    let result = node(&harness).run(config, &ctx).await;
    assert!(matches!(result, Err(NodeError::Validation(_))));
}

#[tokio::test]
async fn empty_surface_reports_zero_broken() {
    let harness = Harness::new();
    let mut params = Params::new();
    params.insert("task_id".into(), json!("pick"));
    let ctx = node_ctx(&harness, json!({}), params, "monitor-pick");

    let config = CheckSurfaceConfig { surface: "pick".into(), task_id: None };
    let output = node(&harness).run(config, &ctx).await.unwrap();

    assert_eq!(output.data.checked, 0);
    assert_eq!(output.data.broken_count, 0);
}
