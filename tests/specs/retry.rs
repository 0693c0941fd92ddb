// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy specs.

use super::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn exhausted_retries_fail_the_job_with_linear_backoff() {
    let world = World::with_platforms(&["A"]);
    let calls = Arc::new(AtomicU32::new(0));
    let mut registry = world.registry();
    {
        let calls = calls.clone();
        registry.register("always_fail", move || Box::new(AlwaysFail { calls: calls.clone() }));
    }

    world.insert_workflow(
        r#"
        workflow "flaky" {
          start_node = "warmup"
          node "warmup" {
            type       = "set_values"
            config     = { ready = true }
            next_nodes = ["boom"]
          }
          node "boom" {
            type = "always_fail"
            retry {
              max_attempts = 3
              backoff_ms   = 100
            }
          }
        }
        "#,
    );

    let engine = world.engine(registry);
    let job = world.pending_job("flaky", "A");

    let started = tokio::time::Instant::now();
    let (job, outcome) = engine.execute(job, None).await.unwrap();

    assert_eq!(outcome, ExecutionOutcome::Failed);
    assert_eq!(job.status, JobStatus::Failed);

    // Exactly three invocations, with 100ms then 200ms between them.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(300));

    let error = job.error.expect("failure recorded");
    assert_eq!(error.node_id, Some(NodeId::new("boom")));
    assert!(error.message.contains("503"));

    // One of the two nodes completed before the failure.
    assert_eq!(job.progress, 0.5);
}

#[tokio::test(start_paused = true)]
async fn node_recovers_within_its_retry_budget() {
    let world = World::with_platforms(&["A"]);
    world.scraper.put_product(
        "https://A.example/item/1",
        sweep_adapters::ProductRecord {
            code: "P1".into(),
            name: "Product 1".into(),
            price: Some(100),
            available: true,
            thumbnail_url: None,
        },
    );
    // The first two fetches time out; the third succeeds.
    world.scraper.fail_times("https://A.example/item/1", 2);

    world.insert_workflow(
        r#"
        workflow "probe" {
          start_node = "fetch"
          node "fetch" {
            type   = "extract_by_url"
            config = { url = "https://A.example/item/1" }
            retry {
              max_attempts = 3
              backoff_ms   = 50
            }
          }
        }
        "#,
    );

    let engine = world.engine(world.registry());
    let job = world.pending_job("probe", "A");
    let (job, outcome) = engine.execute(job, None).await.unwrap();

    assert_eq!(outcome, ExecutionOutcome::Completed);
    assert_eq!(job.result["status"], json!("found"));
    assert_eq!(world.scraper.fetched().len(), 3);
}
