// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DAG execution specs: parallel levels, merge order, join semantics.

use super::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn parallel_writers_merge_last_completion_wins() {
    let world = World::with_platforms(&["A"]);
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = world.registry();
    {
        let log = log.clone();
        registry.register("record", move || Box::new(Recorder { log: log.clone() }));
    }
    registry.register("sleep_emit", || Box::new(SleepEmit));

    world.insert_workflow(
        r#"
        workflow "diamond" {
          start_node = "n1"
          node "n1" {
            type       = "record"
            next_nodes = ["n2", "n3"]
          }
          node "n2" {
            type       = "sleep_emit"
            config     = { ms = 80, key = "k", value = "v2" }
            next_nodes = ["n4"]
          }
          node "n3" {
            type       = "sleep_emit"
            config     = { ms = 20, key = "k", value = "v3" }
            next_nodes = ["n4"]
          }
          node "n4" {
            type = "record"
          }
        }
        "#,
    );

    let engine = world.engine(registry);
    let job = world.pending_job("diamond", "A");
    let (job, outcome) = engine.execute(job, None).await.unwrap();

    assert_eq!(outcome, ExecutionOutcome::Completed);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 1.0);
    // n2 completed after n3: its write wins the collision.
    assert_eq!(job.result["k"], json!("v2"));
    // The join node ran exactly once, after both branches.
    assert_eq!(log.lock().clone(), vec!["n1".to_string(), "n4".to_string()]);
}

#[tokio::test]
async fn continuation_job_resumes_mid_workflow() {
    let world = World::with_platforms(&["A"]);
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = world.registry();
    {
        let log = log.clone();
        registry.register("record", move || Box::new(Recorder { log: log.clone() }));
    }

    world.insert_workflow(
        r#"
        workflow "resumable" {
          start_node = "first"
          node "first" {
            type       = "record"
            next_nodes = ["second"]
          }
          node "second" {
            type = "record"
          }
        }
        "#,
    );

    // A continuation job enters the queue with current_node preset, as
    // enqueue_continuation produces them.
    let engine = world.engine(registry);
    let mut job = world.pending_job("resumable", "A");
    job.current_node = Some(NodeId::new("second"));

    let (job, outcome) = engine.execute(job, None).await.unwrap();
    assert_eq!(outcome, ExecutionOutcome::Completed);
    assert_eq!(job.status, JobStatus::Completed);
    // Only the resumed node ran; its predecessor counts as executed.
    assert_eq!(log.lock().clone(), vec!["second".to_string()]);
}

#[tokio::test]
async fn sweep_continuation_round_trip() {
    let world = World::with_platforms(&["A"]);

    // Three products, but each run only scans two.
    for i in 0..3 {
        let url = format!("https://A.example/item/{i}");
        world.products.seed(
            "A",
            sweep_core::SaleStatus::OnSale,
            sweep_adapters::ProductRef {
                product_id: i,
                code: format!("P{i}"),
                url: url.clone(),
            },
        );
        world.scraper.put_product(
            url,
            sweep_adapters::ProductRecord {
                code: format!("P{i}"),
                name: format!("Product {i}"),
                price: Some(100),
                available: true,
                thumbnail_url: None,
            },
        );
    }

    world.insert_workflow(
        r#"
        workflow "A-update-v2" {
          start_node = "load_products"
          node "load_products" {
            type       = "extract_by_product_set"
            config     = { sale_status = "${sale_status}", limit = 2, batch_size = 2 }
            next_nodes = ["write_results"]
          }
          node "write_results" {
            type       = "write_results"
            next_nodes = ["continue"]
          }
          node "continue" {
            type   = "enqueue_continuation"
            config = { resume_node = "load_products" }
          }
        }
        "#,
    );

    let mut params = Params::new();
    params.insert("sale_status".into(), json!("on_sale"));

    let engine = world.engine(world.registry());
    let platform = Platform::new("A");

    let job = JobDraft::new("A-update-v2", "A").params(params).create(&world.clock);
    let (first, outcome) = engine.execute(job, None).await.unwrap();
    assert_eq!(outcome, ExecutionOutcome::Completed);
    assert_eq!(first.result["scanned"], json!(2));
    assert_eq!(first.result["remaining"], json!(1));
    assert_eq!(first.result["continued"], json!(true));

    // The successor sits in the queue at LOW priority with the cursor.
    let successor = world
        .queue
        .dequeue(&platform, QueueDiscipline::Priority)
        .await
        .unwrap()
        .expect("continuation queued");
    assert_eq!(successor.priority, priority::LOW);
    assert_eq!(successor.params["offset"], json!(2));
    assert_eq!(successor.current_node, Some(NodeId::new("load_products")));

    // Running the successor finishes the sweep and stops continuing.
    let (second, outcome) = engine.execute(successor, None).await.unwrap();
    assert_eq!(outcome, ExecutionOutcome::Completed);
    assert_eq!(second.result["scanned"], json!(1));
    assert_eq!(second.result["remaining"], json!(0));
    assert_eq!(second.result["continued"], json!(false));

    // All three products were persisted across the two runs.
    assert_eq!(world.products.upserted_count(), 3);
}
