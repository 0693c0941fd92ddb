// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-platform cooldown specs: a platform rests after completing a job.

use super::prelude::*;

const TRIVIAL_FLOW: &str = r#"
workflow "A-update-v2" {
  start_node = "a"
  node "a" {
    type   = "set_values"
    config = { done = true }
  }
}
"#;

#[tokio::test]
async fn completed_platform_rests_for_the_cooldown() {
    let world = World::with_platforms(&["A"]);
    world.insert_workflow(TRIVIAL_FLOW);
    let scheduler = world.scheduler();
    let worker = world.worker("A", world.registry());

    // Schedule and execute one job to completion; the worker stamps
    // last_completed_at for the platform.
    scheduler.tick().await.unwrap().expect("first job scheduled");
    let poll = worker.poll_once().await.unwrap();
    assert!(matches!(poll, WorkerPoll::Executed(_, ExecutionOutcome::Completed)));

    // Queue empty, no lock held, global delay elapsed, but the platform
    // cooldown has not.
    world.clock.advance(world.settings.scheduler.inter_platform_delay());
    assert!(scheduler.tick().await.unwrap().is_none());

    world.clock.advance(Duration::from_secs(29));
    assert!(scheduler.tick().await.unwrap().is_none());

    // At the full cooldown the platform is eligible again.
    world.clock.advance(Duration::from_secs(1));
    assert!(scheduler.tick().await.unwrap().is_some());
}

#[tokio::test]
async fn cooldown_applies_per_platform() {
    let world = World::with_platforms(&["A", "B"]);
    world.insert_workflow(TRIVIAL_FLOW);
    let scheduler = world.scheduler();
    let worker_a = world.worker("A", world.registry());

    scheduler.tick().await.unwrap().expect("A scheduled");
    worker_a.poll_once().await.unwrap();

    // B is untouched by A's cooldown: the next eligible walk picks it.
    world.clock.advance(world.settings.scheduler.inter_platform_delay());
    let (platform, _) = scheduler.tick().await.unwrap().expect("B scheduled");
    assert_eq!(platform, "B");
}
