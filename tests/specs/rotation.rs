// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-sale/off-sale rotation specs.
//!
//! Ratio 4 means: four on-sale jobs, then one off-sale job, repeating.

use super::prelude::*;

#[tokio::test]
async fn ten_enqueues_follow_the_on_off_pattern() {
    let world = World::with_platforms(&["A"]);
    let scheduler = world.scheduler();

    let mut observed = Vec::new();
    for _ in 0..10 {
        let (platform, job_id) = scheduler
            .tick()
            .await
            .expect("tick")
            .expect("platform A is always eligible");
        let job = world.queue.get(&job_id).await.unwrap().unwrap();
        observed.push(job.params["sale_status"].as_str().unwrap().to_string());

        // Consume the job and step past the pacing gates; completion is
        // never stamped, so only the global delay applies.
        world.queue.clear_queue(&platform).await.unwrap();
        world.clock.advance(world.settings.scheduler.inter_platform_delay());
    }

    assert_eq!(
        observed,
        vec![
            "on_sale", "on_sale", "on_sale", "on_sale", "off_sale", "on_sale", "on_sale",
            "on_sale", "on_sale", "off_sale"
        ]
    );
}

#[tokio::test]
async fn counter_state_survives_between_ticks() {
    let world = World::with_platforms(&["A"]);
    let scheduler = world.scheduler();
    let platform = Platform::new("A");

    for _ in 0..3 {
        scheduler.tick().await.unwrap();
        world.queue.clear_queue(&platform).await.unwrap();
        world.clock.advance(world.settings.scheduler.inter_platform_delay());
    }

    let state = world.scheduler_state.platform_state(&platform).await.unwrap();
    assert_eq!(state.on_sale_counter, 3);
}
