// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global pacing specs: at most one platform enqueue per
//! inter-platform delay.

use super::prelude::*;

#[tokio::test]
async fn platforms_space_out_thirty_seconds_apart() {
    let world = World::with_platforms(&["A", "B", "C"]);
    let scheduler = world.scheduler();
    let start = world.clock.epoch_ms();

    // Tick once per second for two minutes, recording every enqueue.
    let mut enqueues: Vec<(u64, String)> = Vec::new();
    for _ in 0..121 {
        if let Some((platform, _)) = scheduler.tick().await.unwrap() {
            enqueues.push((world.clock.epoch_ms() - start, platform.to_string()));
            // The job is consumed promptly; queues stay empty.
            world.queue.clear_queue(&platform).await.unwrap();
        }
        world.clock.advance(Duration::from_secs(1));
    }

    let expected: Vec<(u64, String)> = vec![
        (0, "A".into()),
        (30_000, "B".into()),
        (60_000, "C".into()),
        (90_000, "A".into()),
        (120_000, "B".into()),
    ];
    assert_eq!(enqueues, expected);
}

#[tokio::test]
async fn consecutive_enqueues_never_violate_the_gap() {
    let world = World::with_platforms(&["A", "B"]);
    let scheduler = world.scheduler();
    let delay = world.settings.scheduler.inter_platform_delay_ms;

    let mut timestamps = Vec::new();
    for _ in 0..300 {
        if let Some((platform, _)) = scheduler.tick().await.unwrap() {
            timestamps.push(world.clock.epoch_ms());
            world.queue.clear_queue(&platform).await.unwrap();
        }
        world.clock.advance(Duration::from_secs(1));
    }

    assert!(timestamps.len() > 2);
    for pair in timestamps.windows(2) {
        assert!(pair[1] - pair[0] >= delay, "enqueues {} and {} too close", pair[0], pair[1]);
    }
}
