// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stuck-job force release specs.

use super::prelude::*;
use sweep_storage::RunningJob;

#[tokio::test]
async fn two_hour_stuck_job_is_failed_and_lock_freed() {
    let world = World::with_platforms(&["A"]);
    let admin = world.admin();
    let platform = Platform::new("A");

    // A worker took the lock and started a job, then wedged.
    let mut job = world.pending_job("A-update-v2", "A");
    job.mark_running(&world.clock);
    world.queue.update(&job).await.unwrap();
    assert!(world.lock.acquire(&platform).await.unwrap());
    world
        .lock
        .set_running_job(
            &platform,
            &RunningJob {
                job_id: job.job_id,
                workflow_id: job.workflow_id.clone(),
                started_at: world.clock.now_utc(),
            },
        )
        .await
        .unwrap();

    world.clock.advance(Duration::from_secs(2 * 3600));
    let running = admin.running_jobs().await.unwrap();
    assert_eq!(running[0].elapsed_secs, 7200);

    let report = admin.force_release(&platform).await.unwrap();
    assert!(report.had_running_job);

    let stored = world.queue.get(&job.job_id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(
        stored.error.unwrap().message,
        "Force released via API — stuck job detected"
    );
    assert!(!world.lock.is_locked(&platform).await.unwrap());
    assert!(world.lock.running_job(&platform).await.unwrap().is_none());
}

#[tokio::test]
async fn released_platform_schedules_again() {
    let world = World::with_platforms(&["A"]);
    let admin = world.admin();
    let scheduler = world.scheduler();
    let platform = Platform::new("A");

    world
        .lock
        .set_running_job(
            &platform,
            &RunningJob {
                job_id: world.pending_job("A-update-v2", "A").job_id,
                workflow_id: "A-update-v2".into(),
                started_at: world.clock.now_utc(),
            },
        )
        .await
        .unwrap();

    // Blocked while the running-job record exists.
    assert!(scheduler.tick().await.unwrap().is_none());

    admin.force_release(&platform).await.unwrap();
    assert!(scheduler.tick().await.unwrap().is_some());
}
