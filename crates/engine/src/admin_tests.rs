// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{platform_config, Harness};
use std::time::Duration;
use sweep_core::{JobDraft, JobStatus, MonitorTaskDef, Params, Settings};
use sweep_storage::{QueueDiscipline, RunningJob};

fn admin_harness() -> (Harness, AdminSurface<crate::test_helpers::MemStore, sweep_core::FakeClock>)
{
    let mut settings = Settings::default();
    settings.platforms = vec![platform_config("gmarket"), platform_config("coupang")];
    settings.monitor_tasks = vec![MonitorTaskDef {
        id: "banner".into(),
        name: "Main banner".into(),
        interval_ms: 600_000,
        workflow: "banner-monitor-v1".into(),
    }];
    let harness = Harness::with_settings(settings);
    let admin = AdminSurface::new(
        harness.store.clone(),
        harness.queue.clone(),
        harness.lock.clone(),
        harness.scheduler_state.clone(),
        harness.monitor_state.clone(),
        harness.settings.platforms.clone(),
        harness.settings.monitor_tasks.clone(),
        harness.settings.worker.clone(),
        harness.clock.clone(),
    );
    (harness, admin)
}

#[tokio::test]
async fn enable_flags_roundtrip() {
    let (_harness, admin) = admin_harness();

    admin.set_scheduler_enabled(false).await.unwrap();
    assert!(!admin.scheduler_status().await.unwrap().enabled);
    admin.set_scheduler_enabled(true).await.unwrap();
    assert!(admin.scheduler_status().await.unwrap().enabled);

    admin.set_watcher_enabled(false).await.unwrap();
    assert!(!admin.watcher_status().await.unwrap().enabled);
}

#[tokio::test]
async fn queue_lengths_cover_platforms_and_monitor_tasks() {
    let (harness, admin) = admin_harness();

    let job = JobDraft::new("gmarket-update-v2", "gmarket").create(&harness.clock);
    harness.queue.enqueue(&job, QueueDiscipline::Priority).await.unwrap();

    let lengths = admin.queue_lengths().await.unwrap();
    assert_eq!(lengths.len(), 3);
    let by_platform: std::collections::HashMap<String, u64> =
        lengths.iter().map(|e| (e.platform.to_string(), e.length)).collect();
    assert_eq!(by_platform["gmarket"], 1);
    assert_eq!(by_platform["coupang"], 0);
    assert_eq!(by_platform["monitor-banner"], 0);
}

#[tokio::test]
async fn clear_all_queues_counts_every_entry() {
    let (harness, admin) = admin_harness();

    for platform in ["gmarket", "coupang"] {
        let job = JobDraft::new("w", platform).create(&harness.clock);
        harness.queue.enqueue(&job, QueueDiscipline::Priority).await.unwrap();
        harness.clock.advance(Duration::from_millis(1));
    }

    assert_eq!(admin.clear_all_queues().await.unwrap(), 2);
    assert_eq!(harness.queue.queue_length(&"gmarket".into()).await.unwrap(), 0);
}

#[tokio::test]
async fn force_release_fails_stuck_job_and_frees_lock() {
    let (harness, admin) = admin_harness();
    let platform = sweep_core::Platform::new("gmarket");

    // A job has been running for two hours under the platform lock.
    let mut job = JobDraft::new("gmarket-update-v2", "gmarket")
        .params(Params::new())
        .create(&harness.clock);
    job.mark_running(&harness.clock);
    harness.queue.update(&job).await.unwrap();
    assert!(harness.lock.acquire(&platform).await.unwrap());
    harness
        .lock
        .set_running_job(
            &platform,
            &RunningJob {
                job_id: job.job_id,
                workflow_id: job.workflow_id.clone(),
                started_at: harness.clock.now_utc(),
            },
        )
        .await
        .unwrap();
    harness.clock.advance(Duration::from_secs(7200));

    let running = admin.running_jobs().await.unwrap();
    assert_eq!(running.len(), 1);
    assert_eq!(running[0].elapsed_secs, 7200);

    let report = admin.force_release(&platform).await.unwrap();
    assert!(report.had_running_job);

    let stored = harness.queue.get(&job.job_id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(
        stored.error.expect("failure recorded").message,
        "Force released via API — stuck job detected"
    );
    assert!(!harness.lock.is_locked(&platform).await.unwrap());
    assert!(harness.lock.running_job(&platform).await.unwrap().is_none());
    assert!(admin.running_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn force_release_without_running_job_reports_false() {
    let (harness, admin) = admin_harness();
    let platform = sweep_core::Platform::new("gmarket");
    assert!(harness.lock.acquire(&platform).await.unwrap());

    let report = admin.force_release(&platform).await.unwrap();
    assert!(!report.had_running_job);
    assert!(!harness.lock.is_locked(&platform).await.unwrap());
}

#[tokio::test]
async fn restart_worker_raises_kill_flag() {
    let (harness, admin) = admin_harness();
    let platform = sweep_core::Platform::new("gmarket");

    admin.restart_worker(&platform).await.unwrap();
    assert!(KillSignal::new(harness.store.clone(), platform.clone()).is_set().await);

    // The flag expires on its own.
    harness.clock.advance(harness.settings.worker.kill_flag_ttl());
    assert!(!KillSignal::new(harness.store.clone(), platform).is_set().await);
}

#[tokio::test]
async fn monitor_task_states_report_eligibility() {
    let (harness, admin) = admin_harness();

    let states = admin.monitor_task_states().await.unwrap();
    assert_eq!(states.len(), 1);
    assert!(states[0].eligible);
    assert_eq!(states[0].completed_at, None);

    harness.monitor_state.set_completed_at("banner").await.unwrap();
    let states = admin.monitor_task_states().await.unwrap();
    assert!(!states[0].eligible);
    assert_eq!(states[0].completed_at, Some(harness.clock.epoch_ms()));
}
