// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup, task spawning, and shutdown.

use crate::env;
use crate::listener::AdminListener;
use std::path::PathBuf;
use std::sync::Arc;
use sweep_adapters::{ContentSource, Notifier, ProductStore, ScrapeAdapter};
use sweep_core::{ConfigError, Settings, SystemClock};
use sweep_engine::{
    builtin_registry, monitor::monitor_platform, AdminSurface, AlertWatcher, BuiltinServices,
    JobLogger, ScanDefaults, Scheduler, SharedStateMap, Worker, WorkflowEngine,
};
use sweep_storage::{
    JobQueueRepo, MonitorStateRepo, PlatformLock, QueueDiscipline, RateLimiter, RedisStore,
    SchedulerStateRepo, StoreError,
};
use sweep_workflow::WorkflowLibrary;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not resolve a state directory (set SWEEP_STATE_DIR)")]
    NoStateDir,

    #[error("required environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Resolved daemon configuration.
pub struct DaemonConfig {
    pub settings: Settings,
    pub store_url: String,
    pub socket_path: PathBuf,
    pub workflows_dir: PathBuf,
    pub log_dir: PathBuf,
}

/// Load configuration from the environment and `sweep.toml`.
pub fn load_config() -> Result<DaemonConfig, LifecycleError> {
    let state_dir = env::state_dir()?;
    std::fs::create_dir_all(&state_dir)?;

    let settings = Settings::load(env::config_path(&state_dir))?;
    Ok(DaemonConfig {
        settings,
        store_url: env::store_url(),
        socket_path: env::socket_path(&state_dir),
        workflows_dir: env::workflows_dir(&state_dir),
        log_dir: env::log_dir(&state_dir),
    })
}

/// Run the daemon to completion: build every component, spawn the loops,
/// serve the admin socket, and exit cleanly on SIGINT/SIGTERM or an
/// admin shutdown.
pub async fn run<A, P, T, N>(
    config: DaemonConfig,
    scraper: A,
    products: P,
    content: T,
    notifier: N,
) -> Result<(), LifecycleError>
where
    A: ScrapeAdapter,
    P: ProductStore,
    T: ContentSource,
    N: Notifier,
{
    let clock = SystemClock;
    let settings = config.settings;
    let store = Arc::new(RedisStore::connect(&config.store_url).await?);

    let queue = Arc::new(JobQueueRepo::new(store.clone(), clock.clone()));
    let lock = Arc::new(PlatformLock::new(
        store.clone(),
        clock.clone(),
        settings.worker.lock_ttl(),
    ));
    let scheduler_state = Arc::new(SchedulerStateRepo::new(
        store.clone(),
        clock.clone(),
        settings.scheduler.clone(),
    ));
    let monitor_state = Arc::new(MonitorStateRepo::new(store.clone(), clock.clone()));
    let ratelimit = Arc::new(RateLimiter::new(store.clone(), clock.clone()));
    let library = Arc::new(WorkflowLibrary::new(&config.workflows_dir));

    let registry = builtin_registry(BuiltinServices {
        queue: queue.clone(),
        monitor_state: monitor_state.clone(),
        ratelimit,
        scraper,
        products,
        content,
        notifier,
        clock: clock.clone(),
        defaults: ScanDefaults::from(&settings.scheduler),
    });
    let engine = Arc::new(WorkflowEngine::new(
        queue.clone(),
        library,
        Arc::new(registry),
        SharedStateMap::new(),
        Arc::new(JobLogger::new(&config.log_dir)),
        settings.platforms.clone(),
        clock.clone(),
    ));

    let shutdown = CancellationToken::new();
    let mut tasks = tokio::task::JoinSet::new();

    let scheduler = Arc::new(Scheduler::new(
        scheduler_state.clone(),
        queue.clone(),
        lock.clone(),
        settings.platforms.clone(),
        settings.scheduler.clone(),
        clock.clone(),
    ));
    {
        let scheduler = scheduler.clone();
        let token = shutdown.clone();
        tasks.spawn(async move { scheduler.run(token).await });
    }

    let watcher = Arc::new(AlertWatcher::new(
        monitor_state.clone(),
        queue.clone(),
        lock.clone(),
        settings.monitor_tasks.clone(),
        settings.watcher.clone(),
        clock.clone(),
    ));
    {
        let watcher = watcher.clone();
        let token = shutdown.clone();
        tasks.spawn(async move { watcher.run(token).await });
    }

    // One worker per platform queue, plus one per monitor-task queue.
    let worker_targets = settings
        .platforms
        .iter()
        .map(|p| (p.name.clone(), QueueDiscipline::Priority))
        .chain(
            settings
                .monitor_tasks
                .iter()
                .map(|t| (monitor_platform(&t.id), QueueDiscipline::Fifo)),
        );
    for (platform, discipline) in worker_targets {
        let worker = Arc::new(Worker::new(
            platform,
            discipline,
            queue.clone(),
            lock.clone(),
            scheduler_state.clone(),
            engine.clone(),
            store.clone(),
            settings.worker.clone(),
            clock.clone(),
        ));
        let token = shutdown.clone();
        tasks.spawn(async move { worker.run(token).await });
    }

    let admin = Arc::new(AdminSurface::new(
        store.clone(),
        queue.clone(),
        lock.clone(),
        scheduler_state.clone(),
        monitor_state.clone(),
        settings.platforms.clone(),
        settings.monitor_tasks.clone(),
        settings.worker.clone(),
        clock.clone(),
    ));

    // Stale socket from an unclean exit would fail the bind.
    match std::fs::remove_file(&config.socket_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    let unix_listener = UnixListener::bind(&config.socket_path)?;
    let listener = Arc::new(AdminListener::new(admin, shutdown.clone()));
    tasks.spawn(listener.serve(unix_listener));

    tracing::info!(
        platforms = settings.platforms.len(),
        monitor_tasks = settings.monitor_tasks.len(),
        socket = %config.socket_path.display(),
        "sweepd running"
    );

    wait_for_shutdown(&shutdown).await;
    shutdown.cancel();
    while tasks.join_next().await.is_some() {}

    let _ = std::fs::remove_file(&config.socket_path);
    tracing::info!("sweepd stopped");
    Ok(())
}

/// Block until SIGINT, SIGTERM, or an admin shutdown.
async fn wait_for_shutdown(shutdown: &CancellationToken) {
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = shutdown.cancelled() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(error) = result {
                tracing::warn!(error = %error, "ctrl-c handler failed");
            }
            tracing::info!("interrupt received");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received");
        }
    }
}
