// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared world fixture for the scenario specs.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

pub use serde_json::{json, Value};
pub use std::time::Duration;
pub use sweep_core::{
    priority, Clock, FakeClock, Job, JobDraft, JobStatus, NodeId, Params, Platform,
    PlatformConfig, Settings,
};
pub use sweep_engine::{
    builtin_registry, AdminSurface, AlertWatcher, BuiltinServices, ExecutionOutcome, JobLogger,
    KillSignal, NodeContext, NodeError, NodeOutput, NodeRegistry, NodeStrategy, ScanDefaults,
    Scheduler, SharedStateMap, Worker, WorkerPoll, WorkflowEngine,
};
pub use sweep_storage::{
    JobQueueRepo, MemoryStore, MonitorStateRepo, PlatformLock, QueueDiscipline, RateLimiter,
    SchedulerStateRepo,
};
pub use sweep_workflow::parse_workflow;

pub type MemStore = MemoryStore<FakeClock>;

/// One deployment's worth of components on a shared in-memory store.
pub struct World {
    pub clock: FakeClock,
    pub store: Arc<MemStore>,
    pub queue: Arc<JobQueueRepo<MemStore, FakeClock>>,
    pub lock: Arc<PlatformLock<MemStore, FakeClock>>,
    pub scheduler_state: Arc<SchedulerStateRepo<MemStore, FakeClock>>,
    pub monitor_state: Arc<MonitorStateRepo<MemStore, FakeClock>>,
    pub ratelimit: Arc<RateLimiter<MemStore, FakeClock>>,
    pub library: Arc<sweep_workflow::WorkflowLibrary>,
    pub logger: Arc<JobLogger>,
    pub scraper: sweep_adapters::FakeScrapeAdapter,
    pub products: sweep_adapters::FakeProductStore,
    pub content: sweep_adapters::FakeContentSource,
    pub notifier: sweep_adapters::FakeNotifier,
    pub settings: Settings,
    _log_dir: tempfile::TempDir,
}

pub fn platform_config(name: &str) -> PlatformConfig {
    PlatformConfig {
        name: Platform::new(name),
        link_url_pattern: format!("https://{name}.example/item/{{code}}"),
        workflow: None,
        limit: None,
        batch_size: None,
        concurrency: None,
        rate_limit: None,
    }
}

impl World {
    pub fn with_platforms(names: &[&str]) -> Self {
        let mut settings = Settings::default();
        settings.platforms = names.iter().map(|name| platform_config(name)).collect();
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        let clock = FakeClock::new();
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let log_dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create spec log dir: {error}"),
        };
        Self {
            logger: Arc::new(JobLogger::new(log_dir.path())),
            _log_dir: log_dir,
            queue: Arc::new(JobQueueRepo::new(store.clone(), clock.clone())),
            lock: Arc::new(PlatformLock::new(
                store.clone(),
                clock.clone(),
                settings.worker.lock_ttl(),
            )),
            scheduler_state: Arc::new(SchedulerStateRepo::new(
                store.clone(),
                clock.clone(),
                settings.scheduler.clone(),
            )),
            monitor_state: Arc::new(MonitorStateRepo::new(store.clone(), clock.clone())),
            ratelimit: Arc::new(RateLimiter::new(store.clone(), clock.clone())),
            library: Arc::new(sweep_workflow::WorkflowLibrary::new("/nonexistent")),
            scraper: sweep_adapters::FakeScrapeAdapter::new(),
            products: sweep_adapters::FakeProductStore::new(),
            content: sweep_adapters::FakeContentSource::new(),
            notifier: sweep_adapters::FakeNotifier::new(),
            settings,
            clock,
            store,
        }
    }

    pub fn insert_workflow(&self, hcl: &str) {
        match parse_workflow(hcl) {
            Ok(def) => self.library.insert(def),
            Err(error) => panic!("spec workflow failed to parse: {error}"),
        }
    }

    pub fn registry(&self) -> NodeRegistry {
        builtin_registry(BuiltinServices {
            queue: self.queue.clone(),
            monitor_state: self.monitor_state.clone(),
            ratelimit: self.ratelimit.clone(),
            scraper: self.scraper.clone(),
            products: self.products.clone(),
            content: self.content.clone(),
            notifier: self.notifier.clone(),
            clock: self.clock.clone(),
            defaults: ScanDefaults::from(&self.settings.scheduler),
        })
    }

    pub fn engine(&self, registry: NodeRegistry) -> Arc<WorkflowEngine<MemStore, FakeClock>> {
        Arc::new(WorkflowEngine::new(
            self.queue.clone(),
            self.library.clone(),
            Arc::new(registry),
            SharedStateMap::new(),
            self.logger.clone(),
            self.settings.platforms.clone(),
            self.clock.clone(),
        ))
    }

    pub fn scheduler(&self) -> Scheduler<MemStore, FakeClock> {
        Scheduler::new(
            self.scheduler_state.clone(),
            self.queue.clone(),
            self.lock.clone(),
            self.settings.platforms.clone(),
            self.settings.scheduler.clone(),
            self.clock.clone(),
        )
    }

    pub fn worker(
        &self,
        platform: &str,
        registry: NodeRegistry,
    ) -> Worker<MemStore, FakeClock> {
        Worker::new(
            Platform::new(platform),
            QueueDiscipline::Priority,
            self.queue.clone(),
            self.lock.clone(),
            self.scheduler_state.clone(),
            self.engine(registry),
            self.store.clone(),
            self.settings.worker.clone(),
            self.clock.clone(),
        )
    }

    pub fn admin(&self) -> AdminSurface<MemStore, FakeClock> {
        AdminSurface::new(
            self.store.clone(),
            self.queue.clone(),
            self.lock.clone(),
            self.scheduler_state.clone(),
            self.monitor_state.clone(),
            self.settings.platforms.clone(),
            self.settings.monitor_tasks.clone(),
            self.settings.worker.clone(),
            self.clock.clone(),
        )
    }

    pub fn pending_job(&self, workflow: &str, platform: &str) -> Job {
        JobDraft::new(workflow, platform).create(&self.clock)
    }
}

/// Logs every execution and emits the config's `emit` object.
pub struct Recorder {
    pub log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl NodeStrategy for Recorder {
    async fn execute(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        self.log.lock().push(ctx.node_id.to_string());
        let data = match ctx.config.get("emit") {
            Some(Value::Object(map)) => map.clone(),
            _ => Params::new(),
        };
        Ok(NodeOutput { data, next_nodes: None })
    }
}

/// Sleeps `ms`, then emits `{key: value}` from config.
pub struct SleepEmit;

#[async_trait]
impl NodeStrategy for SleepEmit {
    async fn execute(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let ms = ctx.config.get("ms").and_then(Value::as_u64).unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(ms)).await;
        let mut data = Params::new();
        if let (Some(key), Some(value)) = (
            ctx.config.get("key").and_then(Value::as_str),
            ctx.config.get("value"),
        ) {
            data.insert(key.to_string(), value.clone());
        }
        Ok(NodeOutput { data, next_nodes: None })
    }
}

/// Fails every attempt, counting invocations.
pub struct AlwaysFail {
    pub calls: Arc<AtomicU32>,
}

#[async_trait]
impl NodeStrategy for AlwaysFail {
    async fn execute(&self, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Err(NodeError::Failed("upstream returned status 503".into()))
    }
}

/// Raises the platform's kill flag mid-job.
pub struct RaiseKillFlag {
    pub store: Arc<MemStore>,
}

#[async_trait]
impl NodeStrategy for RaiseKillFlag {
    async fn execute(&self, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        KillSignal::new(self.store.clone(), ctx.platform.clone())
            .request(Duration::from_secs(60))
            .await?;
        Ok(NodeOutput::default())
    }
}
