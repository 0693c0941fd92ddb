// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.

use crate::engine::WorkflowEngine;
use crate::job_logger::JobLogger;
use crate::node::NodeContext;
use crate::nodes::{builtin_registry, BuiltinServices, ScanDefaults};
use crate::registry::NodeRegistry;
use crate::shared_state::SharedStateMap;
use std::sync::Arc;
use sweep_adapters::{FakeContentSource, FakeNotifier, FakeProductStore, FakeScrapeAdapter};
use sweep_core::{
    Clock, FakeClock, JobDraft, NodeId, Params, Platform, PlatformConfig, Settings, WorkflowId,
};
use sweep_storage::{
    JobQueueRepo, MemoryStore, MonitorStateRepo, PlatformLock, RateLimiter, SchedulerStateRepo,
};
use sweep_workflow::{parse_workflow, WorkflowLibrary};

pub type MemStore = MemoryStore<FakeClock>;

pub struct Harness {
    pub clock: FakeClock,
    pub store: Arc<MemStore>,
    pub queue: Arc<JobQueueRepo<MemStore, FakeClock>>,
    pub lock: Arc<PlatformLock<MemStore, FakeClock>>,
    pub scheduler_state: Arc<SchedulerStateRepo<MemStore, FakeClock>>,
    pub monitor_state: Arc<MonitorStateRepo<MemStore, FakeClock>>,
    pub ratelimit: Arc<RateLimiter<MemStore, FakeClock>>,
    pub library: Arc<WorkflowLibrary>,
    pub shared: SharedStateMap,
    pub logger: Arc<JobLogger>,
    pub scraper: FakeScrapeAdapter,
    pub products: FakeProductStore,
    pub content: FakeContentSource,
    pub notifier: FakeNotifier,
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

impl Harness {
    pub fn new() -> Self {
        let mut settings = Settings::default();
        settings.platforms = vec![platform_config("gmarket")];
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        let clock = FakeClock::new();
        let store = Arc::new(MemoryStore::new(clock.clone()));
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
        let library = Arc::new(WorkflowLibrary::new("/nonexistent/workflows"));
        let log_dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create test log dir: {error}"),
        };
        let logger = Arc::new(JobLogger::new(log_dir.path()));

        Self {
            clock,
            store,
            queue,
            lock,
            scheduler_state,
            monitor_state,
            ratelimit,
            library,
            shared: SharedStateMap::new(),
            logger,
            scraper: FakeScrapeAdapter::new(),
            products: FakeProductStore::new(),
            content: FakeContentSource::new(),
            notifier: FakeNotifier::new(),
            settings,
            _log_dir: log_dir,
        }
    }

    /// Registry with all builtin nodes wired to the harness fakes.
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
            self.shared.clone(),
            self.logger.clone(),
            self.settings.platforms.clone(),
            self.clock.clone(),
        ))
    }

    pub fn engine_default(&self) -> Arc<WorkflowEngine<MemStore, FakeClock>> {
        self.engine(self.registry())
    }

    pub fn insert_workflow(&self, hcl: &str) {
        match parse_workflow(hcl) {
            Ok(def) => self.library.insert(def),
            Err(error) => panic!("test workflow failed to parse: {error}"),
        }
    }

    pub fn pending_job(&self, workflow: &str, platform: &str, params: Params) -> sweep_core::Job {
        JobDraft::new(workflow, platform).params(params).create(&self.clock)
    }
}

/// Bare node context for exercising strategies directly.
pub fn node_ctx(
    harness: &Harness,
    config: serde_json::Value,
    params: Params,
    platform: &str,
) -> NodeContext {
    let job_id = sweep_core::JobId::generate(harness.clock.epoch_ms());
    NodeContext {
        job_id,
        workflow_id: WorkflowId::new("test-flow"),
        node_id: NodeId::new("under_test"),
        config,
        input: Params::new(),
        params,
        platform: Platform::new(platform),
        platform_config: harness
            .settings
            .platforms
            .iter()
            .find(|p| p.name == *platform)
            .cloned(),
        shared: harness.shared.handle(job_id),
        logger: harness.logger.clone(),
    }
}
