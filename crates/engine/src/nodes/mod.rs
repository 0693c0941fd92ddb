// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in node strategies.
//!
//! Typed nodes (declared input/output schemas): the three extract
//! flavors, the content-surface check, alert delivery, the result
//! writer, and continuation enqueue. Legacy untyped nodes: `set_values`
//! and `delay`.

mod alert;
mod continuation;
mod extract;
mod legacy;
mod monitor;
mod writer;

pub use alert::SendAlert;
pub use continuation::EnqueueContinuation;
pub use extract::{ExtractByProductId, ExtractByProductSet, ExtractByUrl};
pub use legacy::{Delay, SetValues};
pub use monitor::CheckContentSurface;
pub use writer::WriteResults;

use crate::node::Typed;
use crate::registry::NodeRegistry;
use std::sync::Arc;
use sweep_adapters::{ContentSource, Notifier, ProductStore, ScrapeAdapter};
use sweep_core::{Clock, SchedulerSettings};
use sweep_storage::{JobQueueRepo, MonitorStateRepo, RateLimiter, StateStore};

/// Scan-size fallbacks when neither node config nor platform config
/// override them.
#[derive(Debug, Clone, Copy)]
pub struct ScanDefaults {
    pub limit: u32,
    pub batch_size: u32,
    pub concurrency: u32,
}

impl From<&SchedulerSettings> for ScanDefaults {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            limit: settings.limit,
            batch_size: settings.batch_size,
            concurrency: settings.concurrency,
        }
    }
}

/// Everything the built-in nodes need, captured by the factories.
pub struct BuiltinServices<S, C, A, P, T, N> {
    pub queue: Arc<JobQueueRepo<S, C>>,
    pub monitor_state: Arc<MonitorStateRepo<S, C>>,
    pub ratelimit: Arc<RateLimiter<S, C>>,
    pub scraper: A,
    pub products: P,
    pub content: T,
    pub notifier: N,
    pub clock: C,
    pub defaults: ScanDefaults,
}

/// Registry with every built-in node type registered.
pub fn builtin_registry<S, C, A, P, T, N>(services: BuiltinServices<S, C, A, P, T, N>) -> NodeRegistry
where
    S: StateStore,
    C: Clock,
    A: ScrapeAdapter,
    P: ProductStore,
    T: ContentSource,
    N: Notifier,
{
    let mut registry = NodeRegistry::new();

    {
        let scraper = services.scraper.clone();
        let products = services.products.clone();
        let ratelimit = services.ratelimit.clone();
        let defaults = services.defaults;
        registry.register("extract_by_product_set", move || {
            Box::new(Typed(ExtractByProductSet::new(
                scraper.clone(),
                products.clone(),
                ratelimit.clone(),
                defaults,
            )))
        });
    }

    {
        let scraper = services.scraper.clone();
        let products = services.products.clone();
        registry.register("extract_by_product_id", move || {
            Box::new(Typed(ExtractByProductId::new(scraper.clone(), products.clone())))
        });
    }

    {
        let scraper = services.scraper.clone();
        registry.register("extract_by_url", move || {
            Box::new(Typed(ExtractByUrl::new(scraper.clone())))
        });
    }

    {
        let scraper = services.scraper.clone();
        let content = services.content.clone();
        let monitor_state = services.monitor_state.clone();
        registry.register("check_content_surface", move || {
            Box::new(Typed(CheckContentSurface::new(
                scraper.clone(),
                content.clone(),
                monitor_state.clone(),
            )))
        });
    }

    {
        let notifier = services.notifier.clone();
        registry.register("send_alert", move || {
            Box::new(Typed(SendAlert::new(notifier.clone())))
        });
    }

    {
        let products = services.products.clone();
        registry.register("write_results", move || {
            Box::new(Typed(WriteResults::new(products.clone())))
        });
    }

    {
        let queue = services.queue.clone();
        let clock = services.clock.clone();
        registry.register("enqueue_continuation", move || {
            Box::new(Typed(EnqueueContinuation::new(queue.clone(), clock.clone())))
        });
    }

    registry.register("set_values", || Box::new(SetValues));
    registry.register("delay", || Box::new(Delay));

    registry
}
