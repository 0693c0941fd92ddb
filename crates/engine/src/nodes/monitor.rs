// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-surface check: probe curated links for breakage.
//!
//! This node owns the monitor-task bookkeeping: it stamps the task's
//! completion time and bumps the executed counter; the watcher loop
//! only reads them.

use crate::error::NodeError;
use crate::node::{NodeContext, TypedNode, TypedOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use sweep_adapters::{ContentSource, LinkStatus, ScrapeAdapter, Surface};
use sweep_core::Clock;
use sweep_storage::{MonitorStateRepo, StateStore};

pub struct CheckContentSurface<A, T, S, C> {
    scraper: A,
    content: T,
    monitor_state: Arc<MonitorStateRepo<S, C>>,
}

#[derive(Debug, Deserialize)]
pub struct CheckSurfaceConfig {
    pub surface: String,
    /// Task whose completion time this check stamps; defaults to the
    /// job's `task_id` param.
    #[serde(default)]
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokenLink {
    pub title: String,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct CheckSurfaceOutput {
    pub surface: Surface,
    pub checked: u64,
    pub broken_count: u64,
    pub broken: Vec<BrokenLink>,
}

impl<A, T, S, C> CheckContentSurface<A, T, S, C>
where
    A: ScrapeAdapter,
    T: ContentSource,
    S: StateStore,
    C: Clock,
{
    pub fn new(scraper: A, content: T, monitor_state: Arc<MonitorStateRepo<S, C>>) -> Self {
        Self { scraper, content, monitor_state }
    }
}

#[async_trait]
impl<A, T, S, C> TypedNode for CheckContentSurface<A, T, S, C>
where
    A: ScrapeAdapter,
    T: ContentSource,
    S: StateStore,
    C: Clock,
{
    type Config = CheckSurfaceConfig;
    type Output = CheckSurfaceOutput;

    async fn run(
        &self,
        config: Self::Config,
        ctx: &NodeContext,
    ) -> Result<TypedOutput<Self::Output>, NodeError> {
        let surface: Surface = config.surface.parse().map_err(NodeError::Validation)?;

        let links = self.content.links(surface).await?;
        let mut broken = Vec::new();
        for link in &links {
            match self.scraper.check_link(&link.url).await {
                Ok(LinkStatus::Alive) => {}
                Ok(LinkStatus::Broken { reason }) => {
                    broken.push(BrokenLink {
                        title: link.title.clone(),
                        url: link.url.clone(),
                        reason,
                    });
                }
                // An unreachable link is a broken link as far as the
                // surface is concerned.
                Err(error) => {
                    broken.push(BrokenLink {
                        title: link.title.clone(),
                        url: link.url.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        let task_id = config
            .task_id
            .or_else(|| ctx.params.get("task_id").and_then(Value::as_str).map(String::from));
        if let Some(task_id) = task_id {
            self.monitor_state.set_completed_at(&task_id).await?;
            self.monitor_state.increment_executed().await?;
        }

        tracing::info!(
            surface = %surface,
            checked = links.len(),
            broken = broken.len(),
            "content surface checked"
        );
        ctx.logger.append(
            &ctx.job_id,
            &ctx.node_id,
            &format!("{} checked {} links, {} broken", surface, links.len(), broken.len()),
        );

        Ok(TypedOutput::new(CheckSurfaceOutput {
            surface,
            checked: links.len() as u64,
            broken_count: broken.len() as u64,
            broken,
        }))
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
