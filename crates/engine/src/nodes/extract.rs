// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extract nodes: refresh product metadata through the scraper.
//!
//! Scraped records are stashed in the job's shared state under
//! `scraped_records`; the `write_results` node persists them. Individual
//! product failures inside a batch are counted, not fatal; only
//! infrastructure errors (product store, rate-limit store) fail the node.

use crate::error::NodeError;
use crate::node::{NodeContext, TypedNode, TypedOutput};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use sweep_adapters::{ProductRef, ProductStore, ScrapeAdapter, ScrapeOutcome};
use sweep_core::{Clock, RateLimitSettings, SaleStatus};
use sweep_storage::{RateLimiter, StateStore};

use super::ScanDefaults;

const SCRAPED_RECORDS: &str = "scraped_records";

/// Walk one platform's refresh set (one sale-status slice), scraping up
/// to `limit` products. Reports how many products remain so a
/// continuation node can re-enqueue the job.
pub struct ExtractByProductSet<A, P, S, C> {
    scraper: A,
    products: P,
    ratelimit: Arc<RateLimiter<S, C>>,
    defaults: ScanDefaults,
}

#[derive(Debug, Deserialize)]
pub struct ExtractSetConfig {
    pub sale_status: SaleStatus,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub batch_size: Option<u32>,
    #[serde(default)]
    pub concurrency: Option<u32>,
    /// Whether upserts may flip a product's sale status (passed through
    /// to the writer via output data).
    #[serde(default)]
    pub update_sale_status: bool,
}

#[derive(Debug, Serialize)]
pub struct ExtractSetOutput {
    pub scanned: u64,
    pub found: u64,
    pub not_found: u64,
    pub failed: u64,
    /// Products left in the refresh set after this run.
    pub remaining: u64,
    /// Continuation cursor for the next run.
    pub next_offset: u64,
    pub update_sale_status: bool,
}

impl<A, P, S, C> ExtractByProductSet<A, P, S, C>
where
    A: ScrapeAdapter,
    P: ProductStore,
    S: StateStore,
    C: Clock,
{
    pub fn new(
        scraper: A,
        products: P,
        ratelimit: Arc<RateLimiter<S, C>>,
        defaults: ScanDefaults,
    ) -> Self {
        Self { scraper, products, ratelimit, defaults }
    }

    async fn scrape_one(
        &self,
        ctx: &NodeContext,
        item: ProductRef,
        rate: Option<RateLimitSettings>,
    ) -> Result<Option<Value>, NodeError> {
        if let Some(settings) = rate {
            // Spin on the window: budget exhausted means sleep until the
            // next window opens, then try again.
            while !self.ratelimit.try_acquire(&ctx.platform, &settings).await? {
                tokio::time::sleep(self.ratelimit.window_remaining(&settings)).await;
            }
        }

        match self.scraper.fetch_product(&ctx.platform, &item.url).await {
            Ok(ScrapeOutcome::Found { record }) => {
                let value = serde_json::to_value(&record)
                    .map_err(|e| NodeError::Failed(format!("record serialization failed: {e}")))?;
                Ok(Some(value))
            }
            Ok(ScrapeOutcome::NotFound) => Ok(None),
            Err(error) => {
                tracing::warn!(
                    platform = %ctx.platform,
                    code = item.code.as_str(),
                    error = %error,
                    "product scrape failed"
                );
                Err(NodeError::Scrape(error))
            }
        }
    }
}

#[async_trait]
impl<A, P, S, C> TypedNode for ExtractByProductSet<A, P, S, C>
where
    A: ScrapeAdapter,
    P: ProductStore,
    S: StateStore,
    C: Clock,
{
    type Config = ExtractSetConfig;
    type Output = ExtractSetOutput;

    async fn run(
        &self,
        config: Self::Config,
        ctx: &NodeContext,
    ) -> Result<TypedOutput<Self::Output>, NodeError> {
        let platform_cfg = ctx.platform_config.as_ref();
        let limit =
            config.limit.or(platform_cfg.and_then(|c| c.limit)).unwrap_or(self.defaults.limit);
        let batch_size = config
            .batch_size
            .or(platform_cfg.and_then(|c| c.batch_size))
            .unwrap_or(self.defaults.batch_size)
            .max(1);
        let concurrency = config
            .concurrency
            .or(platform_cfg.and_then(|c| c.concurrency))
            .unwrap_or(self.defaults.concurrency)
            .max(1);
        let rate = platform_cfg.and_then(|c| c.rate_limit);

        let offset = ctx.params.get("offset").and_then(Value::as_u64).unwrap_or(0);

        let mut scanned: u64 = 0;
        let mut found: u64 = 0;
        let mut not_found: u64 = 0;
        let mut failed: u64 = 0;
        let mut remaining: u64 = 0;

        while scanned < limit as u64 {
            let page_size = batch_size.min((limit as u64 - scanned) as u32);
            let page = self
                .products
                .products_for_update(&ctx.platform, config.sale_status, offset + scanned, page_size)
                .await?;
            if page.items.is_empty() {
                remaining = 0;
                break;
            }

            let results: Vec<Result<Option<Value>, NodeError>> =
                stream::iter(page.items.iter().cloned().map(|item| self.scrape_one(ctx, item, rate)))
                    .buffer_unordered(concurrency as usize)
                    .collect()
                    .await;

            for result in results {
                match result {
                    Ok(Some(record)) => {
                        found += 1;
                        ctx.shared.push(SCRAPED_RECORDS, record);
                    }
                    Ok(None) => not_found += 1,
                    Err(_) => failed += 1,
                }
            }

            scanned += page.items.len() as u64;
            remaining = page.remaining;
            if page.remaining == 0 {
                break;
            }
        }

        tracing::info!(
            platform = %ctx.platform,
            sale_status = %config.sale_status,
            scanned,
            found,
            not_found,
            failed,
            remaining,
            "product set extracted"
        );
        ctx.logger.append(
            &ctx.job_id,
            &ctx.node_id,
            &format!(
                "{} scanned {scanned} (found {found}, not_found {not_found}, failed {failed}), {remaining} remaining",
                config.sale_status
            ),
        );

        Ok(TypedOutput::new(ExtractSetOutput {
            scanned,
            found,
            not_found,
            failed,
            remaining,
            next_offset: offset + scanned,
            update_sale_status: config.update_sale_status,
        }))
    }
}

/// Refresh a single tracked product by database id.
pub struct ExtractByProductId<A, P> {
    scraper: A,
    products: P,
}

#[derive(Debug, Deserialize)]
pub struct ExtractIdConfig {
    pub product_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractLookupOutput {
    Found { product_id: i64, code: String },
    NotFound { product_id: i64 },
}

impl<A: ScrapeAdapter, P: ProductStore> ExtractByProductId<A, P> {
    pub fn new(scraper: A, products: P) -> Self {
        Self { scraper, products }
    }
}

#[async_trait]
impl<A: ScrapeAdapter, P: ProductStore> TypedNode for ExtractByProductId<A, P> {
    type Config = ExtractIdConfig;
    type Output = ExtractLookupOutput;

    async fn run(
        &self,
        config: Self::Config,
        ctx: &NodeContext,
    ) -> Result<TypedOutput<Self::Output>, NodeError> {
        let product_id = config.product_id;
        let Some(item) = self.products.product_by_id(product_id).await? else {
            // Business not-found is data; the job continues.
            return Ok(TypedOutput::new(ExtractLookupOutput::NotFound { product_id }));
        };

        match self.scraper.fetch_product(&ctx.platform, &item.url).await? {
            ScrapeOutcome::Found { record } => {
                let code = record.code.clone();
                let value = serde_json::to_value(&record)
                    .map_err(|e| NodeError::Failed(format!("record serialization failed: {e}")))?;
                ctx.shared.push(SCRAPED_RECORDS, value);
                Ok(TypedOutput::new(ExtractLookupOutput::Found { product_id, code }))
            }
            ScrapeOutcome::NotFound => {
                Ok(TypedOutput::new(ExtractLookupOutput::NotFound { product_id }))
            }
        }
    }
}

/// Scrape an arbitrary product URL.
pub struct ExtractByUrl<A> {
    scraper: A,
}

#[derive(Debug, Deserialize)]
pub struct ExtractUrlConfig {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractUrlOutput {
    Found { record: sweep_adapters::ProductRecord },
    NotFound { url: String },
}

impl<A: ScrapeAdapter> ExtractByUrl<A> {
    pub fn new(scraper: A) -> Self {
        Self { scraper }
    }
}

#[async_trait]
impl<A: ScrapeAdapter> TypedNode for ExtractByUrl<A> {
    type Config = ExtractUrlConfig;
    type Output = ExtractUrlOutput;

    async fn run(
        &self,
        config: Self::Config,
        ctx: &NodeContext,
    ) -> Result<TypedOutput<Self::Output>, NodeError> {
        if config.url.is_empty() {
            return Err(NodeError::Validation("url must not be empty".into()));
        }

        match self.scraper.fetch_product(&ctx.platform, &config.url).await? {
            ScrapeOutcome::Found { record } => {
                let value = serde_json::to_value(&record)
                    .map_err(|e| NodeError::Failed(format!("record serialization failed: {e}")))?;
                ctx.shared.push(SCRAPED_RECORDS, value);
                Ok(TypedOutput::new(ExtractUrlOutput::Found { record }))
            }
            ScrapeOutcome::NotFound => {
                Ok(TypedOutput::new(ExtractUrlOutput::NotFound { url: config.url }))
            }
        }
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
