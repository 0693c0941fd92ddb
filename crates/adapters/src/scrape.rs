// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Site scraper adapter: product page fetches and link liveness checks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sweep_core::Platform;
use thiserror::Error;

/// A scraped product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Site-local product code.
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Business outcome of a product fetch. A page that cleanly reports
/// "no such product" is data, not an error; the job continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScrapeOutcome {
    Found { record: ProductRecord },
    NotFound,
}

/// Liveness of a curated-content link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    Alive,
    Broken { reason: String },
}

/// Scraper failures. All variants are retried per the node's retry
/// policy; exhaustion fails the job.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request timed out")]
    Timeout,

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("failed to parse product page: {0}")]
    Parse(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Adapter over the site-specific scrapers.
#[async_trait]
pub trait ScrapeAdapter: Clone + Send + Sync + 'static {
    /// Fetch and parse the product page at `url`.
    async fn fetch_product(
        &self,
        platform: &Platform,
        url: &str,
    ) -> Result<ScrapeOutcome, ScrapeError>;

    /// Cheap liveness probe used by the content monitors.
    async fn check_link(&self, url: &str) -> Result<LinkStatus, ScrapeError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{LinkStatus, ProductRecord, ScrapeAdapter, ScrapeError, ScrapeOutcome};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use sweep_core::Platform;

    #[derive(Default)]
    struct FakeScrapeState {
        products: HashMap<String, ScrapeOutcome>,
        broken_links: HashMap<String, String>,
        /// URLs that error this many more times before succeeding.
        failures: HashMap<String, u32>,
        fetch_log: Vec<String>,
    }

    /// Programmable scraper for tests.
    #[derive(Clone, Default)]
    pub struct FakeScrapeAdapter {
        inner: Arc<Mutex<FakeScrapeState>>,
    }

    impl FakeScrapeAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn put_product(&self, url: impl Into<String>, record: ProductRecord) {
            self.inner
                .lock()
                .products
                .insert(url.into(), ScrapeOutcome::Found { record });
        }

        pub fn put_not_found(&self, url: impl Into<String>) {
            self.inner.lock().products.insert(url.into(), ScrapeOutcome::NotFound);
        }

        pub fn put_broken_link(&self, url: impl Into<String>, reason: impl Into<String>) {
            self.inner.lock().broken_links.insert(url.into(), reason.into());
        }

        /// Make the next `times` fetches of `url` fail with a timeout.
        pub fn fail_times(&self, url: impl Into<String>, times: u32) {
            self.inner.lock().failures.insert(url.into(), times);
        }

        /// Every URL fetched, in call order.
        pub fn fetched(&self) -> Vec<String> {
            self.inner.lock().fetch_log.clone()
        }
    }

    #[async_trait]
    impl ScrapeAdapter for FakeScrapeAdapter {
        async fn fetch_product(
            &self,
            _platform: &Platform,
            url: &str,
        ) -> Result<ScrapeOutcome, ScrapeError> {
            let mut state = self.inner.lock();
            state.fetch_log.push(url.to_string());
            if let Some(remaining) = state.failures.get_mut(url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ScrapeError::Timeout);
                }
            }
            Ok(state.products.get(url).cloned().unwrap_or(ScrapeOutcome::NotFound))
        }

        async fn check_link(&self, url: &str) -> Result<LinkStatus, ScrapeError> {
            let state = self.inner.lock();
            match state.broken_links.get(url) {
                Some(reason) => Ok(LinkStatus::Broken { reason: reason.clone() }),
                None => Ok(LinkStatus::Alive),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeScrapeAdapter;
