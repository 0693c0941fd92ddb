// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP sidecar adapters.
//!
//! The site-specific scrapers, the product database API, and the curated
//! content API are separate services; these adapters are the daemon's
//! client side of those boundaries. Alerts go to a Slack incoming
//! webhook.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use sweep_adapters::{
    ContentError, ContentSource, CuratedLink, LinkStatus, Notifier, NotifyError, ProductPage,
    ProductRecord, ProductRef, ProductStore, ProductStoreError, ScrapeAdapter, ScrapeError,
    ScrapeOutcome, Surface,
};
use sweep_core::{Platform, SaleStatus};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const LINK_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

fn scrape_error(error: reqwest::Error) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout
    } else if let Some(status) = error.status() {
        ScrapeError::Status(status.as_u16())
    } else {
        ScrapeError::Transport(error.to_string())
    }
}

/// Client for the scraper sidecar: `GET {base}/scrape` fetches and
/// parses a product page, `HEAD`-style `GET {base}/probe` checks link
/// liveness.
#[derive(Clone)]
pub struct HttpScrapeAdapter {
    base: String,
    client: reqwest::Client,
}

impl HttpScrapeAdapter {
    pub fn new(base: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self { base: base.into(), client: http_client(REQUEST_TIMEOUT)? })
    }
}

#[async_trait]
impl ScrapeAdapter for HttpScrapeAdapter {
    async fn fetch_product(
        &self,
        platform: &Platform,
        url: &str,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        let response = self
            .client
            .get(format!("{}/scrape", self.base))
            .query(&[("platform", platform.as_str()), ("url", url)])
            .send()
            .await
            .map_err(scrape_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }
        response
            .json::<ScrapeOutcome>()
            .await
            .map_err(|e| ScrapeError::Parse(e.to_string()))
    }

    async fn check_link(&self, url: &str) -> Result<LinkStatus, ScrapeError> {
        let response = self
            .client
            .get(format!("{}/probe", self.base))
            .timeout(LINK_PROBE_TIMEOUT)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(scrape_error)?;

        if !response.status().is_success() {
            return Err(ScrapeError::Status(response.status().as_u16()));
        }
        response.json::<LinkStatus>().await.map_err(|e| ScrapeError::Parse(e.to_string()))
    }
}

fn product_error(error: reqwest::Error) -> ProductStoreError {
    ProductStoreError::Database(error.to_string())
}

#[derive(Debug, Deserialize)]
struct ProductPageBody {
    items: Vec<ProductRef>,
    remaining: u64,
}

#[derive(Debug, Deserialize)]
struct UpsertBody {
    changed: u64,
}

/// Client for the product API sidecar.
#[derive(Clone)]
pub struct HttpProductStore {
    base: String,
    client: reqwest::Client,
}

impl HttpProductStore {
    pub fn new(base: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self { base: base.into(), client: http_client(REQUEST_TIMEOUT)? })
    }
}

#[async_trait]
impl ProductStore for HttpProductStore {
    async fn products_for_update(
        &self,
        platform: &Platform,
        sale_status: SaleStatus,
        offset: u64,
        limit: u32,
    ) -> Result<ProductPage, ProductStoreError> {
        let body: ProductPageBody = self
            .client
            .get(format!("{}/products/for-update", self.base))
            .query(&[
                ("platform", platform.as_str()),
                ("sale_status", sale_status.as_str()),
                ("offset", &offset.to_string()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(product_error)?
            .error_for_status()
            .map_err(product_error)?
            .json()
            .await
            .map_err(product_error)?;

        Ok(ProductPage { items: body.items, remaining: body.remaining })
    }

    async fn product_by_id(
        &self,
        product_id: i64,
    ) -> Result<Option<ProductRef>, ProductStoreError> {
        let response = self
            .client
            .get(format!("{}/products/{product_id}", self.base))
            .send()
            .await
            .map_err(product_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let item: ProductRef = response
            .error_for_status()
            .map_err(product_error)?
            .json()
            .await
            .map_err(product_error)?;
        Ok(Some(item))
    }

    async fn upsert_products(
        &self,
        platform: &Platform,
        records: &[ProductRecord],
    ) -> Result<u64, ProductStoreError> {
        let body: UpsertBody = self
            .client
            .post(format!("{}/products/upsert", self.base))
            .query(&[("platform", platform.as_str())])
            .json(records)
            .send()
            .await
            .map_err(product_error)?
            .error_for_status()
            .map_err(product_error)?
            .json()
            .await
            .map_err(product_error)?;
        Ok(body.changed)
    }
}

/// Client for the curated-content API.
#[derive(Clone)]
pub struct HttpContentSource {
    base: String,
    client: reqwest::Client,
}

impl HttpContentSource {
    pub fn new(base: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self { base: base.into(), client: http_client(REQUEST_TIMEOUT)? })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn links(&self, surface: Surface) -> Result<Vec<CuratedLink>, ContentError> {
        let to_err = |message: String| ContentError::ListFailed { surface, message };
        self.client
            .get(format!("{}/surfaces/{surface}/links", self.base))
            .send()
            .await
            .map_err(|e| to_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| to_err(e.to_string()))?
            .json()
            .await
            .map_err(|e| to_err(e.to_string()))
    }
}

/// Slack incoming-webhook notifier.
#[derive(Clone)]
pub struct SlackNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self { webhook_url: webhook_url.into(), client: http_client(REQUEST_TIMEOUT)? })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.client
            .post(&self.webhook_url)
            .json(&serde_json::json!({ "text": message }))
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;
        Ok(())
    }
}
