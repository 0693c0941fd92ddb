// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Product repository adapter.
//!
//! The relational product database is an external collaborator; the core
//! only needs paging over products due for refresh and batch upserts of
//! scraped snapshots.

use crate::scrape::ProductRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sweep_core::{Platform, SaleStatus};
use thiserror::Error;

/// Reference to a tracked product needing refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub product_id: i64,
    pub code: String,
    pub url: String,
}

/// One page of the refresh set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub items: Vec<ProductRef>,
    /// Products left after this page.
    pub remaining: u64,
}

#[derive(Debug, Error)]
pub enum ProductStoreError {
    #[error("product database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait ProductStore: Clone + Send + Sync + 'static {
    /// Page through products of one platform and sale status, stalest
    /// first. `offset` is the continuation cursor.
    async fn products_for_update(
        &self,
        platform: &Platform,
        sale_status: SaleStatus,
        offset: u64,
        limit: u32,
    ) -> Result<ProductPage, ProductStoreError>;

    async fn product_by_id(
        &self,
        product_id: i64,
    ) -> Result<Option<ProductRef>, ProductStoreError>;

    /// Upsert scraped snapshots; returns how many rows changed.
    async fn upsert_products(
        &self,
        platform: &Platform,
        records: &[ProductRecord],
    ) -> Result<u64, ProductStoreError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{ProductPage, ProductRecord, ProductRef, ProductStore, ProductStoreError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use sweep_core::{Platform, SaleStatus};

    #[derive(Default)]
    struct FakeProductState {
        /// (platform, sale_status) -> refresh set, in page order.
        products: Vec<(Platform, SaleStatus, ProductRef)>,
        upserts: Vec<(Platform, Vec<ProductRecord>)>,
    }

    /// In-memory product repository for tests.
    #[derive(Clone, Default)]
    pub struct FakeProductStore {
        inner: Arc<Mutex<FakeProductState>>,
    }

    impl FakeProductStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, platform: impl Into<Platform>, status: SaleStatus, item: ProductRef) {
            self.inner.lock().products.push((platform.into(), status, item));
        }

        /// All upsert batches, in call order.
        pub fn upserts(&self) -> Vec<(Platform, Vec<ProductRecord>)> {
            self.inner.lock().upserts.clone()
        }

        pub fn upserted_count(&self) -> usize {
            self.inner.lock().upserts.iter().map(|(_, records)| records.len()).sum()
        }
    }

    #[async_trait]
    impl ProductStore for FakeProductStore {
        async fn products_for_update(
            &self,
            platform: &Platform,
            sale_status: SaleStatus,
            offset: u64,
            limit: u32,
        ) -> Result<ProductPage, ProductStoreError> {
            let state = self.inner.lock();
            let matching: Vec<ProductRef> = state
                .products
                .iter()
                .filter(|(p, s, _)| p == platform && *s == sale_status)
                .map(|(_, _, item)| item.clone())
                .collect();
            let total = matching.len() as u64;
            let items: Vec<ProductRef> =
                matching.into_iter().skip(offset as usize).take(limit as usize).collect();
            let consumed = offset + items.len() as u64;
            Ok(ProductPage { items, remaining: total.saturating_sub(consumed) })
        }

        async fn product_by_id(
            &self,
            product_id: i64,
        ) -> Result<Option<ProductRef>, ProductStoreError> {
            let state = self.inner.lock();
            Ok(state
                .products
                .iter()
                .map(|(_, _, item)| item)
                .find(|item| item.product_id == product_id)
                .cloned())
        }

        async fn upsert_products(
            &self,
            platform: &Platform,
            records: &[ProductRecord],
        ) -> Result<u64, ProductStoreError> {
            let mut state = self.inner.lock();
            state.upserts.push((platform.clone(), records.to_vec()));
            Ok(records.len() as u64)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProductStore;
