// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result writer: persists scraped records to the product database.

use crate::error::NodeError;
use crate::node::{NodeContext, TypedNode, TypedOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sweep_adapters::{ProductRecord, ProductStore};

pub struct WriteResults<P> {
    products: P,
}

#[derive(Debug, Default, Deserialize)]
pub struct WriteResultsConfig {}

#[derive(Debug, Serialize)]
pub struct WriteResultsOutput {
    pub written: u64,
}

impl<P: ProductStore> WriteResults<P> {
    pub fn new(products: P) -> Self {
        Self { products }
    }
}

#[async_trait]
impl<P: ProductStore> TypedNode for WriteResults<P> {
    type Config = WriteResultsConfig;
    type Output = WriteResultsOutput;

    async fn run(
        &self,
        _config: Self::Config,
        ctx: &NodeContext,
    ) -> Result<TypedOutput<Self::Output>, NodeError> {
        // Records stashed by the extract nodes; taking them keeps a
        // continuation job from re-writing this run's batch.
        let records: Vec<ProductRecord> = match ctx.shared.take("scraped_records") {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| NodeError::Failed(format!("corrupt scraped_records: {e}")))?,
            None => Vec::new(),
        };

        if records.is_empty() {
            return Ok(TypedOutput::new(WriteResultsOutput { written: 0 }));
        }

        let written = self.products.upsert_products(&ctx.platform, &records).await?;
        tracing::info!(platform = %ctx.platform, written, "scraped records persisted");
        Ok(TypedOutput::new(WriteResultsOutput { written }))
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
