// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine and node error taxonomy.

use sweep_adapters::{ContentError, ProductStoreError, ScrapeError};
use sweep_storage::StoreError;
use thiserror::Error;

/// Failures inside one node execution.
///
/// Validation failures are not retried; everything else is subject to
/// the node's retry policy. Business not-found is *not* an error; typed
/// nodes report it in their output and the job continues.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid node config: {0}")]
    Validation(String),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Products(#[from] ProductStoreError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("store error during node execution: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Failed(String),
}

impl NodeError {
    /// Whether the retry policy applies to this failure.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, NodeError::Validation(_))
    }
}

/// Failures of the engine itself. Job-level problems (deadlock, node
/// exhaustion, unknown workflow) are recorded on the job record instead;
/// only infrastructure failures surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
