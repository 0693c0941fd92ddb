// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-store contract.

use crate::error::StoreError;
use async_trait::async_trait;
use std::time::Duration;

/// Sort order for ordered-set reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Lowest score first; ties by member ascending.
    Asc,
    /// Highest score first; ties by member descending.
    Desc,
}

/// One write in a pipelined batch.
#[derive(Debug, Clone)]
pub enum Op {
    Set { key: String, value: String },
    SetEx { key: String, value: String, ttl: Duration },
    Del { key: String },
    HSet { key: String, field: String, value: String },
    ZAdd { key: String, member: String, score: f64 },
    ZRem { key: String, member: String },
    Expire { key: String, ttl: Duration },
}

/// Key-value/queue backend behind every repository.
///
/// Backend failures surface as [`StoreError::Transport`]; higher layers
/// decide whether to retry, skip a tick, or fail a job.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Atomic set-if-absent with TTL. Returns whether this caller set the key.
    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, StoreError>;

    async fn del(&self, key: &str) -> Result<(), StoreError>;
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Atomic increment; missing keys start at 0.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Remaining TTL. `None` when the key is missing or has no expiry.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError>;

    /// Atomic remove. Returns whether the member was present; the losing
    /// side of a dequeue race observes `false`.
    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    async fn zcard(&self, key: &str) -> Result<u64, StoreError>;

    /// Members in score order. `limit == 0` returns the whole set.
    async fn zrange(
        &self,
        key: &str,
        limit: usize,
        order: Order,
    ) -> Result<Vec<String>, StoreError>;

    /// Apply a batch of writes in one round trip.
    async fn pipeline(&self, ops: Vec<Op>) -> Result<(), StoreError>;
}
