// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis state store backend.
//!
//! Uses a `ConnectionManager` so a dropped connection reconnects under the
//! hood; callers only ever see transport errors for operations that failed
//! after the manager gave up.

use crate::error::StoreError;
use crate::store::{Op, Order, StateStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connect to the store at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        tracing::info!(url, "connected to state store");
        Ok(Self { manager })
    }
}

/// Redis expiries are whole seconds; sub-second TTLs round up to 1 s.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl StateStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.set_ex(key, value, ttl_secs(ttl)).await?;
        Ok(())
    }

    async fn set_nx_ex(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let outcome: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(outcome.is_some())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        Ok(conn.exists(key).await?)
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.manager.clone();
        Ok(conn.incr(key, 1).await?)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.expire(key, ttl_secs(ttl) as i64).await?;
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut conn = self.manager.clone();
        let remaining: i64 = conn.ttl(key).await?;
        // -2 = missing key, -1 = no expiry
        if remaining < 0 {
            return Ok(None);
        }
        Ok(Some(Duration::from_secs(remaining as u64)))
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager.clone();
        Ok(conn.hget(key, field).await?)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.hset(key, field, value).await?;
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.zadd(key, member, score).await?;
        Ok(())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let removed: i64 = conn.zrem(key, member).await?;
        Ok(removed > 0)
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.manager.clone();
        Ok(conn.zcard(key).await?)
    }

    async fn zrange(
        &self,
        key: &str,
        limit: usize,
        order: Order,
    ) -> Result<Vec<String>, StoreError> {
        let mut conn = self.manager.clone();
        let stop: i64 = if limit == 0 { -1 } else { limit as i64 - 1 };
        let mut cmd = redis::cmd("ZRANGE");
        cmd.arg(key).arg(0).arg(stop);
        if order == Order::Desc {
            cmd.arg("REV");
        }
        Ok(cmd.query_async(&mut conn).await?)
    }

    async fn pipeline(&self, ops: Vec<Op>) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in ops {
            match op {
                Op::Set { key, value } => {
                    pipe.set(key, value).ignore();
                }
                Op::SetEx { key, value, ttl } => {
                    pipe.set_ex(key, value, ttl_secs(ttl)).ignore();
                }
                Op::Del { key } => {
                    pipe.del(key).ignore();
                }
                Op::HSet { key, field, value } => {
                    pipe.hset(key, field, value).ignore();
                }
                Op::ZAdd { key, member, score } => {
                    pipe.zadd(key, member, score).ignore();
                }
                Op::ZRem { key, member } => {
                    pipe.zrem(key, member).ignore();
                }
                Op::Expire { key, ttl } => {
                    pipe.expire(key, ttl_secs(ttl) as i64).ignore();
                }
            }
        }
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }
}
