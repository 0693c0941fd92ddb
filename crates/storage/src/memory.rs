// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory state store with clock-driven expiry.
//!
//! Semantics mirror the Redis backend closely enough for the repositories
//! to be tested against it: set-if-absent is atomic under the store lock,
//! ordered-set ties break by member order, plain `set` clears any TTL,
//! and empty ordered sets disappear. Expiry consults the injected clock,
//! so tests drive TTLs with `FakeClock::advance`.

use crate::error::StoreError;
use crate::store::{Op, Order, StateStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use sweep_core::Clock;

pub struct MemoryStore<C: Clock> {
    clock: C,
    entries: Mutex<HashMap<String, Entry>>,
}

struct Entry {
    value: ValueKind,
    expires_at_ms: Option<u64>,
}

enum ValueKind {
    Text(String),
    Hash(HashMap<String, String>),
    Sorted(HashMap<String, f64>),
}

impl<C: Clock> MemoryStore<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, entries: Mutex::new(HashMap::new()) }
    }

    fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }
}

fn live<'a>(
    entries: &'a mut HashMap<String, Entry>,
    key: &str,
    now_ms: u64,
) -> Option<&'a mut Entry> {
    let expired = match entries.get(key) {
        Some(entry) => entry.expires_at_ms.is_some_and(|at| at <= now_ms),
        None => return None,
    };
    if expired {
        entries.remove(key);
        return None;
    }
    entries.get_mut(key)
}

fn expires_at(now_ms: u64, ttl: Duration) -> Option<u64> {
    Some(now_ms + ttl.as_millis() as u64)
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::Corrupt { key: key.to_string(), message: "value has a different type".into() }
}

fn apply_op(
    entries: &mut HashMap<String, Entry>,
    now_ms: u64,
    op: Op,
) -> Result<(), StoreError> {
    match op {
        Op::Set { key, value } => {
            entries.insert(key, Entry { value: ValueKind::Text(value), expires_at_ms: None });
        }
        Op::SetEx { key, value, ttl } => {
            entries.insert(
                key,
                Entry { value: ValueKind::Text(value), expires_at_ms: expires_at(now_ms, ttl) },
            );
        }
        Op::Del { key } => {
            entries.remove(&key);
        }
        Op::HSet { key, field, value } => match live(entries, &key, now_ms) {
            Some(entry) => match &mut entry.value {
                ValueKind::Hash(fields) => {
                    fields.insert(field, value);
                }
                _ => return Err(wrong_type(&key)),
            },
            None => {
                let mut fields = HashMap::new();
                fields.insert(field, value);
                entries
                    .insert(key, Entry { value: ValueKind::Hash(fields), expires_at_ms: None });
            }
        },
        Op::ZAdd { key, member, score } => match live(entries, &key, now_ms) {
            Some(entry) => match &mut entry.value {
                ValueKind::Sorted(members) => {
                    members.insert(member, score);
                }
                _ => return Err(wrong_type(&key)),
            },
            None => {
                let mut members = HashMap::new();
                members.insert(member, score);
                entries
                    .insert(key, Entry { value: ValueKind::Sorted(members), expires_at_ms: None });
            }
        },
        Op::ZRem { key, member } => {
            let mut now_empty = false;
            if let Some(entry) = live(entries, &key, now_ms) {
                if let ValueKind::Sorted(members) = &mut entry.value {
                    members.remove(&member);
                    now_empty = members.is_empty();
                }
            }
            // Redis drops empty sorted sets entirely.
            if now_empty {
                entries.remove(&key);
            }
        }
        Op::Expire { key, ttl } => {
            if let Some(entry) = live(entries, &key, now_ms) {
                entry.expires_at_ms = expires_at(now_ms, ttl);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl<C: Clock> StateStore for MemoryStore<C> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        match live(&mut entries, key, now) {
            Some(entry) => match &entry.value {
                ValueKind::Text(s) => Ok(Some(s.clone())),
                _ => Err(wrong_type(key)),
            },
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        apply_op(&mut entries, self.now_ms(), Op::Set {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        apply_op(&mut entries, self.now_ms(), Op::SetEx {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
        })
    }

    async fn set_nx_ex(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        if live(&mut entries, key, now).is_some() {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry { value: ValueKind::Text(value.to_string()), expires_at_ms: expires_at(now, ttl) },
        );
        Ok(true)
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        Ok(live(&mut entries, key, now).is_some())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        match live(&mut entries, key, now) {
            Some(entry) => match &mut entry.value {
                ValueKind::Text(s) => {
                    let n: i64 = s.parse().map_err(|_| StoreError::Corrupt {
                        key: key.to_string(),
                        message: "not an integer".into(),
                    })?;
                    let next = n + 1;
                    *s = next.to_string();
                    Ok(next)
                }
                _ => Err(wrong_type(key)),
            },
            None => {
                entries.insert(
                    key.to_string(),
                    Entry { value: ValueKind::Text("1".into()), expires_at_ms: None },
                );
                Ok(1)
            }
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        apply_op(&mut entries, now, Op::Expire { key: key.to_string(), ttl })
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        Ok(live(&mut entries, key, now)
            .and_then(|entry| entry.expires_at_ms)
            .map(|at| Duration::from_millis(at.saturating_sub(now))))
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        match live(&mut entries, key, now) {
            Some(entry) => match &entry.value {
                ValueKind::Hash(fields) => Ok(fields.get(field).cloned()),
                _ => Err(wrong_type(key)),
            },
            None => Ok(None),
        }
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        apply_op(&mut entries, now, Op::HSet {
            key: key.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        apply_op(&mut entries, now, Op::ZAdd {
            key: key.to_string(),
            member: member.to_string(),
            score,
        })
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        let (removed, now_empty) = {
            let Some(entry) = live(&mut entries, key, now) else {
                return Ok(false);
            };
            match &mut entry.value {
                ValueKind::Sorted(members) => {
                    let removed = members.remove(member).is_some();
                    (removed, members.is_empty())
                }
                _ => return Err(wrong_type(key)),
            }
        };
        // Redis drops empty sorted sets entirely.
        if now_empty {
            entries.remove(key);
        }
        Ok(removed)
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        match live(&mut entries, key, now) {
            Some(entry) => match &entry.value {
                ValueKind::Sorted(members) => Ok(members.len() as u64),
                _ => Err(wrong_type(key)),
            },
            None => Ok(0),
        }
    }

    async fn zrange(
        &self,
        key: &str,
        limit: usize,
        order: Order,
    ) -> Result<Vec<String>, StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        let mut members: Vec<(String, f64)> = match live(&mut entries, key, now) {
            Some(entry) => match &entry.value {
                ValueKind::Sorted(members) => {
                    members.iter().map(|(m, s)| (m.clone(), *s)).collect()
                }
                _ => return Err(wrong_type(key)),
            },
            None => return Ok(Vec::new()),
        };
        members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        if order == Order::Desc {
            members.reverse();
        }
        let take = if limit == 0 { members.len() } else { limit };
        Ok(members.into_iter().take(take).map(|(m, _)| m).collect())
    }

    async fn pipeline(&self, ops: Vec<Op>) -> Result<(), StoreError> {
        let now = self.now_ms();
        let mut entries = self.entries.lock();
        for op in ops {
            apply_op(&mut entries, now, op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
