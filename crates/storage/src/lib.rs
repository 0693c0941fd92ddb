// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sweep-storage: shared state store abstraction and repositories.
//!
//! Everything the orchestration core persists goes through the
//! [`StateStore`] trait: per-platform job queues, job records, platform
//! locks, scheduler/watcher bookkeeping, and rate-limit windows. The
//! production backend is Redis; tests and local runs use the in-memory
//! backend with clock-driven expiry.

pub mod error;
pub mod keys;
pub mod store;

pub mod memory;
pub mod redis_store;

pub mod lock;
pub mod monitor_state;
pub mod queue;
pub mod ratelimit;
pub mod scheduler_state;

pub use error::StoreError;
pub use lock::{PlatformLock, RunningJob};
pub use memory::MemoryStore;
pub use monitor_state::MonitorStateRepo;
pub use queue::{JobQueueRepo, QueueDiscipline, TTL_PENDING, TTL_RUNNING, TTL_TERMINAL};
pub use ratelimit::RateLimiter;
pub use redis_store::RedisStore;
pub use scheduler_state::{HeartbeatStatus, PlatformState, SchedulerStateRepo};
pub use store::{Op, Order, StateStore};
