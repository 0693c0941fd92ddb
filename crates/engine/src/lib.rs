// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sweep-engine: the orchestration core.
//!
//! The scheduler decides which platform gets the next scan job, the
//! alert watcher does the same for periodic content checks, workers pump
//! their platform's queue under the platform lock, and the workflow
//! engine walks each job's DAG through registered node strategies.

pub mod admin;
pub mod engine;
pub mod error;
pub mod job_logger;
pub mod kill;
pub mod monitor;
pub mod node;
pub mod nodes;
pub mod registry;
pub mod retry;
pub mod scheduler;
pub mod shared_state;
pub mod worker;

#[cfg(test)]
pub mod test_helpers;

pub use admin::{
    AdminSurface, ForceReleaseReport, MonitorTaskState, QueueLengthEntry, RunningJobEntry,
    SchedulerStatusReport, WatcherStatusReport,
};
pub use engine::{ExecutionOutcome, WorkflowEngine};
pub use error::{EngineError, NodeError};
pub use job_logger::JobLogger;
pub use kill::KillSignal;
pub use monitor::AlertWatcher;
pub use node::{NodeContext, NodeOutput, NodeStrategy, Typed, TypedNode, TypedOutput};
pub use nodes::{builtin_registry, BuiltinServices, ScanDefaults};
pub use registry::NodeRegistry;
pub use scheduler::Scheduler;
pub use shared_state::{JobSharedState, SharedStateMap};
pub use worker::{Worker, WorkerPoll};
