// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record and status state machine.

use crate::clock::Clock;
use crate::id::JobId;
use crate::node::NodeId;
use crate::platform::Platform;
use crate::workflow::WorkflowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Queue priority levels. Higher runs first.
pub mod priority {
    /// Continuation jobs re-enter the queue at LOW so fresh scheduler
    /// jobs win ties; long platform sweeps yield to queue fairness.
    pub const LOW: i64 = 1;
    pub const DEFAULT: i64 = 5;
    pub const HIGH: i64 = 10;
}

/// Free-form key/value payload: job params, node results, metadata.
pub type Params = Map<String, Value>;

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Queued, present in exactly one platform queue
    Pending,
    /// Dequeued by a worker, executing
    Running,
    /// Clean DAG finish
    Completed,
    /// Unrecoverable node error or kill signal
    Failed,
    /// Admin intervention
    Cancelled,
}

impl JobStatus {
    /// Check if this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Error recorded on a failed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFailure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    pub timestamp: DateTime<Utc>,
}

/// Inputs for creating a new job.
#[derive(Debug, Clone)]
pub struct JobDraft {
    pub workflow_id: WorkflowId,
    pub platform: Platform,
    pub priority: i64,
    pub params: Params,
    pub current_node: Option<NodeId>,
    pub metadata: Params,
}

impl JobDraft {
    pub fn new(workflow_id: impl Into<WorkflowId>, platform: impl Into<Platform>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            platform: platform.into(),
            priority: priority::DEFAULT,
            params: Params::new(),
            current_node: None,
            metadata: Params::new(),
        }
    }

    crate::setters! {
        set {
            priority: i64,
            params: Params,
            metadata: Params,
        }
        option {
            current_node: NodeId,
        }
    }

    /// Materialize a pending job with a fresh time-ordered ID.
    pub fn create(self, clock: &impl Clock) -> Job {
        Job {
            job_id: JobId::generate(clock.epoch_ms()),
            workflow_id: self.workflow_id,
            platform: self.platform,
            priority: self.priority,
            status: JobStatus::Pending,
            params: self.params,
            current_node: self.current_node,
            progress: 0.0,
            result: Params::new(),
            error: None,
            created_at: clock.now_utc(),
            started_at: None,
            completed_at: None,
            metadata: self.metadata,
        }
    }
}

/// A unit of work bound to one platform and one workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub workflow_id: WorkflowId,
    pub platform: Platform,
    pub priority: i64,
    pub status: JobStatus,
    #[serde(default)]
    pub params: Params,
    /// Node the engine starts (or resumes) from; updated as the DAG advances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_node: Option<NodeId>,
    /// Fraction of DAG nodes executed, in [0, 1].
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub result: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Params,
}

impl Job {
    /// Transition to running (worker dequeued this job).
    pub fn mark_running(&mut self, clock: &impl Clock) {
        self.status = JobStatus::Running;
        self.started_at = Some(clock.now_utc());
    }

    /// Transition to completed with the accumulated DAG output.
    pub fn mark_completed(&mut self, result: Params, clock: &impl Clock) {
        self.status = JobStatus::Completed;
        self.progress = 1.0;
        self.result = result;
        self.completed_at = Some(clock.now_utc());
    }

    /// Transition to failed, recording where and when.
    pub fn mark_failed(
        &mut self,
        message: impl Into<String>,
        node_id: Option<NodeId>,
        clock: &impl Clock,
    ) {
        self.status = JobStatus::Failed;
        self.error = Some(JobFailure {
            message: message.into(),
            node_id,
            timestamp: clock.now_utc(),
        });
        self.completed_at = Some(clock.now_utc());
    }

    /// Transition to cancelled (admin intervention).
    pub fn mark_cancelled(&mut self, clock: &impl Clock) {
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(clock.now_utc());
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Seconds since the job started, for running-job introspection.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        match self.started_at {
            Some(started) => (now - started).num_seconds().max(0),
            None => 0,
        }
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            job_id: JobId = "job-0000000001000abc123",
            workflow_id: WorkflowId = "gmarket-update-v2",
            platform: Platform = "gmarket",
        }
        set {
            priority: i64 = priority::DEFAULT,
            status: JobStatus = JobStatus::Pending,
            params: Params = Params::new(),
            progress: f64 = 0.0,
            result: Params = Params::new(),
            metadata: Params = Params::new(),
        }
        option {
            current_node: NodeId = None,
            error: JobFailure = None,
            started_at: DateTime<Utc> = None,
            completed_at: DateTime<Utc> = None,
        }
        computed {
            created_at: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
