// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job shared state.
//!
//! Side-band channel between the strategies of one job: scraped records,
//! timing, anything too bulky or too transient for the accumulated DAG
//! output. Process-local; workers do not share it. The engine discards a
//! job's entry on every exit path.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use sweep_core::{JobId, Params};

/// All live per-job maps, keyed by job id.
#[derive(Clone, Default)]
pub struct SharedStateMap {
    inner: Arc<Mutex<HashMap<JobId, Params>>>,
}

impl SharedStateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle scoped to one job. Creating a handle does not allocate an
    /// entry; the first insert does.
    pub fn handle(&self, job_id: JobId) -> JobSharedState {
        JobSharedState { job_id, inner: self.inner.clone() }
    }

    /// Drop a job's entry. Called by the engine on completion, failure,
    /// and kill alike.
    pub fn discard(&self, job_id: &JobId) {
        self.inner.lock().remove(job_id);
    }

    /// Number of jobs currently holding state.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// One job's view of the shared state.
#[derive(Clone)]
pub struct JobSharedState {
    job_id: JobId,
    inner: Arc<Mutex<HashMap<JobId, Params>>>,
}

impl JobSharedState {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().get(&self.job_id)?.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.inner.lock().entry(self.job_id).or_default().insert(key.into(), value);
    }

    /// Append to an array value, creating it if missing.
    pub fn push(&self, key: &str, value: Value) {
        let mut inner = self.inner.lock();
        let entry = inner.entry(self.job_id).or_default();
        match entry.get_mut(key) {
            Some(Value::Array(items)) => items.push(value),
            _ => {
                entry.insert(key.to_string(), Value::Array(vec![value]));
            }
        }
    }

    /// Remove and return a value.
    pub fn take(&self, key: &str) -> Option<Value> {
        self.inner.lock().get_mut(&self.job_id)?.remove(key)
    }
}

#[cfg(test)]
#[path = "shared_state_tests.rs"]
mod tests;
