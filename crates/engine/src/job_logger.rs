// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only logger for per-job activity logs.

use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use sweep_core::{JobId, NodeId};

/// Append-only logger for per-job activity logs.
///
/// Writes human-readable timestamped lines to:
///   `<log_dir>/job/<job_id>.log`
///
/// Each `append()` call opens, writes, and closes the file.
/// This is safe for the low write frequency of job events.
pub struct JobLogger {
    log_dir: PathBuf,
}

impl JobLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self { log_dir: log_dir.into() }
    }

    /// Returns the base log directory path.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn job_log_path(&self, job_id: &JobId) -> PathBuf {
        self.log_dir.join("job").join(format!("{job_id}.log"))
    }

    /// Append a log line for the given job.
    ///
    /// Format: `2026-01-30T08:14:09Z [node] message`
    ///
    /// Failures are logged via tracing but do not propagate — logging
    /// must not break the engine.
    pub fn append(&self, job_id: &JobId, node: &NodeId, message: &str) {
        let path = self.job_log_path(job_id);
        if let Err(e) = self.write_line(&path, node.as_str(), message) {
            tracing::warn!(
                job = %job_id,
                error = %e,
                "failed to write job log"
            );
        }
    }

    /// Append a job-level line not tied to a node (scheduling, terminal
    /// transitions).
    pub fn append_job(&self, job_id: &JobId, message: &str) {
        let path = self.job_log_path(job_id);
        if let Err(e) = self.write_line(&path, "job", message) {
            tracing::warn!(
                job = %job_id,
                error = %e,
                "failed to write job log"
            );
        }
    }

    fn write_line(&self, path: &Path, tag: &str, message: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let ts = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        writeln!(file, "{} [{}] {}", ts, tag, message)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_logger_tests.rs"]
mod tests;
