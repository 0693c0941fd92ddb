// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow definition errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("failed to read workflow file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse workflow: {0}")]
    Parse(#[from] hcl::Error),

    #[error("workflow file {path} defines '{found}', expected '{expected}'")]
    WrongId { path: String, expected: String, found: String },

    #[error("workflow '{workflow}' is invalid: {message}")]
    Invalid { workflow: String, message: String },

    #[error("unknown workflow '{0}'")]
    Unknown(String),
}
