// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow library: directory-backed loader with an in-process cache.

use crate::definition::WorkflowDef;
use crate::error::WorkflowError;
use crate::parser::parse_workflow;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use sweep_core::WorkflowId;

/// Loads `{dir}/{workflow-id}.hcl` on first use and caches the parsed
/// definition for the life of the process. Definitions are immutable
/// once loaded; a deployment restart picks up edited files.
pub struct WorkflowLibrary {
    dir: PathBuf,
    cache: RwLock<HashMap<WorkflowId, Arc<WorkflowDef>>>,
}

impl WorkflowLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), cache: RwLock::new(HashMap::new()) }
    }

    pub fn load(&self, id: &WorkflowId) -> Result<Arc<WorkflowDef>, WorkflowError> {
        if let Some(def) = self.cache.read().get(id) {
            return Ok(def.clone());
        }

        let path = self.dir.join(format!("{id}.hcl"));
        let content = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                WorkflowError::Unknown(id.to_string())
            } else {
                WorkflowError::Io { path: path.display().to_string(), source }
            }
        })?;

        let def = parse_workflow(&content)?;
        if def.id != *id {
            return Err(WorkflowError::WrongId {
                path: path.display().to_string(),
                expected: id.to_string(),
                found: def.id.to_string(),
            });
        }

        tracing::debug!(workflow = %id, nodes = def.node_count(), "loaded workflow definition");
        let def = Arc::new(def);
        self.cache.write().insert(id.clone(), def.clone());
        Ok(def)
    }

    /// Register a definition directly, bypassing the filesystem. Used by
    /// tests and embedded deployments.
    pub fn insert(&self, def: WorkflowDef) {
        self.cache.write().insert(def.id.clone(), Arc::new(def));
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
