// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node type registry.

use crate::node::NodeStrategy;
use std::collections::HashMap;

type Factory = Box<dyn Fn() -> Box<dyn NodeStrategy> + Send + Sync>;

/// Maps node type to a factory returning a fresh strategy instance per
/// execution. Factories capture their adapter clones at registration.
#[derive(Default)]
pub struct NodeRegistry {
    factories: HashMap<String, Factory>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, node_type: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn NodeStrategy> + Send + Sync + 'static,
    {
        self.factories.insert(node_type.into(), Box::new(factory));
    }

    /// Fresh strategy for a node type, or `None` for unknown types.
    pub fn create(&self, node_type: &str) -> Option<Box<dyn NodeStrategy>> {
        self.factories.get(node_type).map(|factory| factory())
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.factories.contains_key(node_type)
    }

    pub fn node_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
