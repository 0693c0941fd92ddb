// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sweep-workflow: declarative DAG definitions for scan jobs.
//!
//! Workflows are HCL documents, one per file:
//!
//! ```hcl
//! workflow "gmarket-update-v2" {
//!   start_node = "load_products"
//!
//!   node "load_products" {
//!     type       = "extract_by_product_set"
//!     config     = { sale_status = "${sale_status}", limit = "${limit}" }
//!     next_nodes = ["write_results"]
//!
//!     retry {
//!       max_attempts = 3
//!       backoff_ms   = 1000
//!     }
//!   }
//! }
//! ```
//!
//! Definitions are validated at load time (edges resolve, the static
//! graph is acyclic); the engine re-checks for deadlock at run time as a
//! second line of defense against dynamically routed nodes.

pub mod definition;
pub mod error;
pub mod loader;
pub mod parser;
pub mod template;

pub use definition::{NodeDef, RetryPolicy, WorkflowDef};
pub use error::WorkflowError;
pub use loader::WorkflowLibrary;
pub use parser::parse_workflow;
pub use template::substitute;
