// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers and proptest strategies.

pub mod strategies {
    use crate::job::JobStatus;
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Pending),
            Just(JobStatus::Running),
            Just(JobStatus::Completed),
            Just(JobStatus::Failed),
            Just(JobStatus::Cancelled),
        ]
    }

    /// Small free-form params maps: string, integer, and bool leaves.
    pub fn arb_params() -> impl Strategy<Value = Map<String, Value>> {
        let leaf = prop_oneof![
            "[a-z0-9_]{1,12}".prop_map(Value::String),
            any::<i32>().prop_map(|n| Value::Number(n.into())),
            any::<bool>().prop_map(Value::Bool),
        ];
        proptest::collection::hash_map("[a-z_]{1,10}", leaf, 0..6)
            .prop_map(|entries| entries.into_iter().collect())
    }
}
