// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `${var}` substitution over node configs.
//!
//! A config value that is exactly `${name}` is replaced by the param with
//! its original JSON type; `${name}` embedded in a longer string
//! interpolates with string coercion. Arrays and objects recurse.
//! Unresolved tokens survive literally.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Regex pattern for ${variable_name} or ${namespace.variable_name}
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_-]*)*)\}")
        .expect("constant regex pattern is valid")
});

/// Anchored variant matching a whole-token `${name}` value.
#[allow(clippy::expect_used)]
static WHOLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_-]*)*)\}$")
        .expect("constant regex pattern is valid")
});

/// Resolve `${var}` tokens in `value` against `params`.
pub fn substitute(value: &Value, params: &Map<String, Value>) -> Value {
    match value {
        Value::String(s) => substitute_string(s, params),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| substitute(item, params)).collect())
        }
        Value::Object(fields) => Value::Object(
            fields.iter().map(|(k, v)| (k.clone(), substitute(v, params))).collect(),
        ),
        other => other.clone(),
    }
}

fn substitute_string(s: &str, params: &Map<String, Value>) -> Value {
    // Whole-token substitution preserves the param's JSON type.
    if let Some(captures) = WHOLE_PATTERN.captures(s) {
        return match params.get(&captures[1]) {
            Some(param) => param.clone(),
            None => Value::String(s.to_string()),
        };
    }

    // Embedded substitutions coerce to string.
    let interpolated = VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        match params.get(&caps[1]) {
            Some(param) => coerce(param),
            None => caps[0].to_string(),
        }
    });
    Value::String(interpolated.into_owned())
}

/// String form of a param for embedded interpolation.
fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
