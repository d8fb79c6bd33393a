//! Collector for the non-fatal problems noticed while evaluating.
//!
//! Evaluation never fails on bad input; it falls back (hidden, empty
//! text) and records what happened here so callers and the `check`
//! command can surface it.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Placeholder paths that resolved to nothing.
    pub unresolved_paths: Vec<String>,
    /// Reasons for condition nodes that could not be understood.
    pub malformed_conditions: Vec<String>,
    /// Leaf operators other than `eq`, `neq` and `in`.
    pub unknown_operators: Vec<String>,
    /// Formatter names that are not recognised.
    pub unknown_formats: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_unresolved(&mut self, path: &str) {
        push_unique(&mut self.unresolved_paths, path);
    }

    pub fn record_malformed(&mut self, reason: &str) {
        push_unique(&mut self.malformed_conditions, reason);
    }

    pub fn record_unknown_operator(&mut self, op: &str) {
        push_unique(&mut self.unknown_operators, op);
    }

    pub fn record_unknown_format(&mut self, name: &str) {
        push_unique(&mut self.unknown_formats, name);
    }

    pub fn is_empty(&self) -> bool {
        self.unresolved_paths.is_empty()
            && self.malformed_conditions.is_empty()
            && self.unknown_operators.is_empty()
            && self.unknown_formats.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|x| x == item) {
        list.push(item.to_string());
    }
}
