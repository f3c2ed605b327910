//! Validation Problems
//!
//! Problems are reported by the toolchain's validator and attached to the
//! environment snapshot they were computed for.

use serde::{Deserialize, Serialize};

use crate::node::{NodeId, SourceMap};

/// Severity of a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemLevel {
    Warning,
    Error,
}

/// A single rule violation found by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Rule identifier, e.g. `nameShouldBeginWithLowercase`.
    pub code: String,
    pub level: ProblemLevel,
    /// The offending node.
    pub node: NodeId,
    /// Values interpolated into the rule message (`{0}`, `{1}`, ...).
    #[serde(default)]
    pub values: Vec<String>,
    /// Exact region of the problem when narrower than the node itself.
    #[serde(default)]
    pub source_map: Option<SourceMap>,
}

impl Problem {
    pub fn new(code: impl Into<String>, level: ProblemLevel, node: NodeId) -> Self {
        Self {
            code: code.into(),
            level,
            node,
            values: Vec::new(),
            source_map: None,
        }
    }

    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.values = values;
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == ProblemLevel::Error
    }
}
