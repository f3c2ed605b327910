//! Model Errors

use thiserror::Error;

use crate::node::NodeId;

/// Errors raised while assembling an environment snapshot.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("environment snapshot contains no nodes")]
    Empty,

    #[error("first node must be the Environment root, found {found}")]
    MissingRoot { found: String },

    #[error("node {from} points at {to}, which does not exist")]
    DanglingNode { from: NodeId, to: NodeId },

    #[error("node {node} is listed as a child more than once")]
    MultipleParents { node: NodeId },

    #[error("node {node} is not reachable from the root")]
    Unreachable { node: NodeId },

    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while talking to the external analysis toolchain.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to run analyzer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("analyzer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("could not encode analyzer request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}
