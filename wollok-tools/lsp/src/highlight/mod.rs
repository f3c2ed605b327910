//! Semantic Highlighting
//!
//! Classifies the program graph of one document into highlighted spans.
//!
//! The pass walks every node in document order, asking the classifier for the
//! tokens of each node and threading a growing [`ReferenceContext`] through
//! the walk so references are highlighted like the declarations they name.
//! Comments are found separately from the raw text and appended at the end.

mod classify;
mod comments;
mod keywords;
mod lines;
mod token;
mod walker;

use thiserror::Error;
use wollok_model::NodeKind;

pub use classify::{classify, Binding, Classification, ReferenceContext, ReferenceStrategy};
pub use comments::process_comments;
pub use lines::{Anchor, Lines};
pub use token::{emit, Token, TokenCategory};
pub use walker::{process_code, walk};

/// Why a single node could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("line {line} is outside the document ({count} lines)")]
    LineOutOfRange { line: u32, count: usize },

    #[error("`{token}` not found on line {line}")]
    TokenNotFound { token: String, line: u32 },

    #[error("{kind} nodes have no keyword")]
    NoKeyword { kind: NodeKind },
}
