//! Wollok Program Model
//!
//! Read-only view of the program graph produced by the Wollok toolchain,
//! shared by the editor tooling:
//!
//! - [`Environment`]: the node arena with navigation and hierarchy queries
//! - [`EnvironmentBuilder`]: programmatic construction
//! - [`Analyzer`]: the seam to the external parser and validator
//! - [`print`]: source rendering for popups
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  files   ┌──────────────┐
//! │   Editor    │─────────►│   Analyzer   │
//! │   tooling   │◄─────────│  (toolchain) │
//! └─────────────┘ snapshot └──────────────┘
//! ```

pub mod analyzer;
pub mod builder;
pub mod environment;
pub mod error;
pub mod node;
pub mod print;
pub mod problem;

pub use analyzer::{Analyzer, ExternalAnalyzer, SourceFile};
pub use builder::EnvironmentBuilder;
pub use environment::{Environment, CLOSURE_APPLY, LANGUAGE_PACKAGE, OBJECT_CLASS};
pub use error::{AnalyzerError, ModelError};
pub use node::{LiteralValue, Node, NodeData, NodeId, NodeKind, SourceMap, SourcePosition};
pub use print::{print, PrintOptions};
pub use problem::{Problem, ProblemLevel};
