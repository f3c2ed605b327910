//! Analyzer Bridge
//!
//! The parser, validator and type inference live in the external Wollok
//! toolchain. This module defines the seam editor tooling talks to, plus an
//! implementation that runs the toolchain as a child process.
//!
//! # Protocol
//!
//! The child receives the files to analyze as JSON on stdin and answers with
//! an environment snapshot on stdout:
//!
//! ```text
//! stdin:  {"files": [{"name": "file:///birds.wlk", "content": "object pepita {}"}]}
//! stdout: {"nodes": [...], "problems": [...]}
//! ```
//!
//! A non-zero exit status means the files could not be analyzed at all; the
//! child's stderr is reported back as the reason.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use serde::Serialize;
use tracing::{debug, warn};

use crate::environment::Environment;
use crate::error::AnalyzerError;
use crate::problem::Problem;

/// A file handed to the toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Entry points of the external analysis library.
pub trait Analyzer: Send + Sync {
    /// Parses and links `files` into a program graph.
    fn build_environment(&self, files: &[SourceFile]) -> Result<Environment, AnalyzerError>;

    /// Runs the validator over a built environment.
    ///
    /// The default returns the problems the toolchain attached to the
    /// snapshot when it was built.
    fn validate(&self, environment: &Environment) -> Vec<Problem> {
        environment.problems().to_vec()
    }
}

#[derive(Serialize)]
struct Request<'a> {
    files: &'a [SourceFile],
}

/// Runs the toolchain as a child process per build.
#[derive(Debug, Clone)]
pub struct ExternalAnalyzer {
    program: String,
    args: Vec<String>,
}

impl ExternalAnalyzer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Analyzer for ExternalAnalyzer {
    fn build_environment(&self, files: &[SourceFile]) -> Result<Environment, AnalyzerError> {
        let payload = serde_json::to_vec(&Request { files }).map_err(AnalyzerError::Encode)?;

        debug!("Running analyzer {} on {} file(s)", self.program, files.len());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AnalyzerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from another thread so a chatty child cannot fill its
        // stdout pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || {
                if let Err(err) = stdin.write_all(&payload) {
                    warn!("Analyzer closed stdin early: {}", err);
                }
            })
        });

        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            let _ = writer.join();
        }

        if !output.status.success() {
            return Err(AnalyzerError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(Environment::from_slice(&output.stdout)?)
    }
}
