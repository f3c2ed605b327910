//! Code Lens Provider
//!
//! Run commands above programs (`.wpgm`) and tests (`.wtest`).

use serde_json::Value;
use tower_lsp::lsp_types::*;
use wollok_model::{Environment, NodeData, NodeId, NodeKind};

use crate::cursor::to_range;
use crate::document::Document;

pub const COMMAND_RUN_GAME: &str = "wollok.run.game";
pub const COMMAND_RUN_PROGRAM: &str = "wollok.run.program";
pub const COMMAND_RUN_TEST: &str = "wollok.run.test";

/// Provider for code lenses.
pub struct CodeLensProvider;

impl CodeLensProvider {
    pub fn new() -> Self {
        Self
    }

    /// Lenses for a document; `None` for files without runnable content.
    pub fn provide(&self, env: &Environment, doc: &Document) -> Option<Vec<CodeLens>> {
        let file = env.package_for_file(doc.file_name())?;

        if doc.is_program_file() {
            Some(program_lenses(env, file))
        } else if doc.is_test_file() {
            Some(test_lenses(env, file))
        } else {
            None
        }
    }
}

impl Default for CodeLensProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lens(range: Range, command: &str, title: &str, arguments: Vec<Value>) -> CodeLens {
    CodeLens {
        range,
        command: Some(Command {
            title: title.to_string(),
            command: command.to_string(),
            arguments: Some(arguments),
        }),
        data: None,
    }
}

fn located_range(env: &Environment, id: NodeId) -> Range {
    env.node(id).source_map.as_ref().map(to_range).unwrap_or_default()
}

/// "Run game" and "Run program" for every program in the file.
pub fn program_lenses(env: &Environment, file: NodeId) -> Vec<CodeLens> {
    env.children_of_kind(file, NodeKind::Program)
        .into_iter()
        .flat_map(|program| {
            let range = located_range(env, program);
            let fqn = Value::from(env.fully_qualified_name(program));
            [
                lens(range, COMMAND_RUN_GAME, "Run game", vec![fqn.clone()]),
                lens(range, COMMAND_RUN_PROGRAM, "Run program", vec![fqn]),
            ]
        })
        .collect()
}

/// "Run all tests" at the top of the file, then one lens per describe and
/// test.
pub fn test_lenses(env: &Environment, file: NodeId) -> Vec<CodeLens> {
    let file_name = Value::from(env.source_file(file).map(str::to_string));
    let mut lenses = vec![lens(
        Range::default(),
        COMMAND_RUN_TEST,
        "Run all tests",
        vec![Value::Null, file_name.clone(), Value::Null, Value::Null],
    )];

    for node in env.descendants(file) {
        let (describe, test, title) = match &env.node(node).data {
            NodeData::Describe { name } => (Some(name.as_str()), None, "Run describe"),
            NodeData::Test { name, .. } => {
                let describe = env.parent(node).and_then(|parent| match &env.node(parent).data {
                    NodeData::Describe { name } => Some(name.as_str()),
                    _ => None,
                });
                (describe, Some(name.as_str()), "Run test")
            }
            _ => continue,
        };

        let unquoted = |name: Option<&str>| Value::from(name.map(remove_quotes));
        lenses.push(lens(
            located_range(env, node),
            COMMAND_RUN_TEST,
            title,
            vec![Value::Null, file_name.clone(), unquoted(describe), unquoted(test)],
        ));
    }

    lenses
}

/// Test and describe names keep their quotes in the program graph.
fn remove_quotes(name: &str) -> String {
    name.replace('"', "")
}
