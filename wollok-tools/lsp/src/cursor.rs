//! Cursor Lookup
//!
//! Maps an editor position onto the program node under it.

use tower_lsp::lsp_types::{Position, Range};
use wollok_model::{Environment, NodeId, SourceMap};

/// The innermost node of `file` whose source region contains `position`.
pub fn cursor_node(env: &Environment, file: &str, position: Position) -> Option<NodeId> {
    let package = env.package_for_file(file)?;
    let (line, column) = (position.line + 1, position.character + 1);

    env.walk(package)
        .filter(|&id| {
            env.node(id)
                .source_map
                .is_some_and(|map| map.contains(line, column))
        })
        .last()
}

/// Like [`cursor_node`], falling back to the file's package when no node
/// covers the position.
pub fn cursor_node_or_package(env: &Environment, file: &str, position: Position) -> Option<NodeId> {
    cursor_node(env, file, position).or_else(|| env.package_for_file(file))
}

/// Converts a 1-based source region to an LSP range.
pub fn to_range(map: &SourceMap) -> Range {
    Range {
        start: Position {
            line: map.start.line.saturating_sub(1),
            character: map.start.column.saturating_sub(1),
        },
        end: Position {
            line: map.end.line.saturating_sub(1),
            character: map.end.column.saturating_sub(1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wollok_model::{EnvironmentBuilder, NodeData};

    #[test]
    fn test_cursor_picks_innermost_node() {
        let mut builder = EnvironmentBuilder::new();
        let root = builder.root();
        let package = builder.add(
            root,
            NodeData::Package {
                name: "birds".into(),
                file_name: Some("file:///birds.wlk".into()),
            },
        );
        let pepita = builder.add_located(
            package,
            NodeData::Singleton {
                name: Some("pepita".into()),
                supertypes: Vec::new(),
            },
            SourceMap::new((1, 1), (3, 2)),
        );
        let energy = builder.add_located(
            pepita,
            NodeData::Field {
                name: "energy".into(),
                is_constant: false,
                is_property: false,
            },
            SourceMap::new((2, 3), (2, 18)),
        );
        let env = builder.build().expect("valid environment");

        assert_eq!(cursor_node(&env, "file:///birds.wlk", Position::new(1, 5)), Some(energy));
        assert_eq!(cursor_node(&env, "file:///birds.wlk", Position::new(0, 3)), Some(pepita));
        assert_eq!(cursor_node(&env, "file:///birds.wlk", Position::new(7, 0)), None);
        assert_eq!(
            cursor_node_or_package(&env, "file:///birds.wlk", Position::new(7, 0)),
            Some(package)
        );
        assert_eq!(cursor_node(&env, "file:///other.wlk", Position::new(1, 5)), None);
    }

    #[test]
    fn test_to_range_is_zero_based() {
        let range = to_range(&SourceMap::new((2, 3), (2, 18)));
        assert_eq!(range.start, Position::new(1, 2));
        assert_eq!(range.end, Position::new(1, 17));
    }
}
