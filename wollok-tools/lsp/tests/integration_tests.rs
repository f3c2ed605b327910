//! Integration tests for the Wollok LSP server.

use pretty_assertions::assert_eq;
use tower_lsp::lsp_types::*;
use wollok_lsp::document::Document;
use wollok_lsp::highlight::{walk, Lines, ReferenceStrategy, Token, TokenCategory};
use wollok_lsp::semantic_tokens::{SemanticTokensProvider, TokenType};
use wollok_model::Environment;

const BIRDS_URI: &str = "file:///birds.wlk";

const BIRDS_SOURCE: &str = "class Bird {\n  var energy = 0 // initial\n}";

/// Snapshot the toolchain would emit for [`BIRDS_SOURCE`].
const BIRDS_SNAPSHOT: &str = r#"{
    "nodes": [
        { "kind": "Environment", "children": [1] },
        { "kind": "Package", "name": "birds", "fileName": "file:///birds.wlk", "children": [2] },
        { "kind": "Class", "name": "Bird", "children": [3],
          "sourceMap": { "start": { "line": 1, "column": 1 }, "end": { "line": 3, "column": 2 } } },
        { "kind": "Field", "name": "energy", "children": [4],
          "sourceMap": { "start": { "line": 2, "column": 3 }, "end": { "line": 2, "column": 17 } } },
        { "kind": "Literal", "value": 0,
          "sourceMap": { "start": { "line": 2, "column": 16 }, "end": { "line": 2, "column": 17 } } }
    ],
    "problems": [
        { "code": "shouldDefineConstInsteadOfVar", "level": "Warning", "node": 3 }
    ]
}"#;

/// Creates a test document from source code.
fn make_doc(uri: &str, source: &str) -> Document {
    let uri = Url::parse(uri).expect("valid URL");
    Document::new(uri, 1, source.to_string())
}

fn birds() -> Environment {
    Environment::from_json(BIRDS_SNAPSHOT).expect("valid snapshot")
}

mod highlighting {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bird_scenario() {
        let env = birds();
        let lines = Lines::new(BIRDS_SOURCE);
        let package = env.package_for_file(BIRDS_URI).expect("birds package");

        let tokens = walk(&env, package, &lines, ReferenceStrategy::FirstMatch);
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 0, 5, TokenCategory::Keyword),
                Token::new(0, 6, 4, TokenCategory::Class),
                Token::new(1, 2, 3, TokenCategory::Keyword),
                Token::new(1, 6, 6, TokenCategory::Field),
                Token::new(1, 15, 1, TokenCategory::NumberLiteral),
                Token::new(1, 17, 10, TokenCategory::Comment),
            ]
        );
    }

    #[test]
    fn test_block_comment_across_lines() {
        let lines = Lines::new("/* header\n   still header */\n// trailing");

        let tokens = wollok_lsp::highlight::process_comments(&lines);
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 0, 9, TokenCategory::Comment),
                Token::new(1, 0, 18, TokenCategory::Comment),
                Token::new(2, 0, 11, TokenCategory::Comment),
            ]
        );
    }
}

mod semantic_tokens {
    use super::*;
    use pretty_assertions::assert_eq;

    fn types(tokens: &SemanticTokens) -> Vec<(u32, u32, u32, u32)> {
        tokens
            .data
            .iter()
            .map(|t| (t.delta_line, t.delta_start, t.length, t.token_type))
            .collect()
    }

    #[test]
    fn test_snapshot_to_encoded_tokens() {
        let env = birds();
        let doc = make_doc(BIRDS_URI, BIRDS_SOURCE);

        let tokens = SemanticTokensProvider::default().provide(Some(&env), &doc);
        assert_eq!(
            types(&tokens),
            vec![
                (0, 0, 5, TokenType::Keyword as u32),
                (0, 6, 4, TokenType::Class as u32),
                (1, 2, 3, TokenType::Keyword as u32),
                (0, 4, 6, TokenType::Property as u32),
                (0, 9, 1, TokenType::Number as u32),
                (0, 2, 10, TokenType::Comment as u32),
            ]
        );
    }

    #[test]
    fn test_unknown_document_highlights_comments() {
        let env = birds();
        let doc = make_doc("file:///other.wlk", "object x {} // note");

        let tokens = SemanticTokensProvider::default().provide(Some(&env), &doc);
        assert_eq!(types(&tokens), vec![(0, 12, 7, TokenType::Comment as u32)]);

        let without_env = SemanticTokensProvider::default().provide(None, &doc);
        assert_eq!(without_env.data, tokens.data);
    }
}

mod diagnostics {
    use super::*;
    use pretty_assertions::assert_eq;
    use wollok_lsp::diagnostics::DiagnosticEngine;

    #[test]
    fn test_problems_become_warnings() {
        let env = birds();
        let doc = make_doc(BIRDS_URI, BIRDS_SOURCE);

        let diagnostics = DiagnosticEngine::default().check(&env, env.problems(), &doc);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Variable should be const");
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(
            diagnostics[0].range,
            Range::new(Position::new(1, 2), Position::new(1, 16))
        );
    }

    #[test]
    fn test_other_documents_get_nothing() {
        let env = birds();
        let doc = make_doc("file:///other.wlk", "");

        assert!(DiagnosticEngine::default().check(&env, env.problems(), &doc).is_empty());
    }
}

mod features {
    use super::*;
    use pretty_assertions::assert_eq;
    use wollok_lsp::completion::CompletionProvider;
    use wollok_lsp::hover::HoverProvider;
    use wollok_lsp::symbols::SymbolProvider;

    #[test]
    fn test_hover_on_field() {
        let env = birds();
        let doc = make_doc(BIRDS_URI, BIRDS_SOURCE);

        let hover = HoverProvider::new()
            .hover(&env, &doc, Position::new(1, 7))
            .expect("hover");
        assert_eq!(hover.range.map(|r| r.start), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_completion_inside_class() {
        let env = birds();
        let doc = make_doc(BIRDS_URI, BIRDS_SOURCE);

        let labels: Vec<String> = CompletionProvider::new()
            .complete(&env, &doc, Position::new(0, 11), None)
            .into_iter()
            .map(|item| item.label)
            .collect();
        assert!(labels.iter().any(|label| label.starts_with("method")));
    }

    #[test]
    fn test_document_symbols() {
        let env = birds();
        let doc = make_doc(BIRDS_URI, BIRDS_SOURCE);

        let symbols = SymbolProvider::new().document_symbols(&env, &doc);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "Bird");
        let members = symbols[0].children.as_ref().expect("members");
        assert_eq!(members[0].name, "energy");
        assert_eq!(members[0].kind, SymbolKind::FIELD);
    }
}

#[cfg(unix)]
mod analyzer {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use wollok_model::{Analyzer, ExternalAnalyzer, SourceFile};

    #[test]
    fn test_external_analyzer_round_trip() {
        let mut snapshot = tempfile::NamedTempFile::new().expect("temp file");
        snapshot
            .write_all(BIRDS_SNAPSHOT.as_bytes())
            .expect("write snapshot");

        // Drain stdin, then answer with the prepared snapshot.
        let script = format!("cat > /dev/null; cat '{}'", snapshot.path().display());
        let analyzer = ExternalAnalyzer::new("sh").with_args(vec!["-c".to_string(), script]);

        let env = analyzer
            .build_environment(&[SourceFile::new(BIRDS_URI, BIRDS_SOURCE)])
            .expect("environment");
        assert_eq!(analyzer.validate(&env).len(), 1);

        let doc = make_doc(BIRDS_URI, BIRDS_SOURCE);
        let tokens = SemanticTokensProvider::default().provide(Some(&env), &doc);
        assert_eq!(tokens.data.len(), 6);
    }
}
