//! Semantic Tokens Provider
//!
//! Encodes highlight tokens for the editor protocol.

use tower_lsp::lsp_types::*;
use tracing::debug;
use wollok_model::Environment;

use crate::document::Document;
use crate::highlight::{process_comments, walk, Lines, ReferenceStrategy, Token, TokenCategory};

/// Semantic token types advertised in the legend, in legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TokenType {
    Namespace = 0,
    Class = 1,
    Interface = 2,
    Parameter = 3,
    Variable = 4,
    Property = 5,
    Function = 6,
    Method = 7,
    Keyword = 8,
    Comment = 9,
    String = 10,
    Number = 11,
    Operator = 12,
}

impl TokenType {
    /// Returns the LSP token type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Namespace => "namespace",
            TokenType::Class => "class",
            TokenType::Interface => "interface",
            TokenType::Parameter => "parameter",
            TokenType::Variable => "variable",
            TokenType::Property => "property",
            TokenType::Function => "function",
            TokenType::Method => "method",
            TokenType::Keyword => "keyword",
            TokenType::Comment => "comment",
            TokenType::String => "string",
            TokenType::Number => "number",
            TokenType::Operator => "operator",
        }
    }

    /// Returns all token types.
    pub fn all() -> Vec<SemanticTokenType> {
        vec![
            SemanticTokenType::NAMESPACE,
            SemanticTokenType::CLASS,
            SemanticTokenType::INTERFACE,
            SemanticTokenType::PARAMETER,
            SemanticTokenType::VARIABLE,
            SemanticTokenType::PROPERTY,
            SemanticTokenType::FUNCTION,
            SemanticTokenType::METHOD,
            SemanticTokenType::KEYWORD,
            SemanticTokenType::COMMENT,
            SemanticTokenType::STRING,
            SemanticTokenType::NUMBER,
            SemanticTokenType::OPERATOR,
        ]
    }
}

impl From<TokenCategory> for TokenType {
    fn from(category: TokenCategory) -> Self {
        match category {
            TokenCategory::Keyword | TokenCategory::BooleanLiteral => TokenType::Keyword,
            TokenCategory::Operator => TokenType::Operator,
            TokenCategory::Method => TokenType::Method,
            TokenCategory::Class | TokenCategory::Singleton => TokenType::Class,
            TokenCategory::Mixin => TokenType::Interface,
            TokenCategory::Field => TokenType::Property,
            TokenCategory::Variable | TokenCategory::Reference => TokenType::Variable,
            TokenCategory::Parameter => TokenType::Parameter,
            TokenCategory::Package => TokenType::Namespace,
            TokenCategory::Program => TokenType::Function,
            TokenCategory::NumberLiteral => TokenType::Number,
            TokenCategory::StringLiteral => TokenType::String,
            TokenCategory::Comment => TokenType::Comment,
        }
    }
}

/// Returns the semantic tokens legend.
pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TokenType::all(),
        token_modifiers: Vec::new(),
    }
}

/// Provider for semantic tokens.
pub struct SemanticTokensProvider {
    strategy: ReferenceStrategy,
}

impl SemanticTokensProvider {
    pub fn new(strategy: ReferenceStrategy) -> Self {
        Self { strategy }
    }

    /// Provides semantic tokens for a document.
    ///
    /// Without an environment, or when the file is not part of it, only
    /// comments are highlighted.
    pub fn provide(&self, env: Option<&Environment>, doc: &Document) -> SemanticTokens {
        let text = doc.text();
        let lines = Lines::new(&text);

        let package = env.and_then(|env| Some((env, env.package_for_file(doc.file_name())?)));
        let tokens = match package {
            Some((env, package)) => walk(env, package, &lines, self.strategy),
            None => {
                debug!("No program graph for {}, highlighting comments only", doc.uri());
                process_comments(&lines)
            }
        };

        SemanticTokens {
            result_id: None,
            data: encode(tokens),
        }
    }
}

impl Default for SemanticTokensProvider {
    fn default() -> Self {
        Self::new(ReferenceStrategy::default())
    }
}

/// Sorts tokens by position and delta-encodes them.
///
/// Exact duplicates are dropped and so are tokens overlapping the previous
/// one on the same line, which the protocol does not allow. Of two tokens
/// starting at the same position, the shorter one comes first and wins.
pub fn encode(mut tokens: Vec<Token>) -> Vec<SemanticToken> {
    tokens.sort_by_key(|token| (token.position(), token.length, token.category));
    tokens.dedup();

    let mut data = Vec::with_capacity(tokens.len());
    let mut prev_line = 0u32;
    let mut prev_char = 0u32;
    let mut prev_end: Option<(u32, u32)> = None;

    for token in tokens {
        if token.length == 0 {
            continue;
        }
        if let Some((line, end)) = prev_end {
            if line == token.line && token.column < end {
                continue;
            }
        }

        let delta_line = token.line - prev_line;
        let delta_start = if delta_line == 0 {
            token.column - prev_char
        } else {
            token.column
        };

        data.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: TokenType::from(token.category) as u32,
            token_modifiers_bitset: 0,
        });

        prev_line = token.line;
        prev_char = token.column;
        prev_end = Some((token.line, token.column + token.length));
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_legend_matches_token_types() {
        let legend = legend();
        assert_eq!(legend.token_types.len(), 13);
        for token_type in [TokenType::Namespace, TokenType::Method, TokenType::Operator] {
            assert_eq!(
                legend.token_types[token_type as usize].as_str(),
                token_type.as_str()
            );
        }
    }

    #[test]
    fn test_encode_sorts_and_deltas() {
        let tokens = vec![
            Token::new(1, 6, 6, TokenCategory::Variable),
            Token::new(0, 6, 4, TokenCategory::Class),
            Token::new(1, 2, 3, TokenCategory::Keyword),
            Token::new(0, 0, 5, TokenCategory::Keyword),
            Token::new(0, 0, 5, TokenCategory::Keyword),
        ];

        let data = encode(tokens);
        let deltas: Vec<(u32, u32, u32, u32)> = data
            .iter()
            .map(|t| (t.delta_line, t.delta_start, t.length, t.token_type))
            .collect();

        assert_eq!(
            deltas,
            vec![
                (0, 0, 5, TokenType::Keyword as u32),
                (0, 6, 4, TokenType::Class as u32),
                (1, 2, 3, TokenType::Keyword as u32),
                (0, 4, 6, TokenType::Variable as u32),
            ]
        );
    }

    #[test]
    fn test_encode_drops_overlaps() {
        let tokens = vec![
            Token::new(0, 0, 10, TokenCategory::Comment),
            Token::new(0, 3, 2, TokenCategory::Keyword),
            Token::new(0, 12, 0, TokenCategory::Keyword),
        ];

        assert_eq!(encode(tokens).len(), 1);
    }

    #[test]
    fn test_encode_keeps_shortest_token_per_start() {
        let tokens = vec![
            Token::new(0, 0, 6, TokenCategory::Variable),
            Token::new(0, 0, 3, TokenCategory::Keyword),
            Token::new(0, 0, 3, TokenCategory::Keyword),
            Token::new(0, 4, 2, TokenCategory::Field),
        ];

        let data: Vec<(u32, u32, u32, u32)> = encode(tokens)
            .iter()
            .map(|t| (t.delta_line, t.delta_start, t.length, t.token_type))
            .collect();
        assert_eq!(
            data,
            vec![
                (0, 0, 3, TokenType::Keyword as u32),
                (0, 4, 2, TokenType::Property as u32),
            ]
        );
    }

    #[test]
    fn test_provide_without_environment_highlights_comments() {
        let uri = Url::parse("file:///birds.wlk").unwrap();
        let doc = Document::new(uri, 1, "// birds\nobject pepita {}".to_string());

        let tokens = SemanticTokensProvider::default().provide(None, &doc);
        assert_eq!(tokens.data.len(), 1);
        assert_eq!(tokens.data[0].token_type, TokenType::Comment as u32);
        assert_eq!(tokens.data[0].length, 8);
    }
}
