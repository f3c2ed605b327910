//! Token Emitter

use std::fmt;

/// What a highlighted span of text is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenCategory {
    Keyword,
    /// Keyword-like message sends such as `&&` or `not`.
    Operator,
    Method,
    Class,
    Singleton,
    Mixin,
    Field,
    Variable,
    Parameter,
    Reference,
    Package,
    Program,
    NumberLiteral,
    BooleanLiteral,
    StringLiteral,
    Comment,
}

impl TokenCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::Keyword => "Keyword",
            TokenCategory::Operator => "Send",
            TokenCategory::Method => "Method",
            TokenCategory::Class => "Class",
            TokenCategory::Singleton => "Singleton",
            TokenCategory::Mixin => "Mixin",
            TokenCategory::Field => "Field",
            TokenCategory::Variable => "Variable",
            TokenCategory::Parameter => "Parameter",
            TokenCategory::Reference => "Reference",
            TokenCategory::Package => "Package",
            TokenCategory::Program => "Program",
            TokenCategory::NumberLiteral => "Literal_number",
            TokenCategory::BooleanLiteral => "Literal_bool",
            TokenCategory::StringLiteral => "Literal_string",
            TokenCategory::Comment => "Comment",
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified span of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub category: TokenCategory,
}

impl Token {
    pub fn new(line: u32, column: u32, length: u32, category: TokenCategory) -> Self {
        Self {
            line,
            column,
            length,
            category,
        }
    }

    /// Sort key for protocol encoding.
    pub fn position(&self) -> (u32, u32) {
        (self.line, self.column)
    }
}

/// Builds a token. Spans are not checked against the document.
pub fn emit(line: u32, column: u32, length: u32, category: TokenCategory) -> Token {
    Token::new(line, column, length, category)
}
