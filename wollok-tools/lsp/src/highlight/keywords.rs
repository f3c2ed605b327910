//! Keyword tables for the node classifier.

use wollok_model::NodeKind;

/// The keyword that introduces a node of the given kind.
pub fn keyword(kind: NodeKind) -> Option<&'static str> {
    Some(match kind {
        NodeKind::Package => "package",
        NodeKind::Import => "import",
        NodeKind::Program => "program",
        NodeKind::Describe => "describe",
        NodeKind::Test => "test",
        NodeKind::Class => "class",
        NodeKind::Singleton => "object",
        NodeKind::Mixin => "mixin",
        NodeKind::Method => "method",
        NodeKind::Return => "return",
        NodeKind::Assignment => "=",
        NodeKind::SelfRef => "self",
        NodeKind::New => "new",
        NodeKind::If => "if",
        _ => return None,
    })
}

pub const INHERITS: &str = "inherits";
pub const CONST: &str = "const";
pub const VAR: &str = "var";
pub const PROPERTY: &str = "property";

/// Messages highlighted as keywords, with the spellings they may have in
/// source, tried in order.
const OPERATOR_MESSAGES: &[(&str, &[&str])] = &[
    ("&&", &["&&", "and"]),
    ("and", &["and", "&&"]),
    ("||", &["||", "or"]),
    ("or", &["or", "||"]),
    ("negate", &["!", "not"]),
    ("not", &["not", "!"]),
];

/// Source spellings of a keyword-like message, or `None` for ordinary
/// messages.
pub fn operator_spellings(message: &str) -> Option<&'static [&'static str]> {
    OPERATOR_MESSAGES
        .iter()
        .find(|(name, _)| *name == message)
        .map(|(_, spellings)| *spellings)
}

/// Names the toolchain uses for literal sugar; references to them are not
/// highlighted.
pub const EXCLUDED_REFERENCES: &[&str] = &["wollok.lang.Closure", "wollok.lang.List", "wollok.lang.Set"];

/// A global name that is always bound.
pub const GLOBAL_REFERENCE: &str = "console";

/// Member names starting with this are injected by the toolchain.
pub const SYNTHETIC_MEMBER_PREFIX: char = '<';
