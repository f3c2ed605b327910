//! Node Classifier
//!
//! Turns one program node into the tokens that highlight it, plus the name
//! bindings it makes visible to nodes visited after it.

use serde::Deserialize;
use wollok_model::{Environment, LiteralValue, NodeData, NodeId, NodeKind};

use super::keywords::{
    keyword, operator_spellings, CONST, EXCLUDED_REFERENCES, GLOBAL_REFERENCE, INHERITS, PROPERTY,
    SYNTHETIC_MEMBER_PREFIX, VAR,
};
use super::lines::{Anchor, Lines};
use super::token::{emit, Token, TokenCategory};
use super::ClassifyError;

/// A name visible to later nodes, and how references to it are highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub category: TokenCategory,
}

impl Binding {
    pub fn new(name: impl Into<String>, category: TokenCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

/// Which binding wins when several share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceStrategy {
    /// The earliest binding in traversal order.
    #[default]
    FirstMatch,
    /// The latest binding in traversal order.
    MostRecent,
}

/// Bindings accumulated during one traversal. Only ever grows.
#[derive(Debug, Clone)]
pub struct ReferenceContext {
    entries: Vec<Binding>,
    strategy: ReferenceStrategy,
}

impl ReferenceContext {
    /// Creates a context holding only the global bindings.
    pub fn new(strategy: ReferenceStrategy) -> Self {
        Self {
            entries: vec![Binding::new(GLOBAL_REFERENCE, TokenCategory::Reference)],
            strategy,
        }
    }

    pub fn bind(&mut self, binding: Binding) {
        self.entries.push(binding);
    }

    pub fn extend(&mut self, bindings: impl IntoIterator<Item = Binding>) {
        self.entries.extend(bindings);
    }

    /// Category a reference named `name` is highlighted with.
    pub fn resolve(&self, name: &str) -> Option<TokenCategory> {
        let matches = |binding: &&Binding| binding.name == name;
        let found = match self.strategy {
            ReferenceStrategy::FirstMatch => self.entries.iter().find(matches),
            ReferenceStrategy::MostRecent => self.entries.iter().rev().find(matches),
        };
        found.map(|binding| binding.category)
    }
}

/// Result of classifying a single node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub tokens: Vec<Token>,
    pub bindings: Vec<Binding>,
}

impl Classification {
    pub fn none() -> Self {
        Self::default()
    }

    fn tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            bindings: Vec::new(),
        }
    }

    fn binding(mut self, name: &str, category: TokenCategory) -> Self {
        self.bindings.push(Binding::new(name, category));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.bindings.is_empty()
    }
}

/// Locates sub-tokens within the text that starts at one node.
struct Plotter<'l, 'a> {
    lines: &'l Lines<'a>,
    anchor: Anchor,
}

impl Plotter<'_, '_> {
    fn span(&self, needle: &str, category: TokenCategory) -> Result<Token, ClassifyError> {
        let column = self.lines.locate(self.anchor, needle)?;
        Ok(emit(
            self.anchor.line,
            column,
            needle.chars().count() as u32,
            category,
        ))
    }

    fn keyword(&self, text: &str) -> Result<Token, ClassifyError> {
        self.span(text, TokenCategory::Keyword)
    }

    fn kind_keyword(&self, kind: NodeKind) -> Result<Token, ClassifyError> {
        let text = keyword(kind).ok_or_else(|| ClassifyError::NoKeyword { kind })?;
        self.keyword(text)
    }

    /// First spelling of `spellings` present after the anchor.
    fn first_of(&self, spellings: &[&str], category: TokenCategory) -> Result<Token, ClassifyError> {
        let mut last_error = None;
        for spelling in spellings {
            match self.span(spelling, category) {
                Ok(token) => return Ok(token),
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error.unwrap_or(ClassifyError::TokenNotFound {
            token: String::new(),
            line: self.anchor.line,
        }))
    }

    /// A string literal including its delimiters.
    fn string(&self, value: &str) -> Result<Token, ClassifyError> {
        let length = value.chars().count() as u32 + 2;
        for quote in ['"', '\''] {
            let quoted = format!("{quote}{value}{quote}");
            if let Ok(column) = self.lines.locate(self.anchor, &quoted) {
                return Ok(emit(self.anchor.line, column, length, TokenCategory::StringLiteral));
            }
        }
        // Escaped content does not appear verbatim; fall back to the raw text.
        let column = self.lines.locate(self.anchor, value)?;
        Ok(emit(
            self.anchor.line,
            column.saturating_sub(1),
            length,
            TokenCategory::StringLiteral,
        ))
    }

    /// `const`/`var`, optional `property`, then the declared name.
    fn declaration(
        &self,
        name: &str,
        is_constant: bool,
        is_property: bool,
        category: TokenCategory,
    ) -> Result<Classification, ClassifyError> {
        let mut tokens = vec![self.keyword(if is_constant { CONST } else { VAR })?];
        if is_property {
            tokens.push(self.keyword(PROPERTY)?);
        }
        tokens.push(self.span(name, category)?);
        Ok(Classification::tokens(tokens).binding(name, category))
    }

    /// Module keyword, optional `inherits`, then the module name.
    fn module(
        &self,
        kind: NodeKind,
        name: &str,
        has_supertypes: bool,
        category: TokenCategory,
    ) -> Result<Classification, ClassifyError> {
        let mut tokens = vec![self.kind_keyword(kind)?];
        if has_supertypes {
            tokens.push(self.keyword(INHERITS)?);
        }
        tokens.push(self.span(name, category)?);
        Ok(Classification::tokens(tokens).binding(name, category))
    }
}

/// Classifies a single node.
///
/// Nodes without a source map yield nothing. A token that cannot be found in
/// its line is an error for this node only; callers are expected to skip it
/// and continue.
pub fn classify(
    env: &Environment,
    id: NodeId,
    lines: &Lines<'_>,
    context: &ReferenceContext,
) -> Result<Classification, ClassifyError> {
    let node = env.node(id);
    let Some(anchor) = Anchor::of(node) else {
        return Ok(Classification::none());
    };
    let plot = Plotter { lines, anchor };

    match &node.data {
        NodeData::Class {
            name, supertypes, ..
        } => plot.module(NodeKind::Class, name, !supertypes.is_empty(), TokenCategory::Class),

        NodeData::Mixin { name, supertypes } => {
            plot.module(NodeKind::Mixin, name, !supertypes.is_empty(), TokenCategory::Mixin)
        }

        NodeData::Singleton { name, .. } => {
            let authored = env
                .children(id)
                .iter()
                .filter(|&&member| matches!(env.kind(member), NodeKind::Field | NodeKind::Method))
                .all(|&member| {
                    !env.name(member)
                        .is_some_and(|name| name.starts_with(SYNTHETIC_MEMBER_PREFIX))
                });

            let mut tokens = Vec::new();
            if authored {
                tokens.push(plot.kind_keyword(NodeKind::Singleton)?);
            }
            match name {
                Some(name) => {
                    tokens.push(plot.span(name, TokenCategory::Singleton)?);
                    Ok(Classification::tokens(tokens).binding(name, TokenCategory::Singleton))
                }
                None => Ok(Classification::tokens(tokens)),
            }
        }

        NodeData::Field {
            name,
            is_constant,
            is_property,
        } => {
            if node.is_synthetic {
                return Ok(Classification::none());
            }
            plot.declaration(name, *is_constant, *is_property, TokenCategory::Field)
        }

        NodeData::Variable { name, is_constant } => {
            plot.declaration(name, *is_constant, false, TokenCategory::Variable)
        }

        NodeData::Reference { name, .. } => {
            if EXCLUDED_REFERENCES.contains(&name.as_str()) {
                return Ok(Classification::none());
            }
            match context.resolve(name) {
                Some(category) => Ok(Classification::tokens(vec![plot.span(name, category)?])),
                None => Ok(Classification::none()),
            }
        }

        NodeData::Parameter { name, .. } => {
            let token = plot.span(name, TokenCategory::Parameter)?;
            Ok(Classification::tokens(vec![token]).binding(name, TokenCategory::Parameter))
        }

        NodeData::Method { name, .. } => {
            if node.is_synthetic {
                return Ok(Classification::none());
            }
            Ok(Classification::tokens(vec![
                plot.span(name, TokenCategory::Method)?,
                plot.kind_keyword(NodeKind::Method)?,
            ]))
        }

        NodeData::Send { message } => {
            let token = match operator_spellings(message) {
                Some(spellings) => plot.first_of(spellings, TokenCategory::Operator)?,
                None => plot.span(message, TokenCategory::Method)?,
            };
            Ok(Classification::tokens(vec![token]))
        }

        NodeData::Return
        | NodeData::If
        | NodeData::Describe { .. }
        | NodeData::Test { .. }
        | NodeData::New { .. }
        | NodeData::SelfRef
        | NodeData::Assignment => Ok(Classification::tokens(vec![plot.kind_keyword(node.kind())?])),

        NodeData::Literal { value } => {
            if node.is_synthetic {
                return Ok(Classification::none());
            }
            let token = match value {
                LiteralValue::Number(_) | LiteralValue::Boolean(_) => {
                    let category = if matches!(value, LiteralValue::Number(_)) {
                        TokenCategory::NumberLiteral
                    } else {
                        TokenCategory::BooleanLiteral
                    };
                    let text = value.textual_form().unwrap_or_default();
                    plot.span(&text, category)?
                }
                LiteralValue::String(text) => plot.string(text)?,
                LiteralValue::Null | LiteralValue::Object { .. } | LiteralValue::Collection { .. } => {
                    return Ok(Classification::none())
                }
            };
            Ok(Classification::tokens(vec![token]))
        }

        NodeData::Package { name, .. } => {
            // File packages carry no `package` keyword in their text.
            match (
                plot.kind_keyword(NodeKind::Package),
                plot.span(name, TokenCategory::Package),
            ) {
                (Ok(keyword), Ok(identifier)) => Ok(Classification::tokens(vec![keyword, identifier])
                    .binding(name, TokenCategory::Package)),
                _ => Ok(Classification::none()),
            }
        }

        NodeData::Import { entity, .. } => {
            let entity_name = env.name(*entity).unwrap_or_default();
            Ok(Classification::tokens(vec![
                plot.kind_keyword(NodeKind::Import)?,
                plot.span(entity_name, TokenCategory::Reference)?,
            ])
            .binding(entity_name, TokenCategory::Reference))
        }

        NodeData::Program { name } => Ok(Classification::tokens(vec![
            plot.kind_keyword(NodeKind::Program)?,
            plot.span(name, TokenCategory::Program)?,
        ])),

        NodeData::Environment
        | NodeData::Body
        | NodeData::Super
        | NodeData::Try
        | NodeData::Catch
        | NodeData::Throw
        | NodeData::NamedArgument { .. } => Ok(Classification::none()),
    }
}
