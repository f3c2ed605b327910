//! Program Nodes
//!
//! The closed set of structural node kinds produced by the Wollok toolchain.
//!
//! Nodes live in an [`Environment`](crate::Environment) arena and refer to each
//! other through [`NodeId`]s. Children are stored in document order and follow
//! a fixed layout per kind:
//!
//! ```text
//! Class / Singleton / Mixin   supertype references, then fields and methods
//! Field / Variable            [value]
//! Method                      parameters, then [body]
//! Return / Throw              [value]
//! Assignment                  reference, value
//! Send                        receiver, arguments...
//! New                         instantiated reference, named arguments...
//! If                          condition, then body, [else body]
//! Try                         body, catches..., [always body]
//! Catch                       parameter, body
//! NamedArgument               value
//! Literal                     closure singleton or collection elements
//! Import                      entity reference
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a node inside its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the arena index of this node.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A position in a source file, with 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
    #[serde(default)]
    pub offset: u32,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            offset: 0,
        }
    }
}

/// The region of source text a node was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceMap {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceMap {
    /// Creates a source map from 1-based `(line, column)` pairs.
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start: SourcePosition::new(start.0, start.1),
            end: SourcePosition::new(end.0, end.1),
        }
    }

    /// Checks whether a 1-based position falls inside this region (inclusive).
    pub fn contains(&self, line: u32, column: u32) -> bool {
        let pos = (line, column);
        (self.start.line, self.start.column) <= pos && pos <= (self.end.line, self.end.column)
    }

    /// Checks whether `other` lies completely inside this region.
    pub fn encloses(&self, other: &SourceMap) -> bool {
        self.contains(other.start.line, other.start.column)
            && self.contains(other.end.line, other.end.column)
    }
}

/// Structural kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Environment,
    Package,
    Import,
    Program,
    Describe,
    Test,
    Class,
    Singleton,
    Mixin,
    Field,
    Variable,
    Parameter,
    Method,
    Body,
    Return,
    Assignment,
    Reference,
    #[serde(rename = "Self")]
    SelfRef,
    Super,
    Send,
    New,
    If,
    Try,
    Catch,
    Throw,
    Literal,
    NamedArgument,
}

impl NodeKind {
    /// Returns the toolchain's name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Environment => "Environment",
            NodeKind::Package => "Package",
            NodeKind::Import => "Import",
            NodeKind::Program => "Program",
            NodeKind::Describe => "Describe",
            NodeKind::Test => "Test",
            NodeKind::Class => "Class",
            NodeKind::Singleton => "Singleton",
            NodeKind::Mixin => "Mixin",
            NodeKind::Field => "Field",
            NodeKind::Variable => "Variable",
            NodeKind::Parameter => "Parameter",
            NodeKind::Method => "Method",
            NodeKind::Body => "Body",
            NodeKind::Return => "Return",
            NodeKind::Assignment => "Assignment",
            NodeKind::Reference => "Reference",
            NodeKind::SelfRef => "Self",
            NodeKind::Super => "Super",
            NodeKind::Send => "Send",
            NodeKind::New => "New",
            NodeKind::If => "If",
            NodeKind::Try => "Try",
            NodeKind::Catch => "Catch",
            NodeKind::Throw => "Throw",
            NodeKind::Literal => "Literal",
            NodeKind::NamedArgument => "NamedArgument",
        }
    }

    /// Classes, singletons and mixins.
    pub fn is_module(&self) -> bool {
        matches!(self, NodeKind::Class | NodeKind::Singleton | NodeKind::Mixin)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value carried by a literal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// A closure: the singleton node that implements it.
    Object { node: NodeId },
    /// A collection literal, e.g. `[1, 2]` for `wollok.lang.List`.
    Collection { collection: String },
}

impl LiteralValue {
    /// Returns the textual form of a numeric or boolean literal.
    ///
    /// Integral numbers print without a fractional part, matching how the
    /// toolchain renders them.
    pub fn textual_form(&self) -> Option<String> {
        match self {
            LiteralValue::Boolean(value) => Some(value.to_string()),
            LiteralValue::Number(value) => Some(format_number(*value)),
            _ => None,
        }
    }

    /// Fully qualified name of the runtime class of this value.
    pub fn class_name(&self) -> &str {
        match self {
            LiteralValue::Null => "wollok.lang.Object",
            LiteralValue::Boolean(_) => "wollok.lang.Boolean",
            LiteralValue::Number(_) => "wollok.lang.Number",
            LiteralValue::String(_) => "wollok.lang.String",
            LiteralValue::Object { .. } => "wollok.lang.Closure",
            LiteralValue::Collection { collection } => collection,
        }
    }
}

/// Formats a number the way the toolchain prints it.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Kind-specific payload of a node; one variant per structural kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum NodeData {
    Environment,
    Package {
        name: String,
        #[serde(default)]
        file_name: Option<String>,
    },
    Import {
        entity: NodeId,
        #[serde(default)]
        is_generic: bool,
    },
    Program {
        name: String,
    },
    Describe {
        name: String,
    },
    Test {
        name: String,
        #[serde(default)]
        is_only: bool,
    },
    Class {
        name: String,
        #[serde(default)]
        supertypes: Vec<NodeId>,
        #[serde(default)]
        is_abstract: bool,
    },
    Singleton {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        supertypes: Vec<NodeId>,
    },
    Mixin {
        name: String,
        #[serde(default)]
        supertypes: Vec<NodeId>,
    },
    Field {
        name: String,
        #[serde(default)]
        is_constant: bool,
        #[serde(default)]
        is_property: bool,
    },
    Variable {
        name: String,
        #[serde(default)]
        is_constant: bool,
    },
    Parameter {
        name: String,
        #[serde(default)]
        is_var_arg: bool,
    },
    Method {
        name: String,
        #[serde(default)]
        is_override: bool,
        #[serde(default)]
        is_native: bool,
    },
    Body,
    Return,
    Assignment,
    Reference {
        name: String,
        #[serde(default)]
        target: Option<NodeId>,
    },
    #[serde(rename = "Self")]
    SelfRef,
    Super,
    Send {
        message: String,
    },
    New {
        instantiated: NodeId,
    },
    If,
    Try,
    Catch,
    Throw,
    Literal {
        value: LiteralValue,
    },
    NamedArgument {
        name: String,
    },
}

impl NodeData {
    /// Returns the structural kind of this payload.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Environment => NodeKind::Environment,
            NodeData::Package { .. } => NodeKind::Package,
            NodeData::Import { .. } => NodeKind::Import,
            NodeData::Program { .. } => NodeKind::Program,
            NodeData::Describe { .. } => NodeKind::Describe,
            NodeData::Test { .. } => NodeKind::Test,
            NodeData::Class { .. } => NodeKind::Class,
            NodeData::Singleton { .. } => NodeKind::Singleton,
            NodeData::Mixin { .. } => NodeKind::Mixin,
            NodeData::Field { .. } => NodeKind::Field,
            NodeData::Variable { .. } => NodeKind::Variable,
            NodeData::Parameter { .. } => NodeKind::Parameter,
            NodeData::Method { .. } => NodeKind::Method,
            NodeData::Body => NodeKind::Body,
            NodeData::Return => NodeKind::Return,
            NodeData::Assignment => NodeKind::Assignment,
            NodeData::Reference { .. } => NodeKind::Reference,
            NodeData::SelfRef => NodeKind::SelfRef,
            NodeData::Super => NodeKind::Super,
            NodeData::Send { .. } => NodeKind::Send,
            NodeData::New { .. } => NodeKind::New,
            NodeData::If => NodeKind::If,
            NodeData::Try => NodeKind::Try,
            NodeData::Catch => NodeKind::Catch,
            NodeData::Throw => NodeKind::Throw,
            NodeData::Literal { .. } => NodeKind::Literal,
            NodeData::NamedArgument { .. } => NodeKind::NamedArgument,
        }
    }

    /// Returns the declared name, if this kind carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeData::Package { name, .. }
            | NodeData::Program { name }
            | NodeData::Describe { name }
            | NodeData::Test { name, .. }
            | NodeData::Class { name, .. }
            | NodeData::Mixin { name, .. }
            | NodeData::Field { name, .. }
            | NodeData::Variable { name, .. }
            | NodeData::Parameter { name, .. }
            | NodeData::Method { name, .. }
            | NodeData::Reference { name, .. }
            | NodeData::NamedArgument { name } => Some(name),
            NodeData::Singleton { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Node ids this payload points at (outside of the child list).
    pub(crate) fn links(&self) -> Vec<NodeId> {
        match self {
            NodeData::Import { entity, .. } => vec![*entity],
            NodeData::Class { supertypes, .. }
            | NodeData::Singleton { supertypes, .. }
            | NodeData::Mixin { supertypes, .. } => supertypes.clone(),
            NodeData::Reference { target, .. } => target.iter().copied().collect(),
            NodeData::New { instantiated } => vec![*instantiated],
            NodeData::Literal {
                value: LiteralValue::Object { node },
            } => vec![*node],
            _ => Vec::new(),
        }
    }
}

/// A node of the program graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(flatten)]
    pub data: NodeData,
    /// Where the node was parsed from; absent for synthetic nodes.
    #[serde(default)]
    pub source_map: Option<SourceMap>,
    /// File the node belongs to, when the toolchain records it on the node.
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Injected by the toolchain rather than written by the user.
    #[serde(default)]
    pub is_synthetic: bool,
    /// Name of the inferred type, if the toolchain computed one.
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    /// Creates a detached node with the given payload.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            source_map: None,
            source_file: None,
            children: Vec::new(),
            is_synthetic: false,
            type_name: None,
            parent: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn name(&self) -> Option<&str> {
        self.data.name()
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_map_contains() {
        let map = SourceMap::new((2, 3), (4, 1));

        assert!(map.contains(2, 3));
        assert!(map.contains(3, 80));
        assert!(map.contains(4, 1));
        assert!(!map.contains(2, 2));
        assert!(!map.contains(4, 2));

        assert!(map.encloses(&SourceMap::new((2, 5), (3, 1))));
        assert!(!map.encloses(&SourceMap::new((2, 5), (4, 9))));
    }

    #[test]
    fn test_number_textual_form() {
        assert_eq!(LiteralValue::Number(42.0).textual_form().as_deref(), Some("42"));
        assert_eq!(LiteralValue::Number(1.5).textual_form().as_deref(), Some("1.5"));
        assert_eq!(LiteralValue::Number(-3.0).textual_form().as_deref(), Some("-3"));
        assert_eq!(LiteralValue::Boolean(true).textual_form().as_deref(), Some("true"));
        assert_eq!(LiteralValue::String("hi".into()).textual_form(), None);
    }

    #[test]
    fn test_node_deserializes_from_tagged_json() {
        let node: Node = serde_json::from_str(
            r#"{
                "kind": "Field",
                "name": "energy",
                "isConstant": false,
                "isProperty": true,
                "sourceMap": {
                    "start": { "line": 2, "column": 3 },
                    "end": { "line": 2, "column": 17 }
                },
                "children": [4]
            }"#,
        )
        .expect("valid node");

        assert_eq!(node.kind(), NodeKind::Field);
        assert_eq!(node.name(), Some("energy"));
        assert_eq!(node.children, vec![NodeId(4)]);
        assert!(matches!(
            node.data,
            NodeData::Field {
                is_property: true,
                is_constant: false,
                ..
            }
        ));
        assert_eq!(node.source_map.map(|m| m.start.column), Some(3));
    }

    #[test]
    fn test_literal_values_deserialize_untagged() {
        let values: Vec<LiteralValue> =
            serde_json::from_str(r#"[null, true, 3, "bird", {"node": 7}, {"collection": "wollok.lang.Set"}]"#)
                .expect("valid literals");

        assert_eq!(
            values,
            vec![
                LiteralValue::Null,
                LiteralValue::Boolean(true),
                LiteralValue::Number(3.0),
                LiteralValue::String("bird".into()),
                LiteralValue::Object { node: NodeId(7) },
                LiteralValue::Collection {
                    collection: "wollok.lang.Set".into()
                },
            ]
        );
    }

    #[test]
    fn test_self_kind_uses_toolchain_name() {
        let node: Node = serde_json::from_str(r#"{ "kind": "Self" }"#).expect("valid node");
        assert_eq!(node.kind(), NodeKind::SelfRef);
        assert_eq!(node.kind().to_string(), "Self");
    }
}
