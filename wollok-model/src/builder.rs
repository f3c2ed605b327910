//! Environment Builder
//!
//! Programmatic construction of program graphs, for embedders that produce
//! nodes themselves and for tests.

use crate::environment::Environment;
use crate::error::ModelError;
use crate::node::{Node, NodeData, NodeId, SourceMap};
use crate::problem::Problem;

/// Incrementally builds an [`Environment`].
///
/// The builder starts with the `Environment` root already in place; nodes are
/// appended under an existing parent and keep insertion order as document
/// order.
#[derive(Debug, Clone)]
pub struct EnvironmentBuilder {
    nodes: Vec<Node>,
    problems: Vec<Problem>,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Environment)],
            problems: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not created by this builder.
    pub fn add(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Appends a node with a source map.
    pub fn add_located(&mut self, parent: NodeId, data: NodeData, source_map: SourceMap) -> NodeId {
        let id = self.add(parent, data);
        self.nodes[id.index()].source_map = Some(source_map);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn located(&mut self, id: NodeId, source_map: SourceMap) -> &mut Self {
        self.nodes[id.index()].source_map = Some(source_map);
        self
    }

    pub fn synthetic(&mut self, id: NodeId) -> &mut Self {
        self.nodes[id.index()].is_synthetic = true;
        self
    }

    pub fn in_file(&mut self, id: NodeId, file: impl Into<String>) -> &mut Self {
        self.nodes[id.index()].source_file = Some(file.into());
        self
    }

    pub fn typed(&mut self, id: NodeId, type_name: impl Into<String>) -> &mut Self {
        self.nodes[id.index()].type_name = Some(type_name.into());
        self
    }

    /// Points a reference node at its target.
    pub fn link(&mut self, reference: NodeId, to: NodeId) -> &mut Self {
        if let NodeData::Reference { target, .. } = &mut self.nodes[reference.index()].data {
            *target = Some(to);
        }
        self
    }

    pub fn problem(&mut self, problem: Problem) -> &mut Self {
        self.problems.push(problem);
        self
    }

    /// Validates the graph and freezes it.
    pub fn build(self) -> Result<Environment, ModelError> {
        Environment::from_nodes(self.nodes, self.problems)
    }
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
