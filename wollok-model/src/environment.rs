//! Program Environment
//!
//! The immutable program graph built by the toolchain for a set of files,
//! together with the structural queries editor features need: navigation,
//! qualified names, method lookup through the inheritance hierarchy and the
//! problems reported by the validator.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::ModelError;
use crate::node::{LiteralValue, Node, NodeData, NodeId, NodeKind};
use crate::problem::Problem;

/// The root class every class and singleton implicitly inherits from.
pub const OBJECT_CLASS: &str = "wollok.lang.Object";

/// Name of the synthetic method that implements a closure body.
pub const CLOSURE_APPLY: &str = "<apply>";

/// Name of the package holding the language's own library.
pub const LANGUAGE_PACKAGE: &str = "wollok";

/// Wire format of a snapshot emitted by the toolchain.
#[derive(Debug, Deserialize)]
struct Snapshot {
    nodes: Vec<Node>,
    #[serde(default)]
    problems: Vec<Problem>,
}

/// An immutable program graph.
///
/// Node `0` is always the `Environment` root. Every other node has exactly one
/// parent and is reachable from the root.
#[derive(Debug, Clone)]
pub struct Environment {
    nodes: Vec<Node>,
    problems: Vec<Problem>,
}

impl Environment {
    /// Assembles an environment from an arena of nodes, checking that every
    /// link points at an existing node and that the children form a tree.
    pub fn from_nodes(mut nodes: Vec<Node>, problems: Vec<Problem>) -> Result<Self, ModelError> {
        let Some(root) = nodes.first() else {
            return Err(ModelError::Empty);
        };
        if !root.is(NodeKind::Environment) {
            return Err(ModelError::MissingRoot {
                found: root.kind().to_string(),
            });
        }

        let len = nodes.len();
        let check = |from: usize, to: NodeId| {
            if to.index() < len {
                Ok(())
            } else {
                Err(ModelError::DanglingNode {
                    from: NodeId(from as u32),
                    to,
                })
            }
        };

        let mut parents: Vec<Option<NodeId>> = vec![None; len];
        for (index, node) in nodes.iter().enumerate() {
            for &child in &node.children {
                check(index, child)?;
                if child.index() == 0 || parents[child.index()].is_some() {
                    return Err(ModelError::MultipleParents { node: child });
                }
                parents[child.index()] = Some(NodeId(index as u32));
            }
            for link in node.data.links() {
                check(index, link)?;
            }
        }
        for problem in &problems {
            check(0, problem.node)?;
        }

        for (node, parent) in nodes.iter_mut().zip(parents) {
            node.parent = parent;
        }

        let env = Self { nodes, problems };

        let mut reached = vec![false; len];
        for id in env.walk(env.root()) {
            reached[id.index()] = true;
        }
        if let Some(index) = reached.iter().position(|seen| !seen) {
            return Err(ModelError::Unreachable {
                node: NodeId(index as u32),
            });
        }

        Ok(env)
    }

    /// Decodes a JSON snapshot (`{"nodes": [...], "problems": [...]}`).
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Self::from_nodes(snapshot.nodes, snapshot.problems)
    }

    /// Decodes a JSON snapshot from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        Self::from_nodes(snapshot.nodes, snapshot.problems)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this environment.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).name()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Pre-order traversal starting at (and including) `id`.
    pub fn walk(&self, id: NodeId) -> Walk<'_> {
        Walk {
            env: self,
            stack: vec![id],
        }
    }

    /// Pre-order traversal of everything below `id`.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.walk(id).skip(1)
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            env: self,
            current: self.parent(id),
        }
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn has_problems(&self, id: NodeId) -> bool {
        self.problems.iter().any(|problem| problem.node == id)
    }

    /// First node below `id` (pre-order) that has problems attached.
    pub fn first_node_with_problems(&self, id: NodeId) -> Option<NodeId> {
        self.descendants(id).find(|&child| self.has_problems(child))
    }

    /// Nearest package enclosing `id`, `id` included.
    pub fn package_of(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&node| self.kind(node) == NodeKind::Package)
    }

    /// File `id` was written in, looked up on the node or its ancestors.
    pub fn source_file(&self, id: NodeId) -> Option<&str> {
        std::iter::once(id).chain(self.ancestors(id)).find_map(|node| {
            let node = self.node(node);
            match &node.data {
                NodeData::Package {
                    file_name: Some(file),
                    ..
                } => Some(file.as_str()),
                _ => node.source_file.as_deref(),
            }
        })
    }

    /// The package that was built from the given file.
    pub fn package_for_file(&self, file: &str) -> Option<NodeId> {
        self.walk(self.root()).find(|&id| {
            matches!(
                &self.node(id).data,
                NodeData::Package { file_name: Some(name), .. } if name == file
            )
        })
    }

    /// Top-level packages that belong to the user's project.
    pub fn project_packages(&self) -> Vec<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .filter(|&id| {
                self.kind(id) == NodeKind::Package && self.name(id) != Some(LANGUAGE_PACKAGE)
            })
            .collect()
    }

    /// Dotted name of an entity, including its enclosing packages.
    pub fn fully_qualified_name(&self, id: NodeId) -> Option<String> {
        let name = self.name(id)?;
        let mut segments: Vec<&str> = self
            .ancestors(id)
            .filter(|&ancestor| self.kind(ancestor) == NodeKind::Package)
            .filter_map(|ancestor| self.name(ancestor))
            .collect();
        segments.reverse();
        segments.push(name);
        Some(segments.join("."))
    }

    /// Finds a package or module by its fully qualified name.
    pub fn entity_by_fqn(&self, fqn: &str) -> Option<NodeId> {
        self.walk(self.root()).find(|&id| {
            let kind = self.kind(id);
            (kind == NodeKind::Package || kind.is_module())
                && self.fully_qualified_name(id).as_deref() == Some(fqn)
        })
    }

    /// The node a reference resolves to, if the toolchain linked one.
    pub fn target(&self, reference: NodeId) -> Option<NodeId> {
        match &self.node(reference).data {
            NodeData::Reference { target, .. } => *target,
            _ => None,
        }
    }

    /// Children of `id` of the given kind, in declaration order.
    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.kind(child) == kind)
            .collect()
    }

    pub fn fields(&self, module: NodeId) -> Vec<NodeId> {
        self.children_of_kind(module, NodeKind::Field)
    }

    pub fn methods(&self, module: NodeId) -> Vec<NodeId> {
        self.children_of_kind(module, NodeKind::Method)
    }

    pub fn parameters(&self, method: NodeId) -> Vec<NodeId> {
        self.children_of_kind(method, NodeKind::Parameter)
    }

    /// Resolved supertypes of a module, in declaration order.
    pub fn supertypes(&self, module: NodeId) -> Vec<NodeId> {
        let references = match &self.node(module).data {
            NodeData::Class { supertypes, .. }
            | NodeData::Singleton { supertypes, .. }
            | NodeData::Mixin { supertypes, .. } => supertypes.as_slice(),
            _ => return Vec::new(),
        };
        references
            .iter()
            .filter_map(|&reference| match self.kind(reference) {
                NodeKind::Reference => self.target(reference),
                _ => Some(reference),
            })
            .filter(|&target| self.kind(target).is_module())
            .collect()
    }

    /// Method resolution order of a module.
    ///
    /// The module comes first, then its mixins (last declared first), then its
    /// superclass chain. Classes and singletons end in `wollok.lang.Object`
    /// when the environment defines it. Cyclic hierarchies are cut at the
    /// first repeated module.
    pub fn linearization(&self, module: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut visited = FxHashSet::default();
        self.linearize(module, &mut order, &mut visited);

        if self.kind(module) != NodeKind::Mixin {
            if let Some(object) = self.entity_by_fqn(OBJECT_CLASS) {
                if visited.insert(object) {
                    order.push(object);
                }
            }
        }
        order
    }

    fn linearize(&self, module: NodeId, order: &mut Vec<NodeId>, visited: &mut FxHashSet<NodeId>) {
        if !visited.insert(module) {
            return;
        }
        order.push(module);

        let (mixins, classes): (Vec<NodeId>, Vec<NodeId>) = self
            .supertypes(module)
            .into_iter()
            .partition(|&supertype| self.kind(supertype) == NodeKind::Mixin);

        for mixin in mixins.into_iter().rev() {
            self.linearize(mixin, order, visited);
        }
        for class in classes {
            self.linearize(class, order, visited);
        }
    }

    /// Every method understood by a module, most specific definition first.
    ///
    /// Overridden methods (same name and arity) appear once.
    pub fn all_methods(&self, module: NodeId) -> Vec<NodeId> {
        let mut methods: IndexMap<(String, usize), NodeId> = IndexMap::new();
        for owner in self.linearization(module) {
            for method in self.methods(owner) {
                let name = self.name(method).unwrap_or_default().to_string();
                let arity = self.parameters(method).len();
                methods.entry((name, arity)).or_insert(method);
            }
        }
        methods.into_values().collect()
    }

    /// Every method declared anywhere in the environment.
    pub fn all_available_methods(&self) -> Vec<NodeId> {
        self.walk(self.root())
            .filter(|&id| self.kind(id) == NodeKind::Method)
            .collect()
    }

    /// The class a literal value is an instance of.
    pub fn literal_class(&self, value: &LiteralValue) -> Option<NodeId> {
        self.entity_by_fqn(value.class_name())
    }

    /// Whether a singleton is the implementation of a closure.
    pub fn is_closure(&self, singleton: NodeId) -> bool {
        self.methods(singleton)
            .into_iter()
            .any(|method| self.name(method) == Some(CLOSURE_APPLY))
    }
}

/// Pre-order iterator over a subtree.
pub struct Walk<'a> {
    env: &'a Environment,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.env.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Iterator over the parent chain of a node.
pub struct Ancestors<'a> {
    env: &'a Environment,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.env.parent(id);
        Some(id)
    }
}
