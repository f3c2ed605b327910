//! Pretty Printer
//!
//! Renders program nodes back to Wollok source, compactly enough to show in
//! editor popups.

use crate::environment::{Environment, CLOSURE_APPLY};
use crate::node::{format_number, LiteralValue, NodeData, NodeId};

/// Layout options for [`print`].
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Blocks that fit in this width are kept on one line.
    pub max_width: usize,
    /// Indent with two spaces instead of tabs.
    pub use_spaces: bool,
    /// Render `x = x + 1` as `x += 1`.
    pub abbreviate_assignments: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            max_width: 80,
            use_spaces: true,
            abbreviate_assignments: true,
        }
    }
}

/// Renders `id` and everything below it.
pub fn print(env: &Environment, id: NodeId, options: &PrintOptions) -> String {
    Printer { env, options }.node(id, 0)
}

const ABBREVIABLE: &[&str] = &["+", "-", "*", "/"];

struct Printer<'a> {
    env: &'a Environment,
    options: &'a PrintOptions,
}

impl Printer<'_> {
    fn indent(&self, level: usize) -> String {
        if self.options.use_spaces {
            "  ".repeat(level)
        } else {
            "\t".repeat(level)
        }
    }

    fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.env.children(id).get(index).copied()
    }

    fn join(&self, ids: &[NodeId], level: usize) -> String {
        ids.iter()
            .map(|&id| self.node(id, level))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn node(&self, id: NodeId, level: usize) -> String {
        let env = self.env;
        let node = env.node(id);
        let children = env.children(id);

        match &node.data {
            NodeData::Environment => children
                .iter()
                .map(|&child| self.node(child, level))
                .collect::<Vec<_>>()
                .join("\n\n"),
            NodeData::Package {
                file_name: Some(_), ..
            } => children
                .iter()
                .map(|&child| format!("{}{}", self.indent(level), self.node(child, level)))
                .collect::<Vec<_>>()
                .join("\n"),
            NodeData::Package { name, .. } => {
                format!("package {} {}", name, self.members(children, level))
            }
            NodeData::Import { entity, is_generic } => format!(
                "import {}{}",
                env.name(*entity).unwrap_or_default(),
                if *is_generic { ".*" } else { "" }
            ),
            NodeData::Program { name } => format!("program {} {}", name, self.bodies(children, level)),
            NodeData::Describe { name } => format!("describe {} {}", name, self.members(children, level)),
            NodeData::Test { name, is_only } => format!(
                "{}test {} {}",
                if *is_only { "only " } else { "" },
                name,
                self.bodies(children, level)
            ),
            NodeData::Class { name, supertypes, .. } => format!(
                "class {}{} {}",
                name,
                self.inherits(supertypes),
                self.members(&self.without(children, supertypes), level)
            ),
            NodeData::Mixin { name, supertypes } => format!(
                "mixin {}{} {}",
                name,
                self.inherits(supertypes),
                self.members(&self.without(children, supertypes), level)
            ),
            NodeData::Singleton { name, supertypes } => {
                if env.is_closure(id) {
                    return self.closure(id, level);
                }
                let name = name.as_deref().map(|n| format!(" {}", n)).unwrap_or_default();
                format!(
                    "object{}{} {}",
                    name,
                    self.inherits(supertypes),
                    self.members(&self.without(children, supertypes), level)
                )
            }
            NodeData::Field {
                name,
                is_constant,
                is_property,
            } => format!(
                "{}{} {}{}",
                if *is_constant { "const" } else { "var" },
                if *is_property { " property" } else { "" },
                name,
                self.initial_value(id, level)
            ),
            NodeData::Variable { name, is_constant } => format!(
                "{} {}{}",
                if *is_constant { "const" } else { "var" },
                name,
                self.initial_value(id, level)
            ),
            NodeData::Parameter { name, is_var_arg } => {
                format!("{}{}", name, if *is_var_arg { "..." } else { "" })
            }
            NodeData::Method {
                name,
                is_override,
                is_native,
            } => {
                let params = env.parameters(id);
                let signature = format!(
                    "{}method {}({})",
                    if *is_override { "override " } else { "" },
                    name,
                    self.join(&params, level)
                );
                if *is_native {
                    return format!("{} native", signature);
                }
                match self.without(children, &params).first() {
                    Some(&body) => format!("{} {}", signature, self.node(body, level)),
                    None => signature,
                }
            }
            NodeData::Body => self.block(children, level),
            NodeData::Return => match self.child(id, 0) {
                Some(value) => format!("return {}", self.node(value, level)),
                None => "return".to_string(),
            },
            NodeData::Assignment => self.assignment(id, level),
            NodeData::Reference { name, .. } => name.clone(),
            NodeData::SelfRef => "self".to_string(),
            NodeData::Super => format!("super({})", self.join(children, level)),
            NodeData::Send { message } => self.send(id, message, level),
            NodeData::New { instantiated } => format!(
                "new {}({})",
                env.name(*instantiated).unwrap_or_default(),
                self.join(&self.without(children, &[*instantiated]), level)
            ),
            NodeData::If => {
                let condition = self.child(id, 0).map(|c| self.node(c, level)).unwrap_or_default();
                let then = self.child(id, 1).map(|c| self.node(c, level)).unwrap_or_default();
                match self.child(id, 2) {
                    Some(otherwise) => format!(
                        "if ({}) {} else {}",
                        condition,
                        then,
                        self.node(otherwise, level)
                    ),
                    None => format!("if ({}) {}", condition, then),
                }
            }
            NodeData::Try => {
                let mut out = String::from("try");
                for &child in children {
                    match env.node(child).data {
                        NodeData::Catch => out.push_str(&format!(" {}", self.node(child, level))),
                        _ if out == "try" => out.push_str(&format!(" {}", self.node(child, level))),
                        _ => out.push_str(&format!(" then always {}", self.node(child, level))),
                    }
                }
                out
            }
            NodeData::Catch => {
                let parameter = self.child(id, 0).map(|c| self.node(c, level)).unwrap_or_default();
                let body = self.child(id, 1).map(|c| self.node(c, level)).unwrap_or_default();
                format!("catch {} {}", parameter, body)
            }
            NodeData::Throw => format!(
                "throw {}",
                self.child(id, 0).map(|c| self.node(c, level)).unwrap_or_default()
            ),
            NodeData::Literal { value } => self.literal(id, value, level),
            NodeData::NamedArgument { name } => format!(
                "{} = {}",
                name,
                self.child(id, 0).map(|c| self.node(c, level)).unwrap_or_default()
            ),
        }
    }

    fn without(&self, children: &[NodeId], excluded: &[NodeId]) -> Vec<NodeId> {
        children
            .iter()
            .copied()
            .filter(|child| !excluded.contains(child))
            .collect()
    }

    fn inherits(&self, supertypes: &[NodeId]) -> String {
        if supertypes.is_empty() {
            return String::new();
        }
        let names: Vec<&str> = supertypes
            .iter()
            .filter_map(|&reference| self.env.name(reference))
            .collect();
        format!(" inherits {}", names.join(" and "))
    }

    fn initial_value(&self, id: NodeId, level: usize) -> String {
        self.child(id, 0)
            .map(|value| format!(" = {}", self.node(value, level)))
            .unwrap_or_default()
    }

    /// Members of a module or package; always one per line.
    fn members(&self, ids: &[NodeId], level: usize) -> String {
        if ids.is_empty() {
            return "{}".to_string();
        }
        let inner = self.indent(level + 1);
        let lines: Vec<String> = ids
            .iter()
            .map(|&id| format!("{}{}", inner, self.node(id, level + 1)))
            .collect();
        format!("{{\n{}\n{}}}", lines.join("\n"), self.indent(level))
    }

    /// Renders the single body child of a program or test.
    fn bodies(&self, ids: &[NodeId], level: usize) -> String {
        match ids.first() {
            Some(&body) => self.node(body, level),
            None => "{}".to_string(),
        }
    }

    /// Statement block; kept on one line when it has a single short statement.
    fn block(&self, ids: &[NodeId], level: usize) -> String {
        if ids.is_empty() {
            return "{}".to_string();
        }
        if let [only] = ids {
            let inline = format!("{{ {} }}", self.node(*only, level));
            if !inline.contains('\n') && self.indent(level).len() + inline.len() <= self.options.max_width {
                return inline;
            }
        }
        let inner = self.indent(level + 1);
        let lines: Vec<String> = ids
            .iter()
            .map(|&id| format!("{}{}", inner, self.node(id, level + 1)))
            .collect();
        format!("{{\n{}\n{}}}", lines.join("\n"), self.indent(level))
    }

    fn closure(&self, singleton: NodeId, level: usize) -> String {
        let apply = self
            .env
            .methods(singleton)
            .into_iter()
            .find(|&method| self.env.name(method) == Some(CLOSURE_APPLY));
        let Some(apply) = apply else {
            return "{}".to_string();
        };
        let params = self.env.parameters(apply);
        let statements: Vec<NodeId> = self
            .without(self.env.children(apply), &params)
            .first()
            .map(|&body| self.env.children(body).to_vec())
            .unwrap_or_default();
        let statements: Vec<String> = statements.iter().map(|&s| self.node(s, level)).collect();
        if params.is_empty() {
            format!("{{ {} }}", statements.join("; "))
        } else {
            format!("{{ {} => {} }}", self.join(&params, level), statements.join("; "))
        }
    }

    fn assignment(&self, id: NodeId, level: usize) -> String {
        let (Some(variable), Some(value)) = (self.child(id, 0), self.child(id, 1)) else {
            return String::new();
        };
        let variable_name = self.node(variable, level);

        if self.options.abbreviate_assignments {
            if let NodeData::Send { message } = &self.env.node(value).data {
                let operands = self.env.children(value);
                if let [receiver, argument] = operands {
                    let same_variable = self.env.name(*receiver) == Some(variable_name.as_str());
                    if same_variable && ABBREVIABLE.contains(&message.as_str()) {
                        return format!("{} {}= {}", variable_name, message, self.node(*argument, level));
                    }
                }
            }
        }
        format!("{} = {}", variable_name, self.node(value, level))
    }

    fn send(&self, id: NodeId, message: &str, level: usize) -> String {
        let children = self.env.children(id);
        let Some((&receiver, args)) = children.split_first() else {
            return message.to_string();
        };
        let receiver = self.node(receiver, level);

        if message == "negate" && args.is_empty() {
            return format!("!{}", receiver);
        }
        if !message.chars().any(char::is_alphanumeric) {
            if let [argument] = args {
                return format!("{} {} {}", receiver, message, self.node(*argument, level));
            }
        }
        format!("{}.{}({})", receiver, message, self.join(args, level))
    }

    fn literal(&self, id: NodeId, value: &LiteralValue, level: usize) -> String {
        match value {
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Boolean(value) => value.to_string(),
            LiteralValue::Number(value) => format_number(*value),
            LiteralValue::String(value) => {
                format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
            }
            LiteralValue::Object { node } => self.node(*node, level),
            LiteralValue::Collection { collection } => {
                let elements = self.join(self.env.children(id), level);
                if collection.ends_with("Set") {
                    format!("#{{{}}}", elements)
                } else {
                    format!("[{}]", elements)
                }
            }
        }
    }
}
