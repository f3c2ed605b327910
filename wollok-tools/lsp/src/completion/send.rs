//! Message-send completion.
//!
//! Offered after a `.`; the candidate methods depend on what the receiver
//! is statically known to be.

use tower_lsp::lsp_types::CompletionItem;
use wollok_model::{Environment, NodeData, NodeId, NodeKind, CLOSURE_APPLY};

use super::items::method_item;

/// Library files whose methods are never offered.
const HIDDEN_FILES: &[&str] = &["wollok/vm.wlk", "wollok/mirror.wlk"];

/// Method candidates for a message sent to `node`.
pub fn complete_messages(env: &Environment, node: NodeId) -> Vec<CompletionItem> {
    method_pool(env, node)
        .into_iter()
        .map(|method| method_item(env, method))
        .collect()
}

/// Methods a message sent to `node` could resolve to.
pub fn method_pool(env: &Environment, node: NodeId) -> Vec<NodeId> {
    match &env.node(node).data {
        NodeData::Reference { .. } => {
            if let Some(target) = env
                .target(node)
                .filter(|&target| env.kind(target) == NodeKind::Singleton)
            {
                return env.all_methods(target);
            }
        }
        NodeData::Literal { .. } => return literal_methods(env, node),
        // Unparseable sends leave a body with a malformed child.
        NodeData::Body => {
            if let Some(child) = env.first_node_with_problems(node) {
                match &env.node(child).data {
                    NodeData::Literal { .. } => return literal_methods(env, child),
                    NodeData::New { instantiated } => {
                        if let Some(class) = env.target(*instantiated) {
                            return env.all_methods(class);
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    all_possible_methods(env, node)
}

fn literal_methods(env: &Environment, literal: NodeId) -> Vec<NodeId> {
    match &env.node(literal).data {
        NodeData::Literal { value } => env
            .literal_class(value)
            .map(|class| env.all_methods(class))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn all_possible_methods(env: &Environment, node: NodeId) -> Vec<NodeId> {
    let inside_describe = env
        .ancestors(node)
        .any(|ancestor| env.kind(ancestor) == NodeKind::Describe);

    env.all_available_methods()
        .into_iter()
        .filter(|&method| {
            let visible_file = env
                .source_file(method)
                .is_some_and(|file| !HIDDEN_FILES.contains(&file));
            let name = env.name(method).unwrap_or_default();
            let declared_in_describe = env
                .parent(method)
                .is_some_and(|owner| env.kind(owner) == NodeKind::Describe);

            visible_file
                && !is_symbol(name)
                && name != CLOSURE_APPLY
                && (!declared_in_describe || inside_describe)
        })
        .collect()
}

/// Operator names such as `+` or `==`.
fn is_symbol(message: &str) -> bool {
    !message.is_empty() && !message.chars().any(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_symbol() {
        assert!(is_symbol("+"));
        assert!(is_symbol("=="));
        assert!(!is_symbol("fly"));
        assert!(!is_symbol("ñandú"));
        assert!(!is_symbol("<apply>"));
    }
}
