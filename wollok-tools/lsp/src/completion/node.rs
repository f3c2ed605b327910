//! Completion by cursor node kind.

use tower_lsp::lsp_types::CompletionItem;
use wollok_model::{Environment, NodeData, NodeId, NodeKind};

use super::items::{
    class_item, entity_item, field_item, initializer_item, parameter_item, singleton_item,
    snippets, with_import, ASSERTS, CONST_REFERENCES, DESCRIBES, IMPORTS, INITIALIZE, METHODS,
    MODULES, PROGRAMS, PROPERTIES_AND_REFERENCES, REFERENCES, TESTS,
};
use super::CompletionError;

/// What to do after a node's rule ran.
enum Step {
    Done,
    /// Continue with the parent's rule, keeping what was collected.
    Climb,
}

/// Candidates for a cursor resting on `id`.
///
/// Kinds without a rule of their own defer to their parent; the climb ends at
/// the environment root at the latest.
pub fn completions_for_node(env: &Environment, id: NodeId) -> Result<Vec<CompletionItem>, CompletionError> {
    let mut items = Vec::new();
    let mut current = id;

    loop {
        match rule(env, current, &mut items) {
            Step::Done => return Ok(items),
            Step::Climb => {
                current = env.parent(current).ok_or(CompletionError::NoRule {
                    node: current,
                    kind: env.kind(current),
                })?;
            }
        }
    }
}

fn rule(env: &Environment, id: NodeId, items: &mut Vec<CompletionItem>) -> Step {
    match &env.node(id).data {
        NodeData::Environment => Step::Done,

        NodeData::Package { .. } => {
            items.extend(snippets(IMPORTS));
            items.extend(snippets(CONST_REFERENCES));
            let members = if is_test_file(env, id) {
                DESCRIBES
            } else if is_program_file(env, id) {
                PROGRAMS
            } else {
                MODULES
            };
            items.extend(snippets(members));
            Step::Done
        }

        NodeData::Class { .. } | NodeData::Singleton { .. } | NodeData::Mixin { .. } => {
            items.extend(snippets(PROPERTIES_AND_REFERENCES));
            items.extend(snippets(METHODS));
            Step::Done
        }

        NodeData::Program { .. } => {
            items.extend(snippets(REFERENCES));
            Step::Done
        }

        NodeData::Test { .. } => {
            items.extend(snippets(REFERENCES));
            items.extend(snippets(ASSERTS));
            Step::Done
        }

        NodeData::Describe { .. } => {
            if is_test_file(env, id) {
                items.extend(snippets(CONST_REFERENCES));
                items.extend(snippets(TESTS));
                items.extend(snippets(INITIALIZE));
            }
            Step::Done
        }

        NodeData::Method { .. } => {
            items.extend(env.parameters(id).into_iter().map(|p| parameter_item(env, p)));
            if let Some(owner) = env.parent(id) {
                items.extend(env.fields(owner).into_iter().map(|f| field_item(env, f)));
            }
            items.extend(
                env.descendants(env.root())
                    .filter(|&node| env.kind(node) == NodeKind::Singleton && env.name(node).is_some())
                    .map(|singleton| with_import(env, id, singleton, singleton_item(env, singleton))),
            );
            Step::Done
        }

        NodeData::Reference { .. } => {
            if env
                .parent(id)
                .is_some_and(|parent| env.kind(parent) == NodeKind::Import)
            {
                items.extend(importable_entities(env).map(|entity| entity_item(env, entity)));
                return Step::Done;
            }
            items.extend(
                env.descendants(env.root())
                    .filter(|&node| {
                        matches!(env.node(node).data, NodeData::Class { is_abstract: false, .. })
                    })
                    .map(|class| with_import(env, id, class, class_item(env, class))),
            );
            Step::Climb
        }

        NodeData::New { instantiated } => {
            if let Some(class) = env
                .target(*instantiated)
                .filter(|&target| env.kind(target) == NodeKind::Class)
            {
                items.push(with_import(env, id, class, initializer_item(env, class)));
            }
            Step::Done
        }

        _ => Step::Climb,
    }
}

fn is_test_file(env: &Environment, id: NodeId) -> bool {
    env.source_file(id).is_some_and(|file| file.ends_with("wtest"))
}

fn is_program_file(env: &Environment, id: NodeId) -> bool {
    env.source_file(id).is_some_and(|file| file.ends_with("wpgm"))
}

/// Named modules outside the implicitly imported language packages.
fn importable_entities(env: &Environment) -> impl Iterator<Item = NodeId> + '_ {
    env.descendants(env.root()).filter(move |&node| {
        env.kind(node).is_module()
            && env.name(node).is_some()
            && env
                .fully_qualified_name(node)
                .is_some_and(|fqn| !fqn.starts_with("wollok.lang.") && !fqn.starts_with("wollok.lib."))
    })
}
