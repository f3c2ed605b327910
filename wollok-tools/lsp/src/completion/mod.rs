//! Completion Provider
//!
//! Two resolvers share the cursor lookup: node completion proposes what can
//! be written where the cursor is, and message-send completion proposes
//! methods after a `.`.

mod items;
mod node;
mod send;

use thiserror::Error;
use tower_lsp::lsp_types::*;
use tracing::{debug, warn};
use wollok_model::{Environment, NodeId, NodeKind};

use crate::cursor::{cursor_node, cursor_node_or_package};
use crate::document::Document;

pub use items::{method_item, needs_import, with_import, Snippet};
pub use node::completions_for_node;
pub use send::{complete_messages, method_pool};

/// Character that triggers message-send completion.
pub const SEND_TRIGGER: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("no completion rule for {kind} node {node} or any of its ancestors")]
    NoRule { node: NodeId, kind: NodeKind },
}

/// Provider for completion requests.
pub struct CompletionProvider;

impl CompletionProvider {
    pub fn new() -> Self {
        Self
    }

    /// Completion items for a position in a document.
    pub fn complete(
        &self,
        env: &Environment,
        doc: &Document,
        position: Position,
        context: Option<&CompletionContext>,
    ) -> Vec<CompletionItem> {
        let triggered_by_send = context
            .and_then(|context| context.trigger_character.as_deref())
            .map_or_else(|| doc.char_before(position) == Some('.'), |c| c == SEND_TRIGGER);

        if triggered_by_send {
            let Some(node) = cursor_node(env, doc.file_name(), position) else {
                debug!("No node under the cursor for message completion");
                return Vec::new();
            };
            return complete_messages(env, node);
        }

        let Some(node) = cursor_node_or_package(env, doc.file_name(), position) else {
            debug!("{} is not part of the program graph", doc.uri());
            return Vec::new();
        };
        completions_for_node(env, node).unwrap_or_else(|err| {
            warn!("Completion failed: {}", err);
            Vec::new()
        })
    }
}

impl Default for CompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wollok_model::{EnvironmentBuilder, LiteralValue, NodeData, SourceMap};

    fn package(builder: &mut EnvironmentBuilder, parent: NodeId, name: &str, file: Option<&str>) -> NodeId {
        builder.add(
            parent,
            NodeData::Package {
                name: name.into(),
                file_name: file.map(str::to_string),
            },
        )
    }

    fn method(builder: &mut EnvironmentBuilder, owner: NodeId, name: &str, params: &[&str]) -> NodeId {
        let id = builder.add(
            owner,
            NodeData::Method {
                name: name.into(),
                is_override: false,
                is_native: false,
            },
        );
        for param in params {
            builder.add(
                id,
                NodeData::Parameter {
                    name: (*param).into(),
                    is_var_arg: false,
                },
            );
        }
        id
    }

    struct Fixture {
        env: Environment,
        pepita: NodeId,
        fly: NodeId,
        pepita_reference: NodeId,
        number_literal: NodeId,
        bird: NodeId,
    }

    /// `wollok.lang` with Object and Number, a `birds.wlk` file with `pepita`
    /// and a `Bird` class, and a `main.wpgm` program using both.
    fn fixture() -> Fixture {
        let mut builder = EnvironmentBuilder::new();
        let root = builder.root();

        let wollok = package(&mut builder, root, "wollok", None);
        let lang = package(&mut builder, wollok, "lang", Some("wollok/lang.wlk"));
        let object = builder.add(
            lang,
            NodeData::Class {
                name: "Object".into(),
                supertypes: Vec::new(),
                is_abstract: false,
            },
        );
        method(&mut builder, object, "==", &["other"]);
        method(&mut builder, object, "toString", &[]);
        let number = builder.add(
            lang,
            NodeData::Class {
                name: "Number".into(),
                supertypes: Vec::new(),
                is_abstract: false,
            },
        );
        method(&mut builder, number, "max", &["other"]);

        let birds = package(&mut builder, root, "birds", Some("file:///birds.wlk"));
        let pepita = builder.add(
            birds,
            NodeData::Singleton {
                name: Some("pepita".into()),
                supertypes: Vec::new(),
            },
        );
        builder.add(
            pepita,
            NodeData::Field {
                name: "energy".into(),
                is_constant: false,
                is_property: false,
            },
        );
        let fly = method(&mut builder, pepita, "fly", &["minutes"]);
        let bird = builder.add(
            birds,
            NodeData::Class {
                name: "Bird".into(),
                supertypes: Vec::new(),
                is_abstract: false,
            },
        );
        builder.add(
            birds,
            NodeData::Class {
                name: "Animal".into(),
                supertypes: Vec::new(),
                is_abstract: true,
            },
        );

        let main = package(&mut builder, root, "main", Some("file:///main.wpgm"));
        let program = builder.add(main, NodeData::Program { name: "main".into() });
        let body = builder.add(program, NodeData::Body);
        let send = builder.add(body, NodeData::Send { message: "fly".into() });
        let pepita_reference = builder.add_located(
            send,
            NodeData::Reference {
                name: "pepita".into(),
                target: Some(pepita),
            },
            SourceMap::new((2, 3), (2, 9)),
        );
        let number_literal = builder.add(
            send,
            NodeData::Literal {
                value: LiteralValue::Number(10.0),
            },
        );

        Fixture {
            env: builder.build().expect("valid environment"),
            pepita,
            fly,
            pepita_reference,
            number_literal,
            bird,
        }
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn test_singleton_reference_pool_is_its_methods() {
        let f = fixture();

        let pool = method_pool(&f.env, f.pepita_reference);
        assert_eq!(pool, f.env.all_methods(f.pepita));
        assert_eq!(
            labels(&complete_messages(&f.env, f.pepita_reference)),
            vec!["fly(minutes)", "==(other)", "toString()"]
        );
    }

    #[test]
    fn test_literal_pool_uses_literal_class() {
        let f = fixture();

        assert_eq!(
            labels(&complete_messages(&f.env, f.number_literal)),
            vec!["max(other)", "==(other)", "toString()"]
        );
    }

    #[test]
    fn test_fallback_pool_filters_symbols() {
        let f = fixture();
        let send = f.env.parent(f.pepita_reference).expect("send");

        let names: Vec<&str> = method_pool(&f.env, send)
            .into_iter()
            .filter_map(|method| f.env.name(method))
            .collect();
        assert_eq!(names, vec!["toString", "max", "fly"]);
    }

    #[test]
    fn test_method_completion_offers_parameters_fields_and_singletons() {
        let f = fixture();

        let items = completions_for_node(&f.env, f.fly).expect("completions");
        assert_eq!(labels(&items), vec!["minutes", "energy", "pepita"]);
        assert!(items[2].additional_text_edits.is_none());
    }

    #[test]
    fn test_reference_completion_climbs_to_parent() {
        let f = fixture();

        let items = completions_for_node(&f.env, f.pepita_reference).expect("completions");
        let labels = labels(&items);
        // Non-abstract classes first, then the enclosing program's options.
        assert_eq!(&labels[..3], &["Object", "Number", "Bird"]);
        assert!(labels.contains(&"var"));
        assert!(!labels.contains(&"Animal"));

        let bird = items.iter().find(|item| item.label == "Bird").expect("Bird item");
        let edits = bird.additional_text_edits.as_ref().expect("import edit");
        assert_eq!(edits[0].new_text, "import birds.Bird\n");
        assert!(items.iter().find(|item| item.label == "Object").expect("Object").additional_text_edits.is_none());
        assert!(needs_import(&f.env, f.pepita_reference, f.bird));
    }

    #[test]
    fn test_environment_has_no_completions() {
        let f = fixture();
        assert_eq!(completions_for_node(&f.env, f.env.root()), Ok(Vec::new()));
    }

    #[test]
    fn test_package_completion_depends_on_file_kind() {
        let f = fixture();
        let main = f.env.package_for_file("file:///main.wpgm").expect("main package");
        let birds = f.env.package_for_file("file:///birds.wlk").expect("birds package");

        assert!(labels(&completions_for_node(&f.env, main).unwrap()).contains(&"program"));
        let birds_labels = completions_for_node(&f.env, birds).unwrap();
        assert_eq!(labels(&birds_labels), vec!["import", "const", "object", "class"]);
    }
}
