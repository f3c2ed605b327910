//! Completion item builders and snippet catalog.

use tower_lsp::lsp_types::*;
use wollok_model::{Environment, NodeId};

/// Packages whose entities are visible without an import.
const IMPLICIT_IMPORTS: &[&str] = &["wollok.lang.", "wollok.lib."];

/// Sort groups; lower sorts first.
#[derive(Debug, Clone, Copy)]
enum Priority {
    Local = 10,
    Member = 20,
    Entity = 50,
    Snippet = 80,
}

fn sort_text(priority: Priority, label: &str) -> String {
    format!("{:03}{}", priority as u32, label)
}

/// A snippet inserted as-is.
#[derive(Debug, Clone, Copy)]
pub struct Snippet {
    pub label: &'static str,
    pub body: &'static str,
    pub detail: &'static str,
}

impl Snippet {
    pub fn item(&self) -> CompletionItem {
        CompletionItem {
            label: self.label.to_string(),
            kind: Some(CompletionItemKind::SNIPPET),
            detail: Some(self.detail.to_string()),
            insert_text: Some(self.body.to_string()),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            sort_text: Some(sort_text(Priority::Snippet, self.label)),
            ..Default::default()
        }
    }
}

pub fn snippets(options: &[Snippet]) -> impl Iterator<Item = CompletionItem> + '_ {
    options.iter().map(Snippet::item)
}

pub const IMPORTS: &[Snippet] = &[Snippet {
    label: "import",
    body: "import ${1:dependency}\n${0}",
    detail: "Import a file or entity",
}];

pub const CONST_REFERENCES: &[Snippet] = &[Snippet {
    label: "const",
    body: "const ${1:name} = ${0}",
    detail: "Constant reference",
}];

pub const MODULES: &[Snippet] = &[
    Snippet {
        label: "object",
        body: "object ${1:name} {\n\t${0}\n}",
        detail: "Well-known object",
    },
    Snippet {
        label: "class",
        body: "class ${1:Name} {\n\t${0}\n}",
        detail: "Class definition",
    },
];

pub const DESCRIBES: &[Snippet] = &[Snippet {
    label: "describe",
    body: "describe \"${1:name}\" {\n\ttest \"${2:description}\" {\n\t\t${0}\n\t}\n}",
    detail: "Group of tests",
}];

pub const PROGRAMS: &[Snippet] = &[Snippet {
    label: "program",
    body: "program ${1:name} {\n\t${0}\n}",
    detail: "Program definition",
}];

pub const REFERENCES: &[Snippet] = &[
    Snippet {
        label: "var",
        body: "var ${1:name} = ${0}",
        detail: "Variable reference",
    },
    Snippet {
        label: "const",
        body: "const ${1:name} = ${0}",
        detail: "Constant reference",
    },
];

pub const PROPERTIES_AND_REFERENCES: &[Snippet] = &[
    Snippet {
        label: "var property",
        body: "var property ${1:name} = ${0}",
        detail: "Variable with getter and setter",
    },
    Snippet {
        label: "const property",
        body: "const property ${1:name} = ${0}",
        detail: "Constant with getter",
    },
    Snippet {
        label: "var",
        body: "var ${1:name} = ${0}",
        detail: "Variable reference",
    },
    Snippet {
        label: "const",
        body: "const ${1:name} = ${0}",
        detail: "Constant reference",
    },
];

pub const METHODS: &[Snippet] = &[
    Snippet {
        label: "method (effect)",
        body: "method ${1:name}(${2}) {\n\t${0}\n}",
        detail: "Method with side effects",
    },
    Snippet {
        label: "method (return)",
        body: "method ${1:name}(${2}) = ${0}",
        detail: "Method returning a value",
    },
];

pub const ASSERTS: &[Snippet] = &[
    Snippet {
        label: "assert equality",
        body: "assert.equals(${1:value}, ${2:expression})${0}",
        detail: "Expect two values to be equal",
    },
    Snippet {
        label: "assert boolean",
        body: "assert.that(${1:booleanExpression})${0}",
        detail: "Expect a condition to hold",
    },
    Snippet {
        label: "assert throws",
        body: "assert.throwsException({ ${1:code} })${0}",
        detail: "Expect a block to fail",
    },
];

pub const TESTS: &[Snippet] = &[Snippet {
    label: "test",
    body: "test \"${1:description}\" {\n\t${0}\n}",
    detail: "Test case",
}];

pub const INITIALIZE: &[Snippet] = &[Snippet {
    label: "initialize",
    body: "method initialize() {\n\t${0}\n}",
    detail: "Initialization hook",
}];

fn named(env: &Environment, id: NodeId, kind: CompletionItemKind, priority: Priority) -> CompletionItem {
    let label = env.name(id).unwrap_or_default().to_string();
    CompletionItem {
        sort_text: Some(sort_text(priority, &label)),
        label,
        kind: Some(kind),
        ..Default::default()
    }
}

pub fn parameter_item(env: &Environment, parameter: NodeId) -> CompletionItem {
    named(env, parameter, CompletionItemKind::VARIABLE, Priority::Local)
}

pub fn field_item(env: &Environment, field: NodeId) -> CompletionItem {
    named(env, field, CompletionItemKind::FIELD, Priority::Member)
}

pub fn singleton_item(env: &Environment, singleton: NodeId) -> CompletionItem {
    CompletionItem {
        detail: env.fully_qualified_name(singleton),
        ..named(env, singleton, CompletionItemKind::MODULE, Priority::Entity)
    }
}

pub fn class_item(env: &Environment, class: NodeId) -> CompletionItem {
    CompletionItem {
        detail: env.fully_qualified_name(class),
        ..named(env, class, CompletionItemKind::CLASS, Priority::Entity)
    }
}

/// Named arguments for every field the class and its ancestors declare.
pub fn initializer_item(env: &Environment, class: NodeId) -> CompletionItem {
    let fields: Vec<&str> = env
        .linearization(class)
        .into_iter()
        .flat_map(|module| env.fields(module))
        .filter_map(|field| env.name(field))
        .collect();
    let body = fields
        .iter()
        .enumerate()
        .map(|(index, field)| format!("{} = ${{{}}}", field, index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let class_name = env.name(class).unwrap_or_default();

    CompletionItem {
        label: format!("initialize {}", class_name),
        kind: Some(CompletionItemKind::CONSTRUCTOR),
        detail: Some(format!("{}({})", class_name, fields.join(", "))),
        insert_text: Some(body),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        sort_text: Some(sort_text(Priority::Local, class_name)),
        ..Default::default()
    }
}

pub fn entity_item(env: &Environment, entity: NodeId) -> CompletionItem {
    let fqn = env.fully_qualified_name(entity).unwrap_or_default();
    CompletionItem {
        sort_text: Some(sort_text(Priority::Entity, &fqn)),
        label: fqn,
        kind: Some(CompletionItemKind::REFERENCE),
        ..Default::default()
    }
}

/// `name(p1, p2)`, inserting a snippet with one placeholder per parameter.
pub fn method_item(env: &Environment, method: NodeId) -> CompletionItem {
    let name = env.name(method).unwrap_or_default();
    let params: Vec<&str> = env
        .parameters(method)
        .into_iter()
        .filter_map(|param| env.name(param))
        .collect();
    let placeholders = params
        .iter()
        .enumerate()
        .map(|(index, param)| format!("${{{}:{}}}", index + 1, param))
        .collect::<Vec<_>>()
        .join(", ");
    let owner = env
        .parent(method)
        .and_then(|owner| env.fully_qualified_name(owner));

    CompletionItem {
        label: format!("{}({})", name, params.join(", ")),
        filter_text: Some(name.to_string()),
        kind: Some(CompletionItemKind::METHOD),
        detail: owner,
        insert_text: Some(format!("{}({})", name, placeholders)),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        sort_text: Some(sort_text(Priority::Member, name)),
        ..Default::default()
    }
}

/// Whether an entity must be imported to be used from `from`.
pub fn needs_import(env: &Environment, from: NodeId, entity: NodeId) -> bool {
    let Some(fqn) = env.fully_qualified_name(entity) else {
        return false;
    };
    if IMPLICIT_IMPORTS.iter().any(|prefix| fqn.starts_with(prefix)) {
        return false;
    }
    env.package_of(from) != env.package_of(entity)
}

/// Adds an `import` edit at the top of the file when the entity lives in
/// another package.
pub fn with_import(
    env: &Environment,
    from: NodeId,
    entity: NodeId,
    mut item: CompletionItem,
) -> CompletionItem {
    if needs_import(env, from, entity) {
        if let Some(fqn) = env.fully_qualified_name(entity) {
            item.additional_text_edits = Some(vec![TextEdit {
                range: Range::new(Position::new(0, 0), Position::new(0, 0)),
                new_text: format!("import {}\n", fqn),
            }]);
        }
    }
    item
}
