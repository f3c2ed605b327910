//! Document and Workspace Symbols

use tower_lsp::lsp_types::*;
use tracing::warn;
use wollok_model::{Environment, NodeId, NodeKind};

use crate::cursor::to_range;
use crate::document::Document;

fn is_symbolyzable(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Program
            | NodeKind::Test
            | NodeKind::Class
            | NodeKind::Singleton
            | NodeKind::Mixin
            | NodeKind::Variable
            | NodeKind::Field
            | NodeKind::Method
    )
}

/// Editor symbol kind for a node kind.
pub fn symbol_kind(kind: NodeKind) -> SymbolKind {
    match kind {
        NodeKind::Class | NodeKind::Singleton => SymbolKind::CLASS,
        NodeKind::Mixin => SymbolKind::ENUM,
        NodeKind::Method => SymbolKind::METHOD,
        NodeKind::Field => SymbolKind::FIELD,
        NodeKind::Variable | NodeKind::Parameter => SymbolKind::VARIABLE,
        NodeKind::Package => SymbolKind::PACKAGE,
        NodeKind::Test => SymbolKind::EVENT,
        NodeKind::Describe => SymbolKind::ARRAY,
        _ => SymbolKind::VARIABLE,
    }
}

/// Provider for document and workspace symbols.
pub struct SymbolProvider;

impl SymbolProvider {
    pub fn new() -> Self {
        Self
    }

    /// Top-level members of the document's package, with their members
    /// nested.
    pub fn document_symbols(&self, env: &Environment, doc: &Document) -> Vec<DocumentSymbol> {
        let Some(file) = env.package_for_file(doc.file_name()) else {
            warn!("Could not produce symbols: {} not found", doc.uri());
            return Vec::new();
        };

        env.children(file)
            .iter()
            .filter(|&&member| is_symbolyzable(env.kind(member)))
            .filter_map(|&member| document_symbol(env, member))
            .collect()
    }

    /// Project symbols whose name contains `query`, ignoring case.
    pub fn workspace_symbols(&self, env: &Environment, query: &str) -> Vec<SymbolInformation> {
        let query = query.to_lowercase();

        env.project_packages()
            .into_iter()
            .flat_map(|package| env.descendants(package).collect::<Vec<_>>())
            .filter(|&node| is_symbolyzable(env.kind(node)))
            .filter_map(|node| {
                let name = env.name(node)?;
                if !name.to_lowercase().contains(&query) {
                    return None;
                }
                let file = env.source_file(node)?;
                let source_map = env.node(node).source_map?;
                let uri = Url::parse(file).ok()?;

                #[allow(deprecated)]
                Some(SymbolInformation {
                    name: name.to_string(),
                    kind: symbol_kind(env.kind(node)),
                    tags: None,
                    deprecated: None,
                    location: Location::new(uri, to_range(&source_map)),
                    container_name: None,
                })
            })
            .collect()
    }
}

impl Default for SymbolProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn document_symbol(env: &Environment, node: NodeId) -> Option<DocumentSymbol> {
    let range = to_range(env.node(node).source_map.as_ref()?);
    let kind = env.kind(node);

    let children = kind.is_module().then(|| {
        env.children(node)
            .iter()
            .filter(|&&member| matches!(env.kind(member), NodeKind::Field | NodeKind::Method))
            .filter_map(|&member| document_symbol(env, member))
            .collect()
    });

    #[allow(deprecated)]
    Some(DocumentSymbol {
        name: env.name(node).unwrap_or_default().to_string(),
        detail: None,
        kind: symbol_kind(kind),
        tags: None,
        deprecated: None,
        range,
        selection_range: range,
        children,
    })
}
