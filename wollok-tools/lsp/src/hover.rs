//! Hover Provider
//!
//! Shows the kind and inferred type of the node under the cursor, followed
//! by its source as the pretty-printer renders it.

use tower_lsp::lsp_types::*;
use wollok_model::{print, Environment, NodeKind, PrintOptions};

use crate::cursor::{cursor_node, to_range};
use crate::document::Document;

/// Type shown when the toolchain inferred none.
const UNKNOWN_TYPE: &str = "Any";

/// Provider for hover information.
pub struct HoverProvider {
    options: PrintOptions,
}

impl HoverProvider {
    pub fn new() -> Self {
        Self {
            options: PrintOptions {
                max_width: 30,
                use_spaces: true,
                abbreviate_assignments: true,
            },
        }
    }

    pub fn hover(&self, env: &Environment, doc: &Document, position: Position) -> Option<Hover> {
        let mut node = cursor_node(env, doc.file_name(), position)?;
        if env.kind(node) == NodeKind::Body {
            node = env.parent(node)?;
        }

        let data = env.node(node);
        let summary = format!(
            "{}: {}",
            data.kind(),
            data.type_name.as_deref().unwrap_or(UNKNOWN_TYPE)
        );

        Some(Hover {
            contents: HoverContents::Array(vec![
                MarkedString::LanguageString(LanguageString {
                    language: "text".to_string(),
                    value: summary,
                }),
                MarkedString::LanguageString(LanguageString {
                    language: "wollok".to_string(),
                    value: print(env, node, &self.options),
                }),
            ]),
            range: data.source_map.as_ref().map(to_range),
        })
    }
}

impl Default for HoverProvider {
    fn default() -> Self {
        Self::new()
    }
}
