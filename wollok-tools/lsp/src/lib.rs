//! Wollok Language Server Protocol Implementation
//!
//! This crate provides an LSP server for the Wollok programming language,
//! enabling IDE features like:
//!
//! - Syntax highlighting (semantic tokens)
//! - Validation diagnostics
//! - Completion of keywords, references and message sends
//! - Hover information
//! - Run lenses for programs and tests
//! - Document and workspace symbols
//!
//! # Architecture
//!
//! Parsing, linking and validation are done by the external Wollok toolchain
//! through [`wollok_model::Analyzer`]. The server keeps the open documents,
//! rebuilds the program graph as they change, and answers requests from the
//! latest graph.
//!
//! ```text
//! ┌─────────┐    ┌──────────────┐    ┌───────────┐
//! │  IDE    │◄──►│  wollok-lsp  │◄──►│ Analyzer  │
//! │ Client  │    │   Server     │    │(toolchain)│
//! └─────────┘    └──────────────┘    └───────────┘
//! ```

pub mod backend;
pub mod capabilities;
pub mod code_lens;
pub mod completion;
pub mod config;
pub mod cursor;
pub mod diagnostics;
pub mod document;
pub mod highlight;
pub mod hover;
pub mod semantic_tokens;
pub mod symbols;

use tower_lsp::{LspService, Server};
use tracing::info;

pub use backend::WollokLanguageServer;
pub use config::{Args, Settings};

/// Runs the Wollok language server over stdin/stdout.
///
/// This is the main entry point for the LSP binary.
pub async fn run_server(args: Args) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let analyzer = args.analyzer();
    info!("Starting Wollok language server (analyzer: {})", analyzer.command);

    let (service, socket) = LspService::new(|client| WollokLanguageServer::new(client, analyzer));
    Server::new(stdin, stdout, socket).serve(service).await;
    info!("Wollok language server stopped");

    Ok(())
}
