//! LSP Backend Implementation
//!
//! The main language server that handles LSP requests and notifications.
//!
//! Every edit rebuilds one environment from all open Wollok documents. Requests
//! read the latest snapshot that built successfully; a failed build keeps the
//! previous one so the editor never loses highlighting while typing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};
use wollok_model::{Analyzer, AnalyzerError, Environment, Problem, SourceFile};

use crate::capabilities;
use crate::code_lens::CodeLensProvider;
use crate::completion::CompletionProvider;
use crate::config::{AnalyzerSettings, Settings};
use crate::diagnostics::DiagnosticEngine;
use crate::document::{is_wollok_file, Document};
use crate::hover::HoverProvider;
use crate::semantic_tokens::SemanticTokensProvider;
use crate::symbols::SymbolProvider;

/// A built environment and the problems found in it.
#[derive(Debug)]
pub struct Analysis {
    pub environment: Environment,
    pub problems: Vec<Problem>,
}

/// The Wollok language server backend.
pub struct WollokLanguageServer {
    /// The LSP client for sending notifications and requests.
    client: Client,
    /// Open documents indexed by URI.
    documents: DashMap<Url, Document>,
    settings: RwLock<Settings>,
    /// Analyzer from the command line, used unless the client overrides it.
    default_analyzer: AnalyzerSettings,
    analyzer: RwLock<Arc<dyn Analyzer>>,
    analysis: RwLock<Option<Arc<Analysis>>>,
    /// Bumped on every rebuild; stale builds are discarded.
    generation: AtomicU64,
    hover_provider: HoverProvider,
    completion_provider: CompletionProvider,
    code_lens_provider: CodeLensProvider,
    symbol_provider: SymbolProvider,
}

impl WollokLanguageServer {
    /// Creates a new language server instance.
    pub fn new(client: Client, analyzer: AnalyzerSettings) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            settings: RwLock::new(Settings::default()),
            analyzer: RwLock::new(analyzer.build()),
            default_analyzer: analyzer,
            analysis: RwLock::new(None),
            generation: AtomicU64::new(0),
            hover_provider: HoverProvider::new(),
            completion_provider: CompletionProvider::new(),
            code_lens_provider: CodeLensProvider::new(),
            symbol_provider: SymbolProvider::new(),
        }
    }

    async fn snapshot(&self) -> Option<Arc<Analysis>> {
        self.analysis.read().await.clone()
    }

    /// Applies client settings, switching analyzers when needed.
    async fn apply_settings(&self, value: &serde_json::Value) -> bool {
        let mut settings = self.settings.write().await;
        let previous_analyzer = settings.analyzer.clone();
        if !settings.update(value) {
            return false;
        }

        if settings.analyzer != previous_analyzer {
            let analyzer = settings.analyzer.as_ref().unwrap_or(&self.default_analyzer);
            info!("Using analyzer {}", analyzer.command);
            *self.analyzer.write().await = analyzer.build();
        }
        true
    }

    /// Rebuilds the environment from every open Wollok document.
    async fn rebuild(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let files: Vec<SourceFile> = self
            .documents
            .iter()
            .filter(|entry| is_wollok_file(entry.key()))
            .map(|entry| SourceFile::new(entry.file_name(), entry.text()))
            .collect();
        let analyzer = self.analyzer.read().await.clone();

        let start = Instant::now();
        let built = tokio::task::spawn_blocking(move || {
            let environment = analyzer.build_environment(&files)?;
            let problems = analyzer.validate(&environment);
            Ok::<_, AnalyzerError>(Analysis {
                environment,
                problems,
            })
        })
        .await;

        match built {
            Ok(Ok(analysis)) => {
                debug!(
                    "Environment built in {} ms ({} nodes, {} problems)",
                    start.elapsed().as_millis(),
                    analysis.environment.node_count(),
                    analysis.problems.len()
                );
                if self.generation.load(Ordering::SeqCst) != generation {
                    debug!("Discarding stale environment");
                    return;
                }
                *self.analysis.write().await = Some(Arc::new(analysis));
            }
            Ok(Err(err)) => warn!("Could not build environment, keeping the previous one: {}", err),
            Err(err) => error!("Analyzer task failed: {}", err),
        }
    }

    /// Publishes diagnostics for every open document.
    async fn publish_diagnostics(&self) {
        let Some(analysis) = self.snapshot().await else {
            return;
        };
        let engine = DiagnosticEngine::new(self.settings.read().await.max_number_of_problems);

        let reports: Vec<(Url, Vec<Diagnostic>, i32)> = self
            .documents
            .iter()
            .map(|doc| {
                let diagnostics = engine.check(&analysis.environment, &analysis.problems, &doc);
                (doc.uri().clone(), diagnostics, doc.version())
            })
            .collect();

        for (uri, diagnostics, version) in reports {
            self.client.publish_diagnostics(uri, diagnostics, Some(version)).await;
        }
    }

    async fn refresh(&self) {
        self.rebuild().await;
        self.publish_diagnostics().await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for WollokLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("Initializing Wollok language server");

        if let Some(options) = params.initialization_options {
            self.apply_settings(&options).await;
        }

        Ok(InitializeResult {
            capabilities: capabilities::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "wollok-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        info!("Wollok language server initialized");

        self.client
            .log_message(MessageType::INFO, "Wollok language server ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Wollok language server");
        Ok(())
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        if self.apply_settings(&params.settings).await {
            self.refresh().await;
        }
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("Document opened: {}", uri);

        let doc = Document::new(uri.clone(), params.text_document.version, params.text_document.text);
        self.documents.insert(uri, doc);

        self.refresh().await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        debug!("Document changed: {}", uri);

        if let Some(mut doc) = self.documents.get_mut(&uri) {
            for change in params.content_changes {
                doc.apply_change(version, change);
            }
        }

        self.refresh().await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        debug!("Document saved: {}", params.text_document.uri);
        self.refresh().await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("Document closed: {}", uri);

        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, vec![], None).await;

        self.refresh().await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        debug!("Hover request at {} line {} char {}", uri, position.line, position.character);

        let Some(analysis) = self.snapshot().await else {
            return Ok(None);
        };
        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };

        Ok(self.hover_provider.hover(&analysis.environment, &doc, position))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        debug!("Completion request at {} line {} char {}", uri, position.line, position.character);

        let Some(analysis) = self.snapshot().await else {
            return Ok(None);
        };
        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };

        let items = self.completion_provider.complete(
            &analysis.environment,
            &doc,
            position,
            params.context.as_ref(),
        );
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let uri = &params.text_document.uri;
        debug!("Code lens request for {}", uri);

        let Some(analysis) = self.snapshot().await else {
            return Ok(None);
        };
        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };

        Ok(self.code_lens_provider.provide(&analysis.environment, &doc))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;
        debug!("Document symbols request for {}", uri);

        let Some(analysis) = self.snapshot().await else {
            return Ok(None);
        };
        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };

        let symbols = self.symbol_provider.document_symbols(&analysis.environment, &doc);
        Ok(Some(DocumentSymbolResponse::Nested(symbols)))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        debug!("Workspace symbols request for {:?}", params.query);

        let Some(analysis) = self.snapshot().await else {
            return Ok(None);
        };

        Ok(Some(
            self.symbol_provider.workspace_symbols(&analysis.environment, &params.query),
        ))
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let uri = &params.text_document.uri;
        debug!("Semantic tokens request for {}", uri);

        let analysis = self.snapshot().await;
        let provider = SemanticTokensProvider::new(self.settings.read().await.reference_resolution);
        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };

        let tokens = provider.provide(analysis.as_ref().map(|a| &a.environment), &doc);
        Ok(Some(SemanticTokensResult::Tokens(tokens)))
    }
}
