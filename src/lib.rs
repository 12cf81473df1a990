//! LU Language Server implementation.

use std::sync::{Arc, OnceLock};

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};
use tracing::{debug, info};

mod document;
pub mod error;
mod lsp;
pub mod parser;
pub mod schema;
pub mod settings;

pub use document::{classify, DocumentState, DocumentStore, LineIndex, LineState, LineStates};
pub use lsp::{
    completion_at_position, format_on_type, schema_diagnostics, strip_label, syntax_diagnostics,
    validate_text, AddUnlabelUtterance, AddUnlabelUtteranceParams, DiagnosticsPublisher,
    EditorPosition, LabelingExperienceParams, ValidationOptions, ValidationScheduler,
    LABELING_EXPERIENCE_REQUEST,
};
pub use parser::{LuFileParser, LuParser, ParsedModel};
pub use schema::resolve_schema;
pub use settings::{discover_settings, load_settings, Settings};

pub struct Backend {
    client: Client,
    documents: DocumentStore,
    validation: ValidationScheduler<Client>,
    parser: Arc<dyn LuParser>,
    settings: OnceLock<Settings>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self::with_parser(client, Arc::new(LuFileParser))
    }

    pub(crate) fn with_parser(client: Client, parser: Arc<dyn LuParser>) -> Self {
        let validation = ValidationScheduler::new(Arc::new(client.clone()), Arc::clone(&parser));
        Self {
            client,
            documents: DocumentStore::new(),
            validation,
            parser,
            settings: OnceLock::new(),
        }
    }

    fn settings(&self) -> Settings {
        self.settings.get().cloned().unwrap_or_default()
    }

    fn schedule_validation(&self, uri: Url, text: String, version: i32) {
        let options = self.settings().validation_options();
        self.validation.schedule(uri, text, version, &options);
    }

    /// Handle `labelingExperienceRequest`.
    ///
    /// The edits go out as an `addUnlabelUtterance` notification; the request
    /// itself is answered with null.
    async fn labeling_experience(&self, params: LabelingExperienceParams) -> Result<()> {
        let Some(doc) = self.documents.get(&params.uri) else {
            debug!("labeling request for unknown document {}", params.uri);
            return Ok(());
        };

        if let Some(edits) = lsp::strip_label(&doc.line_index, params.position) {
            self.client
                .send_notification::<AddUnlabelUtterance>(AddUnlabelUtteranceParams { edits })
                .await;
        }
        Ok(())
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract workspace root from params
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        if let Some(root) = workspace_root {
            // Discover settings by walking up the directory tree
            let (settings, settings_dir) = settings::discover_settings(&root);
            info!(
                "workspace {} using settings from {}",
                root.display(),
                settings_dir.display()
            );
            let _ = self.settings.set(settings);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(
                        ["@", " ", "{", ":", "["].map(String::from).to_vec(),
                    ),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                document_on_type_formatting_provider: Some(DocumentOnTypeFormattingOptions {
                    first_trigger_character: lsp::NEWLINE_TRIGGER.to_string(),
                    more_trigger_character: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "LU language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.documents.open(doc.uri.clone(), doc.text.clone(), doc.version);
        self.schedule_validation(doc.uri, doc.text, doc.version);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // We use FULL sync, so the last change holds the full text
        if let Some(change) = params.content_changes.into_iter().last() {
            let uri = params.text_document.uri;
            let version = params.text_document.version;
            self.documents.update(uri.clone(), change.text.clone(), version);
            self.schedule_validation(uri, change.text, version);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri);
        self.validation.close(params.text_document.uri).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(doc) = self.documents.get(uri) else {
            debug!("completion for unknown document {}", uri);
            return Ok(None);
        };

        let locale = self.settings().locale;
        let list = lsp::completion_at_position(self.parser.as_ref(), &doc, position, &locale);
        Ok(Some(CompletionResponse::List(list)))
    }

    async fn on_type_formatting(
        &self,
        params: DocumentOnTypeFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };

        Ok(Some(lsp::format_on_type(&doc, position, &params.ch)))
    }
}

fn build_service(
    make: impl FnOnce(Client) -> Backend,
) -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::build(make)
        .custom_method(LABELING_EXPERIENCE_REQUEST, Backend::labeling_experience)
        .finish()
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    build_service(Backend::new)
}

/// Create a service backed by a different LU parser.
pub fn create_service_with_parser(
    parser: Arc<dyn LuParser>,
) -> (LspService<Backend>, tower_lsp::ClientSocket) {
    build_service(move |client| Backend::with_parser(client, parser))
}
