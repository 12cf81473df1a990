//! Document state management for the LU language server.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::line_state::{LineState, LineStates};
use super::text::LineIndex;

/// Snapshot of a single open document.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Line index over the full text.
    pub line_index: LineIndex,
    /// Cached block mode for every line.
    pub line_states: LineStates,
    /// Document version from the client.
    pub version: i32,
}

impl DocumentState {
    /// Create a document state from scratch.
    pub fn new(source: String, version: i32) -> Self {
        let line_index = LineIndex::new(source);
        let line_states = LineStates::new(&line_index);
        Self {
            line_index,
            line_states,
            version,
        }
    }

    /// Derive the state for a new version of this document.
    pub fn with_text(&self, source: String, version: i32) -> Self {
        let line_index = LineIndex::new(source);
        let line_states = self.line_states.update(&self.line_index, &line_index);
        Self {
            line_index,
            line_states,
            version,
        }
    }

    /// The full text.
    pub fn text(&self) -> &str {
        self.line_index.source()
    }

    /// The block mode in effect at `line`.
    pub fn line_state(&self, line: usize) -> LineState {
        self.line_states.at(line)
    }
}

/// Thread-safe storage for open documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<DocumentState>>,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open a document, replacing any previous snapshot.
    pub fn open(&self, uri: Url, source: String, version: i32) -> Arc<DocumentState> {
        let state = Arc::new(DocumentState::new(source, version));
        self.documents.insert(uri, Arc::clone(&state));
        state
    }

    /// Replace a document's text, reusing cached line states where possible.
    ///
    /// Unknown documents are opened.
    pub fn update(&self, uri: Url, source: String, version: i32) -> Arc<DocumentState> {
        let mut entry = self
            .documents
            .entry(uri)
            .or_insert_with(|| Arc::new(DocumentState::new(String::new(), version)));
        let state = Arc::new(entry.with_text(source, version));
        *entry = Arc::clone(&state);
        state
    }

    /// Close a document.
    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Get a document's state.
    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentState>> {
        self.documents.get(uri).map(|r| Arc::clone(&r))
    }
}
