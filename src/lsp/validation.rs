//! Debounced validation scheduling.
//!
//! Each content change replaces the pending validation for its URI. The
//! validation only runs once the document has been quiet for the configured
//! delay, so a burst of keystrokes produces a single parse and a single
//! `publishDiagnostics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tower_lsp::lsp_types::{Diagnostic, Url};
use tower_lsp::Client;
use tracing::debug;

use crate::parser::LuParser;

use super::diagnostics::validate_text;

/// Default quiet period before a document is validated.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Default locale handed to the parser.
pub const DEFAULT_LOCALE: &str = "en-us";

/// Destination for published diagnostics.
#[tower_lsp::async_trait]
pub trait DiagnosticsPublisher: Send + Sync + 'static {
    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>);
}

#[tower_lsp::async_trait]
impl DiagnosticsPublisher for Client {
    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>) {
        self.publish_diagnostics(uri, diagnostics, version).await;
    }
}

/// How validations are run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    pub delay: Duration,
    pub locale: String,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DEBOUNCE,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// The one scheduled validation for a URI.
#[derive(Debug)]
struct PendingValidation {
    generation: u64,
    task: JoinHandle<()>,
}

/// Owns the pending-validation map.
pub struct ValidationScheduler<P> {
    publisher: Arc<P>,
    parser: Arc<dyn LuParser>,
    pending: Arc<DashMap<Url, PendingValidation>>,
    next_generation: AtomicU64,
}

impl<P: DiagnosticsPublisher> ValidationScheduler<P> {
    pub fn new(publisher: Arc<P>, parser: Arc<dyn LuParser>) -> Self {
        Self {
            publisher,
            parser,
            pending: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Schedule validation of `text`, cancelling any validation still
    /// waiting for this URI.
    pub fn schedule(&self, uri: Url, text: String, version: i32, options: &ValidationOptions) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        let publisher = Arc::clone(&self.publisher);
        let parser = Arc::clone(&self.parser);
        let delay = options.delay;
        let locale = options.locale.clone();

        // The entry stays locked until the new task is recorded, so the task
        // cannot look for itself before it is there.
        let entry = self.pending.entry(uri.clone());
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A newer change has taken over this URI.
            if pending
                .remove_if(&uri, |_, p| p.generation == generation)
                .is_none()
            {
                return;
            }

            debug!(%uri, version, "validating");
            let diagnostics = validate_text(parser.as_ref(), &text, &locale);
            publisher.publish(uri, diagnostics, Some(version)).await;
        });

        let validation = PendingValidation { generation, task };
        match entry {
            Entry::Occupied(mut occupied) => {
                let superseded = occupied.insert(validation);
                superseded.task.abort();
            }
            Entry::Vacant(vacant) => {
                vacant.insert(validation);
            }
        }
    }

    /// Cancel the pending validation for `uri`. Returns whether one existed.
    pub fn cancel(&self, uri: &Url) -> bool {
        match self.pending.remove(uri) {
            Some((_, validation)) => {
                validation.task.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel pending work for a closed document and clear its diagnostics.
    pub async fn close(&self, uri: Url) {
        self.cancel(&uri);
        self.publisher.publish(uri, Vec::new(), None).await;
    }

    pub fn is_pending(&self, uri: &Url) -> bool {
        self.pending.contains_key(uri)
    }
}
