//! Loading schema documents referenced by URI.

use reqwest::redirect::Policy;
use reqwest::Client;
use tower_lsp::lsp_types::Url;
use tracing::debug;

use crate::error::SchemaError;

/// Redirects followed before a fetch is abandoned.
pub const MAX_REDIRECTS: usize = 5;

/// Fetch the text of the schema at `url`.
///
/// `file:` URIs are read from disk and `http`/`https` URIs are fetched.
/// Failures are returned to the caller and never retried.
pub async fn resolve_schema(url: &str) -> Result<String, SchemaError> {
    let uri = Url::parse(url).map_err(|_| SchemaError::InvalidUri(url.to_string()))?;

    match uri.scheme() {
        "file" => {
            let path = uri
                .to_file_path()
                .map_err(|_| SchemaError::InvalidUri(url.to_string()))?;
            debug!("reading schema from {}", path.display());
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| SchemaError::Io { path, source })
        }
        "http" | "https" => {
            debug!("fetching schema from {}", url);
            let http_error = |source: reqwest::Error| SchemaError::Http {
                url: url.to_string(),
                source,
            };
            let client = Client::builder()
                .redirect(Policy::limited(MAX_REDIRECTS))
                .build()
                .map_err(http_error)?;
            let response = client
                .get(uri.as_str())
                .send()
                .await
                .map_err(http_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(SchemaError::Status {
                    url: url.to_string(),
                    status,
                });
            }

            response.text().await.map_err(http_error)
        }
        other => Err(SchemaError::UnsupportedScheme(other.to_string())),
    }
}
