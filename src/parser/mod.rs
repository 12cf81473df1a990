//! The LU grammar parser and schema validator collaborator.
//!
//! The language server only depends on the [`LuParser`] contract. The bundled
//! [`LuFileParser`] is a line-oriented implementation good enough for editing
//! feedback; hosts with a full parser can plug their own in.

mod entity;
mod lu_file;
mod model;
mod validate;

pub use entity::{
    is_prebuilt, EntityKind, ALL_ENTITY_KINDS, ENTITY_TYPES, FEATURE_KINDS, NON_COMPOSITE_KINDS,
    PREBUILT_ENTITIES,
};
pub use lu_file::LuFileParser;
pub use model::{Entity, Intent, ListValue, ParsedModel, PatternReference};

use tracing::debug;

use crate::document::LineIndex;
use crate::error::{ParseError, ValidationError};

/// Turns LU text into a [`ParsedModel`] and checks it.
pub trait LuParser: Send + Sync {
    /// Parse `text`. Errors carry 1-based line numbers.
    fn parse(&self, text: &str, locale: &str) -> Result<ParsedModel, ParseError>;

    /// Check a parsed model. Errors carry no location.
    fn validate_schema(&self, model: &ParsedModel) -> Result<(), ValidationError>;
}

/// Parse `text`, returning None instead of an error.
pub fn extract(parser: &dyn LuParser, text: &str, locale: &str) -> Option<ParsedModel> {
    match parser.parse(text, locale) {
        Ok(model) => Some(model),
        Err(e) => {
            debug!("model extraction failed: {}", e);
            None
        }
    }
}

/// Parse the full text, and if that fails, the text without `line`.
///
/// The caret's line is usually the one being typed and the most likely to be
/// incomplete.
pub fn extract_with_fallback(
    parser: &dyn LuParser,
    index: &LineIndex,
    line: usize,
    locale: &str,
) -> Option<ParsedModel> {
    extract(parser, index.source(), locale)
        .or_else(|| extract(parser, &index.text_without_line(line), locale))
}
