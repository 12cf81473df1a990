//! Diagnostics conversion from parser and schema errors to LSP diagnostics.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};
use tracing::debug;

use crate::error::{ParseError, ValidationError};
use crate::parser::LuParser;

/// Convert parser errors to LSP diagnostics.
///
/// The parser counts lines from 1.
pub fn syntax_diagnostics(error: &ParseError) -> Vec<Diagnostic> {
    error
        .diagnostics
        .iter()
        .map(|diag| {
            let range = Range::new(
                Position::new(
                    diag.range.start_line.saturating_sub(1),
                    diag.range.start_character,
                ),
                Position::new(
                    diag.range.end_line.saturating_sub(1),
                    diag.range.end_character,
                ),
            );
            lu_diagnostic(range, diag.message.clone())
        })
        .collect()
}

/// Convert schema validation problems to LSP diagnostics.
///
/// The validator reports no location, so every problem is pinned to the
/// start of the document.
pub fn schema_diagnostics(error: &ValidationError) -> Vec<Diagnostic> {
    error
        .problems
        .iter()
        .map(|problem| {
            let range = Range::new(Position::new(0, 0), Position::new(0, 1));
            lu_diagnostic(range, problem.message.clone())
        })
        .collect()
}

fn lu_diagnostic(range: Range, message: String) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(DiagnosticSeverity::ERROR),
        code: None,
        code_description: None,
        source: Some("lu".to_string()),
        message,
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Parse and validate `text`, returning every problem as a diagnostic.
///
/// Schema validation only runs once the text parses.
pub fn validate_text(parser: &dyn LuParser, text: &str, locale: &str) -> Vec<Diagnostic> {
    if text.is_empty() {
        return Vec::new();
    }

    match parser.parse(text, locale) {
        Err(error) => {
            debug!("syntax errors: {}", error);
            syntax_diagnostics(&error)
        }
        Ok(model) => match parser.validate_schema(&model) {
            Ok(()) => Vec::new(),
            Err(error) => {
                debug!("schema errors: {}", error);
                schema_diagnostics(&error)
            }
        },
    }
}
