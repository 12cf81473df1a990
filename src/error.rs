//! Error types shared by the parser collaborator and schema resolution.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A span reported by the LU parser.
///
/// Lines are 1-based, characters are 0-based UTF-16 columns. Callers shift
/// the lines down by one before handing them to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub start_line: u32,
    pub start_character: u32,
    pub end_line: u32,
    pub end_character: u32,
}

impl SourceRange {
    /// A range covering `width` columns of a single 1-based line.
    pub fn line(line: u32, width: u32) -> Self {
        Self {
            start_line: line,
            start_character: 0,
            end_line: line,
            end_character: width,
        }
    }
}

/// One syntax problem found by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    pub range: SourceRange,
    pub message: String,
}

/// The parser rejected the text.
#[derive(Debug, Clone, Error)]
#[error("{} syntax error(s) in LU content", .diagnostics.len())]
pub struct ParseError {
    pub diagnostics: Vec<SyntaxDiagnostic>,
}

/// One semantic problem found by schema validation. Carries no location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationProblem {
    pub message: String,
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The parsed model is syntactically fine but semantically invalid.
#[derive(Debug, Clone, Error)]
#[error("{} schema problem(s) in LU model", .problems.len())]
pub struct ValidationError {
    pub problems: Vec<ValidationProblem>,
}

impl ValidationError {
    pub fn from_messages(messages: Vec<String>) -> Self {
        Self {
            problems: messages
                .into_iter()
                .map(|message| ValidationProblem { message })
                .collect(),
        }
    }
}

/// Failures while resolving a referenced schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema uri '{0}'")]
    InvalidUri(String),

    #[error("unsupported schema uri scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch schema {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("schema request to {url} failed with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}
