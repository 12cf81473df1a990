//! Document state management and text utilities.
//!
//! This module provides:
//! - `LineIndex` for line access and LSP position conversion
//! - `LineState`, `classify` and the per-line `LineStates` cache
//! - `DocumentState` and `DocumentStore` for document lifecycle management

mod line_state;
mod state;
mod text;

pub use line_state::{classify, LineState, LineStates};
pub use state::{DocumentState, DocumentStore};
pub use text::LineIndex;
