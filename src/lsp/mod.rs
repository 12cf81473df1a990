//! LSP protocol feature implementations.
//!
//! This module provides implementations for LSP features:
//! - Diagnostics conversion from parser/validation errors
//! - Debounced validation scheduling
//! - Completion rules for LU lines
//! - On-type formatting and the labeling experience

mod completion;
mod diagnostics;
mod format;
mod labeling;
mod patterns;
mod validation;

pub use completion::completion_at_position;
pub use diagnostics::{schema_diagnostics, syntax_diagnostics, validate_text};
pub use format::{format_on_type, NEWLINE_TRIGGER};
pub use labeling::{
    strip_label, AddUnlabelUtterance, AddUnlabelUtteranceParams, EditorPosition,
    LabelingExperienceParams, LABELING_EXPERIENCE_REQUEST,
};
pub use validation::{
    DiagnosticsPublisher, ValidationOptions, ValidationScheduler, DEFAULT_DEBOUNCE,
    DEFAULT_LOCALE,
};
