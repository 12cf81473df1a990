//! On-type formatting triggered by a newline.
//!
//! Continues the bullet structure of intents, list entities and ml entities,
//! and collapses a bullet the user opened and then abandoned.

use tower_lsp::lsp_types::{Position, Range, TextEdit};

use crate::document::{DocumentState, LineState};

use super::patterns::{ml_definition_name, ml_entity_names};

/// The only character that triggers formatting.
pub const NEWLINE_TRIGGER: &str = "\n";

/// Edits to apply after `ch` was typed with the caret at `position`.
///
/// Known ml entities are found by scanning the lines above the caret, so a
/// broken line elsewhere does not stop the continuation.
pub fn format_on_type(doc: &DocumentState, position: Position, ch: &str) -> Vec<TextEdit> {
    if ch != NEWLINE_TRIGGER {
        return Vec::new();
    }

    let index = &doc.line_index;
    let line = position.line as usize;
    let previous = match line.checked_sub(1) {
        Some(prev) => index.line(prev).unwrap_or_default(),
        None => "",
    };
    let previous_trimmed = previous.trim();
    let opens_bullet = !previous_trimmed.is_empty() && previous_trimmed != "-";
    let on_last_line = line + 1 == index.line_count();
    let line_start = Position::new(position.line, 0);

    let mut edits = Vec::new();
    match doc.line_state(line) {
        LineState::Utterance if opens_bullet && on_last_line => {
            edits.push(TextEdit::new(Range::new(line_start, line_start), "- ".to_string()));
        }
        LineState::MlEntity if previous_trimmed.ends_with('=') => {
            let is_known_ml = ml_definition_name(previous)
                .is_some_and(|name| ml_entity_names(index.lines().take(line)).contains(&name));
            if is_known_ml {
                edits.push(TextEdit::new(Range::new(line_start, line_start), "\t-@".to_string()));
            }
        }
        LineState::ListEntity if opens_bullet && on_last_line => {
            let bullet = if previous_trimmed.ends_with(':') || previous_trimmed.ends_with('=') {
                "\t-"
            } else {
                "-"
            };
            edits.push(TextEdit::new(Range::new(line_start, line_start), bullet.to_string()));
        }
        _ => {}
    }

    if previous_trimmed == "-" {
        let end = Position::new(position.line, index.line_len_utf16(line));
        let start = Position::new(position.line - 1, 0);
        edits.push(TextEdit::new(Range::new(start, end), String::new()));
    }

    edits
}
