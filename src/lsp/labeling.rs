//! The labeling experience: duplicate a labeled utterance as plain text.
//!
//! The editor asks with a custom request and gets its edits back through a
//! custom notification rather than the request's response.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::{Position, Range, TextEdit, Url};

use crate::document::LineIndex;

use super::patterns::{is_labeled_utterance, remove_labels};

/// Method name of the custom request.
pub const LABELING_EXPERIENCE_REQUEST: &str = "labelingExperienceRequest";

/// An editor position. `line_number` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPosition {
    pub line_number: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelingExperienceParams {
    pub uri: Url,
    pub position: EditorPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUnlabelUtteranceParams {
    pub edits: Vec<TextEdit>,
}

/// Notification carrying the unlabeled copies of an utterance.
#[derive(Debug)]
pub enum AddUnlabelUtterance {}

impl Notification for AddUnlabelUtterance {
    type Params = AddUnlabelUtteranceParams;
    const METHOD: &'static str = "addUnlabelUtterance";
}

/// Edits inserting an unlabeled copy of the line above and below it.
///
/// Returns None unless the line at `position.line_number - 1` is a labeled
/// utterance.
pub fn strip_label(index: &LineIndex, position: EditorPosition) -> Option<Vec<TextEdit>> {
    let line = position.line_number.checked_sub(1)?;
    let content = index.line(line as usize)?;
    if !is_labeled_utterance(content) {
        return None;
    }

    let unlabeled = remove_labels(content);
    let start = Position::new(line, 0);
    let end = Position::new(line, index.line_len_utf16(line as usize));
    Some(vec![
        TextEdit::new(Range::new(start, start), format!("{}\n", unlabeled)),
        TextEdit::new(Range::new(end, end), format!("\n{}", unlabeled)),
    ])
}
