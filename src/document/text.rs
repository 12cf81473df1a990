//! Text utilities for line access and position conversion.
//!
//! LSP positions use line/column where column is in UTF-16 code units, and the
//! LU tooling reasons about whole lines, so this index keeps line start offsets
//! and answers both kinds of question.

use tower_lsp::lsp_types::Position;

/// Pre-computed line index over a document snapshot.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
    /// Source text.
    source: String,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];

        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }

        Self {
            line_starts,
            source,
        }
    }

    /// Get the source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of lines. A trailing newline produces an empty last line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte range of a line, excluding the newline and any trailing `\r`.
    fn line_bounds(&self, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line)?;
        let mut end = self
            .line_starts
            .get(line + 1)
            .map(|&next| next - 1)
            .unwrap_or(self.source.len());
        if self.source[start..end].ends_with('\r') {
            end -= 1;
        }
        Some((start, end))
    }

    /// Text of a line without its terminator.
    pub fn line(&self, line: usize) -> Option<&str> {
        self.line_bounds(line)
            .map(|(start, end)| &self.source[start..end])
    }

    /// Iterate over all lines without terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.line_count()).filter_map(|line| self.line(line))
    }

    /// Length of a line in UTF-16 code units, 0 for lines past the end.
    pub fn line_len_utf16(&self, line: usize) -> u32 {
        self.line(line)
            .map(|text| text.chars().map(|c| c.len_utf16() as u32).sum())
            .unwrap_or(0)
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end. Returns None if
    /// the line is out of bounds.
    pub fn position_to_offset(&self, position: Position) -> Option<usize> {
        let (line_start, line_end) = self.line_bounds(position.line as usize)?;
        let line_slice = &self.source[line_start..line_end];

        // Walk UTF-16 code units to find byte offset
        let mut utf16_col = 0u32;
        for (i, c) in line_slice.char_indices() {
            if utf16_col >= position.character {
                return Some(line_start + i);
            }
            utf16_col += c.len_utf16() as u32;
        }

        Some(line_end)
    }

    /// Text of the caret's line from its start up to the caret.
    pub fn line_prefix(&self, position: Position) -> &str {
        let Some((line_start, _)) = self.line_bounds(position.line as usize) else {
            return "";
        };
        match self.position_to_offset(position) {
            Some(offset) => &self.source[line_start..offset],
            None => "",
        }
    }

    /// The whole text with one line removed entirely.
    pub fn text_without_line(&self, line: usize) -> String {
        let kept: Vec<&str> = self
            .lines()
            .enumerate()
            .filter(|(i, _)| *i != line)
            .map(|(_, text)| text)
            .collect();
        kept.join("\n")
    }

    /// The text of every line strictly before `line`.
    pub fn text_before_line(&self, line: usize) -> String {
        let kept: Vec<&str> = self.lines().take(line).collect();
        kept.join("\n")
    }
}
