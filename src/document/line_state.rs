//! Syntactic mode tracking for LU documents.
//!
//! LU has no block delimiters: the meaning of a `-` line depends on the last
//! header or entity definition above it. [`classify`] derives that mode from
//! the text alone; [`LineStates`] caches the result for every line of a
//! snapshot and rescans only from the first edited line on change.

use std::sync::LazyLock;

use regex::Regex;

use super::text::LineIndex;

static LIST_ENTITY_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@\s*list\s*.*$").unwrap());
static INTENT_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#.*$").unwrap());
static ML_ENTITY_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@\s*ml\s*.*$").unwrap());
static DASH_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*-.*$").unwrap());
static ENTITY_DEFINITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*@.*$").unwrap());

/// The block mode in effect at a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineState {
    /// Inside an intent: lines are example utterances.
    Utterance,
    /// Inside a list entity: lines are canonical values and synonyms.
    ListEntity,
    /// Inside an ml entity: lines are child entity declarations.
    MlEntity,
    #[default]
    Other,
}

impl LineState {
    /// The state after reading `line` while in `self`.
    pub fn advance(self, line: &str) -> LineState {
        if LIST_ENTITY_OPENER.is_match(line) {
            LineState::ListEntity
        } else if INTENT_HEADER.is_match(line) {
            LineState::Utterance
        } else if ML_ENTITY_OPENER.is_match(line) {
            LineState::MlEntity
        } else if DASH_LINE.is_match(line)
            || ENTITY_DEFINITION.is_match(line)
            || line.trim_start().starts_with('>')
        {
            self
        } else {
            LineState::Other
        }
    }
}

/// Classify the mode at `target_line` by scanning every line before it.
pub fn classify(text: &str, target_line: usize) -> LineState {
    text.split('\n')
        .take(target_line)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .fold(LineState::Other, LineState::advance)
}

/// Per-line cache of [`classify`] results for one snapshot.
///
/// Entry `i` holds the state at line `i`, i.e. after reading lines `0..i`.
/// There is one more entry than there are lines so the position just past the
/// last line is covered too.
#[derive(Debug, Clone, Default)]
pub struct LineStates {
    states: Vec<LineState>,
}

impl LineStates {
    /// Compute states for every line of the index.
    pub fn new(index: &LineIndex) -> Self {
        let mut states = Self {
            states: vec![LineState::Other],
        };
        states.extend_from(index, 0);
        states
    }

    /// Recompute states for a new snapshot, reusing entries that cannot have
    /// changed.
    ///
    /// The state at line `k` depends only on lines before `k`, so entries
    /// `0..=first_changed` stay valid.
    pub fn update(&self, old: &LineIndex, new: &LineIndex) -> Self {
        let first_changed = old
            .lines()
            .zip(new.lines())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| old.line_count().min(new.line_count()));

        let keep = (first_changed + 1).min(self.states.len());
        let mut states = Self {
            states: self.states[..keep].to_vec(),
        };
        states.extend_from(new, keep - 1);
        states
    }

    fn extend_from(&mut self, index: &LineIndex, from: usize) {
        self.states.truncate(from + 1);
        let mut state = self.states[from];
        for line in index.lines().skip(from) {
            state = state.advance(line);
            self.states.push(state);
        }
    }

    /// The state in effect at `line`. Lines past the end share the final
    /// state.
    pub fn at(&self, line: usize) -> LineState {
        self.states
            .get(line)
            .or_else(|| self.states.last())
            .copied()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
