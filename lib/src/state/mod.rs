/*! Per-alternative matching state.

Every live alternative owns a [`SequenceState`]. When an alternative splits
in two, both halves receive a clone of the state, so all the structures in
this module are persistent: cloning is O(1) and modifying a clone returns a
new version that shares as much as possible with the previous one.
*/

use std::collections::VecDeque;
use std::ops::Range;

pub(crate) mod captures;
pub(crate) mod stack;
pub(crate) mod tree;
pub(crate) mod visited;

pub(crate) use captures::{flatten, CaptureState};
pub(crate) use visited::Visited;

/// Identifies a quantifier within a compiled pattern.
pub(crate) type QuantifierId = u32;

/// Remaining repetitions for a quantifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RepetitionState {
    /// Repetitions that must still happen.
    pub min: u32,
    /// Repetitions that may still happen, `None` means unbounded.
    pub max: Option<u32>,
    /// Input position at which the last optional repetition started. An
    /// optional repetition that ends where it started is empty, and it is
    /// not allowed to loop again.
    pub optional_at: Option<usize>,
}

impl RepetitionState {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max, optional_at: None }
    }
}

impl Default for RepetitionState {
    fn default() -> Self {
        Self::new(0, None)
    }
}

/// Maps each quantifier to its [`RepetitionState`].
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RepetitionTable(tree::Tree<QuantifierId, RepetitionState>);

impl RepetitionTable {
    /// Creates a table where each quantifier is at the given initial state.
    pub fn new(initial: &[RepetitionState]) -> Self {
        let mut tree = tree::Tree::new();
        for (id, state) in (0..).zip(initial) {
            tree = tree.insert(id, *state);
        }
        Self(tree)
    }

    pub fn get(&self, id: QuantifierId) -> RepetitionState {
        self.0.get(&id).copied().unwrap_or_default()
    }

    pub fn set(&self, id: QuantifierId, state: RepetitionState) -> Self {
        Self(self.0.insert(id, state))
    }

    /// Iterates the state of every quantifier, by ascending id.
    pub fn iter(&self) -> impl Iterator<Item = RepetitionState> + '_ {
        self.0.iter().map(|(_, state)| *state)
    }
}

/// The state owned by each live alternative.
#[derive(Clone, Debug)]
pub(crate) struct SequenceState {
    pub captures: CaptureState,
    pub repetitions: RepetitionTable,
    /// Position where group 0 started, if it did.
    pub match_start: Option<usize>,
}

impl SequenceState {
    pub fn new(initial: &[RepetitionState]) -> Self {
        Self {
            captures: CaptureState::default(),
            repetitions: RepetitionTable::new(initial),
            match_start: None,
        }
    }
}

/// The input consumed so far that can still be part of some match.
///
/// Characters before the start of the oldest pending match are discarded,
/// so the memory used while scanning a stream is proportional to the
/// longest match in progress, not to the stream length.
#[derive(Debug, Default)]
pub(crate) struct Text {
    chars: VecDeque<char>,
    /// Position of the first character in `chars`.
    base: usize,
}

impl Text {
    /// Appends a character.
    pub fn push(&mut self, c: char) {
        self.chars.push_back(c);
    }

    /// Position right after the last character pushed.
    #[inline]
    pub fn end(&self) -> usize {
        self.base + self.chars.len()
    }

    /// Number of characters retained.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns the text in the given range of positions.
    ///
    /// # Panics
    ///
    /// If the range covers discarded characters.
    pub fn slice(&self, range: Range<usize>) -> String {
        assert!(range.start >= self.base, "slicing discarded text");
        self.chars
            .range(range.start - self.base..range.end - self.base)
            .collect()
    }

    /// Discards every character before position `start`.
    pub fn discard_before(&mut self, start: usize) {
        let n = start.saturating_sub(self.base).min(self.chars.len());
        self.chars.drain(..n);
        self.base += n;
    }
}
