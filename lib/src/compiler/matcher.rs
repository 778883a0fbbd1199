use std::fmt::{Display, Formatter};
use std::ops::Range;

use itertools::Itertools;

use crate::chars::{
    canonicalize, is_digit, is_line_terminator, is_space, is_word,
};
use crate::state::QuantifierId;

/// Index of a [`Matcher`] within a [`super::Program`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct MatcherId(u32);

impl MatcherId {
    /// Placeholder for continuations that are not known yet.
    pub const UNSET: Self = Self(u32::MAX);
}

impl From<usize> for MatcherId {
    #[inline]
    fn from(value: usize) -> Self {
        Self(value as u32)
    }
}

impl From<MatcherId> for usize {
    #[inline]
    fn from(value: MatcherId) -> Self {
        value.0 as usize
    }
}

impl Display for MatcherId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

/// A single step in a compiled pattern.
///
/// Only [`Matcher::Char`] consumes input (it is one-width), every other
/// kind of matcher is zero-width.
#[derive(Debug)]
pub(crate) enum Matcher {
    /// Consumes one character accepted by `test`.
    Char { test: CharTest, next: MatcherId },
    /// Splits the current alternative in several ones. Earlier
    /// alternatives have higher priority.
    Split { alternatives: Box<[MatcherId]> },
    /// Restores the given quantifiers to their initial state and discards
    /// previously recorded captures for the groups in `groups`.
    Reset {
        quantifiers: Box<[QuantifierId]>,
        groups: Range<u32>,
        next: MatcherId,
    },
    /// Repeats a sub-pattern. `branches` contains the entry point of the
    /// repeated sub-pattern and the continuation after the repetition, in
    /// priority order: `[body, exit]` if greedy, `[exit, body]` if lazy.
    Repeat {
        quantifier: QuantifierId,
        greedy: bool,
        branches: [MatcherId; 2],
    },
    /// Opens a capturing group.
    CaptureStart { group: u32, next: MatcherId },
    /// Closes the innermost open capturing group.
    CaptureEnd { next: MatcherId },
    /// Continues only if `condition` holds at the current position.
    Assert { condition: Condition, next: MatcherId },
    /// The whole pattern matched.
    Term { global: bool },
}

impl Matcher {
    #[inline]
    pub fn is_one_width(&self) -> bool {
        matches!(self, Matcher::Char { .. })
    }
}

impl Display for Matcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Matcher::Char { test, next } => {
                write!(f, "CHAR {} -> {}", test, next)
            }
            Matcher::Split { alternatives } => {
                write!(f, "SPLIT {}", alternatives.iter().join(", "))
            }
            Matcher::Reset { quantifiers, groups, next } => {
                write!(f, "RESET")?;
                if !quantifiers.is_empty() {
                    write!(f, " q[{}]", quantifiers.iter().join(", "))?;
                }
                if !groups.is_empty() {
                    write!(f, " g{}..{}", groups.start, groups.end)?;
                }
                write!(f, " -> {}", next)
            }
            Matcher::Repeat { quantifier, greedy, branches } => write!(
                f,
                "REPEAT q{} {} {}, {}",
                quantifier,
                if *greedy { "greedy" } else { "lazy" },
                branches[0],
                branches[1]
            ),
            Matcher::CaptureStart { group, next } => {
                write!(f, "SAVE_START {} -> {}", group, next)
            }
            Matcher::CaptureEnd { next } => write!(f, "SAVE_END -> {}", next),
            Matcher::Assert { condition, next } => {
                write!(f, "ASSERT {} -> {}", condition, next)
            }
            Matcher::Term { global: false } => write!(f, "MATCH"),
            Matcher::Term { global: true } => write!(f, "MATCH global"),
        }
    }
}

/// Conditions checked by [`Matcher::Assert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Condition {
    /// `^` without the multiline flag.
    InputStart,
    /// `^` with the multiline flag.
    LineStart,
    /// `$` without the multiline flag.
    InputEnd,
    /// `$` with the multiline flag.
    LineEnd,
    /// `\b`
    WordBoundary,
    /// `\B`
    NotWordBoundary,
}

impl Condition {
    /// Checks the condition between the `last` character consumed and the
    /// `next` one. `None` stands for the start and end of the input.
    pub fn holds(&self, last: Option<char>, next: Option<char>) -> bool {
        match self {
            Condition::InputStart => last.is_none(),
            Condition::LineStart => last.map_or(true, is_line_terminator),
            Condition::InputEnd => next.is_none(),
            Condition::LineEnd => next.map_or(true, is_line_terminator),
            Condition::WordBoundary => {
                last.is_some_and(is_word) != next.is_some_and(is_word)
            }
            Condition::NotWordBoundary => {
                last.is_some_and(is_word) == next.is_some_and(is_word)
            }
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Condition::InputStart => "START",
            Condition::LineStart => "LINE_START",
            Condition::InputEnd => "END",
            Condition::LineEnd => "LINE_END",
            Condition::WordBoundary => "WORD_BOUNDARY",
            Condition::NotWordBoundary => "NOT_WORD_BOUNDARY",
        };
        write!(f, "{}", name)
    }
}

/// Decides whether a character is accepted by [`Matcher::Char`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CharTest {
    /// Any character, line terminators included.
    Any,
    /// Any character except line terminators.
    NotNewline,
    Char(char),
    /// Case-insensitive comparison, the character is in canonical form.
    Folded(char),
    Digit { negate: bool },
    Space { negate: bool },
    Word { negate: bool },
    Class(Box<Class>),
}

impl CharTest {
    pub fn matches(&self, c: char) -> bool {
        match self {
            CharTest::Any => true,
            CharTest::NotNewline => !is_line_terminator(c),
            CharTest::Char(expected) => c == *expected,
            CharTest::Folded(expected) => canonicalize(c) == *expected,
            CharTest::Digit { negate } => is_digit(c) != *negate,
            CharTest::Space { negate } => is_space(c) != *negate,
            CharTest::Word { negate } => is_word(c) != *negate,
            CharTest::Class(class) => class.matches(c),
        }
    }
}

impl Display for CharTest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CharTest::Any => write!(f, "any"),
            CharTest::NotNewline => write!(f, "."),
            CharTest::Char(c) => write!(f, "{:?}", c),
            CharTest::Folded(c) => write!(f, "i{:?}", c),
            CharTest::Digit { negate } => {
                write!(f, "{}", if *negate { r"\D" } else { r"\d" })
            }
            CharTest::Space { negate } => {
                write!(f, "{}", if *negate { r"\S" } else { r"\s" })
            }
            CharTest::Word { negate } => {
                write!(f, "{}", if *negate { r"\W" } else { r"\w" })
            }
            CharTest::Class(class) => write!(f, "{}", class),
        }
    }
}

/// A bracketed character class like `[a-z\d]`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Class {
    pub negate: bool,
    /// If true, a character also matches when some character in the class
    /// has the same canonical form.
    pub fold: bool,
    /// Inclusive character ranges. Single characters are ranges where both
    /// bounds are equal.
    pub ranges: Box<[(char, char)]>,
    pub sets: Box<[CharTest]>,
    /// Sorted canonical forms of the characters in `ranges` that are not
    /// their own canonical form. Empty unless `fold` is true.
    folded: Box<[char]>,
}

/// No character above this one changes when upper-cased.
const LAST_CASED: char = '\u{1FFFF}';

impl Class {
    pub fn new(
        negate: bool,
        fold: bool,
        ranges: Vec<(char, char)>,
        sets: Vec<CharTest>,
    ) -> Self {
        let folded = if fold {
            ranges
                .iter()
                .filter(|(min, _)| *min <= LAST_CASED)
                .flat_map(|(min, max)| *min..=*max.min(&LAST_CASED))
                .map(canonicalize)
                .filter(|c| !ranges.iter().any(|r| (r.0..=r.1).contains(c)))
                .sorted_unstable()
                .dedup()
                .collect()
        } else {
            Box::default()
        };

        Self {
            negate,
            fold,
            ranges: ranges.into_boxed_slice(),
            sets: sets.into_boxed_slice(),
            folded,
        }
    }

    pub fn matches(&self, c: char) -> bool {
        let in_ranges = |c: char| {
            self.ranges.iter().any(|(min, max)| (*min..=*max).contains(&c))
        };

        let mut matches = in_ranges(c);

        if !matches && self.fold {
            let canonical = canonicalize(c);
            matches = in_ranges(canonical)
                || self.folded.binary_search(&canonical).is_ok();
        }

        (matches || self.sets.iter().any(|set| set.matches(c))) != self.negate
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.fold {
            write!(f, "i")?;
        }
        write!(f, "[")?;
        if self.negate {
            write!(f, "^")?;
        }
        for (min, max) in self.ranges.iter() {
            if min == max {
                write!(f, "{}", min.escape_debug())?;
            } else {
                write!(f, "{}-{}", min.escape_debug(), max.escape_debug())?;
            }
        }
        for set in self.sets.iter() {
            write!(f, "{}", set)?;
        }
        write!(f, "]")
    }
}
