use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::engine::{Engine, EngineState};
use crate::{Captures, Pattern};

/// Returns the first match of `pattern` in `input`.
///
/// The input is read only until the match is known to be final, then it is
/// dropped.
///
/// ```
/// # use regex_stream::{exec, Pattern};
/// let pattern = Pattern::new("a(b)?", "").unwrap();
/// let captures = exec(&pattern, "cab".chars()).unwrap();
///
/// assert_eq!(captures, vec![Some("ab".to_string()), Some("b".to_string())]);
/// ```
pub fn exec<I>(pattern: &Pattern, input: I) -> Option<Captures>
where
    I: IntoIterator<Item = char>,
{
    exec_global(pattern, input).next()
}

/// Returns true if `pattern` matches somewhere in `input`.
pub fn test<I>(pattern: &Pattern, input: I) -> bool
where
    I: IntoIterator<Item = char>,
{
    exec(pattern, input).is_some()
}

/// Returns an iterator over the matches of `pattern` in `input`.
///
/// If `pattern` is not global the iterator yields one match at most.
pub fn exec_global<I>(pattern: &Pattern, input: I) -> Matches<'_, I::IntoIter>
where
    I: IntoIterator<Item = char>,
{
    Matches::new(pattern, input.into_iter())
}

/// Iterator that yields the matches of a pattern in the characters produced
/// by another iterator.
///
/// The input is pulled lazily, one character at a time, and only as far as
/// needed for producing the next match. It is dropped as soon as no more
/// matches are possible, or when this iterator is dropped.
pub struct Matches<'p, I> {
    engine: Engine<'p>,
    input: Option<I>,
    pending: VecDeque<Captures>,
}

impl<'p, I> Matches<'p, I>
where
    I: Iterator<Item = char>,
{
    pub(crate) fn new(pattern: &'p Pattern, input: I) -> Self {
        Self {
            engine: Engine::new(pattern),
            input: Some(input),
            pending: VecDeque::new(),
        }
    }
}

impl<'p, I> Iterator for Matches<'p, I>
where
    I: Iterator<Item = char>,
{
    type Item = Captures;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(captures) = self.pending.pop_front() {
                return Some(captures);
            }

            let input = self.input.as_mut()?;
            let chr = input.next();

            self.pending.extend(self.engine.advance(chr));

            if chr.is_none() || self.engine.state() == EngineState::Exhausted
            {
                self.input = None;
            }
        }
    }
}

impl<'p, I> FusedIterator for Matches<'p, I> where I: Iterator<Item = char> {}
