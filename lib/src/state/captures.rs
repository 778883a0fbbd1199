use std::ops::Range;

use super::stack::Stack;
use super::Text;

/// A capturing group recorded by some alternative.
///
/// Offsets are absolute character positions within the input. The end
/// offset is `None` while the group is still open.
#[derive(Clone, Debug)]
pub(crate) struct Capture {
    pub id: u32,
    pub start: usize,
    pub end: Option<usize>,
    /// Captures completed strictly inside this one, the most recent first.
    pub children: Stack<Capture>,
}

/// The captures of a single alternative.
///
/// `levels` contains one list of sibling captures per open group, plus the
/// list for the top level. The topmost list belongs to the innermost open
/// group. An open group is represented by a partial capture (without end
/// offset) on top of its parent's list.
#[derive(Clone, Debug)]
pub(crate) struct CaptureState {
    levels: Stack<Stack<Capture>>,
}

impl Default for CaptureState {
    fn default() -> Self {
        Self { levels: Stack::new().push(Stack::new()) }
    }
}

impl CaptureState {
    /// Opens group `id` at offset `start`.
    pub fn open(&self, id: u32, start: usize) -> Self {
        let siblings = self.levels.peek().cloned().unwrap_or_default();
        let partial = Capture { id, start, end: None, children: Stack::new() };
        Self {
            levels: self
                .levels
                .pop()
                .push(siblings.push(partial))
                .push(Stack::new()),
        }
    }

    /// Closes the innermost open group at offset `end`.
    ///
    /// A completed capture with the same id already on top of the parent
    /// list is overwritten, the last iteration of a repeated group wins.
    pub fn close(&self, end: usize) -> Self {
        let children = self.levels.peek().cloned().unwrap_or_default();
        let levels = self.levels.pop();
        let siblings = levels.peek().cloned().unwrap_or_default();

        let Some(partial) = siblings.peek() else {
            unreachable!("closing a capture group that was never opened")
        };

        let capture = Capture {
            id: partial.id,
            start: partial.start,
            end: Some(end),
            children,
        };

        let mut siblings = siblings.pop();
        if siblings.peek().is_some_and(|top| top.id == capture.id) {
            siblings = siblings.pop();
        }

        Self { levels: levels.pop().push(siblings.push(capture)) }
    }

    /// Discards the completed captures whose id is in `ids` from the top of
    /// the innermost list.
    pub fn clear(&self, ids: &Range<u32>) -> Self {
        let Some(siblings) = self.levels.peek() else {
            return self.clone();
        };
        let mut cleared = siblings.clone();
        while cleared.peek().is_some_and(|c| ids.contains(&c.id)) {
            cleared = cleared.pop();
        }
        if cleared.len() == siblings.len() {
            return self.clone();
        }
        Self { levels: self.levels.pop().push(cleared) }
    }

    /// Returns the completed capture for group 0, if any.
    pub fn root(&self) -> Option<&Capture> {
        self.levels.iter().last()?.peek().filter(|c| c.end.is_some())
    }
}

/// Linearizes the capture tree rooted at `root` into a vector with
/// `groups` slots, where slot `n` contains the text matched by group `n`,
/// or `None` if the group didn't participate in the match.
pub(crate) fn flatten(
    root: &Capture,
    groups: usize,
    text: &Text,
) -> Vec<Option<String>> {
    let mut result = vec![None; groups];
    let mut pending = vec![root];

    // Children are stored most recent first, so the first capture that
    // fills a slot is the last one recorded for that group.
    while let Some(capture) = pending.pop() {
        let (Some(slot), Some(end)) =
            (result.get_mut(capture.id as usize), capture.end)
        else {
            continue;
        };
        if slot.is_none() {
            *slot = Some(text.slice(capture.start..end));
        }
        let first = pending.len();
        pending.extend(capture.children.iter());
        pending[first..].reverse();
    }

    result
}
