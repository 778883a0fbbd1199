/*! Non-backtracking execution engine.

The engine simulates every live alternative of a pattern at the same time,
one input character at a time. Alternatives are kept in priority lists,
where better alternatives come first. Each element in a list is either a
*sequence*, an alternative still in progress, or a *match*, an alternative
that reached the end of the pattern.

A match owns a list of its own: the match attempts that start right after
it when the pattern is global. So the lists form a tree, rooted at a match
without captures that owns the first attempt:

```text
root ─┬─ sequence
      ├─ sequence
      └─ match (generation 1) ─┬─ sequence
                               └─ sequence
```

A match always sits at the end of its list: when a sequence succeeds every
worse sibling is dropped, as none of them can produce a better result for
the same attempt. Once the sequences before a match die the match is the
first element in the root's list, and its result is final.

The engine is driven in steps. Each character is first fed with
[`Engine::feed`], then [`Engine::settle`] runs all zero-width matchers
until every sequence is waiting for a character, and [`Engine::consume`]
feeds the character to all of them. The end of the input is signaled by
feeding `None`.
*/

#[cfg(feature = "logging")]
use log::*;

use crate::compiler::{Context, MatcherId, Program, Step};
use crate::errors::EngineError;
use crate::state::{SequenceState, Text, Visited};
use crate::{Captures, Pattern};

use pool::{Match, Node, NodeData, NodeId, Pool, Sequence};

mod pool;


/// Where an [`Engine`] is in its step cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing was fed yet.
    AwaitingFirstInput,
    /// Input was fed, or a character was consumed, and the zero-width
    /// matchers must be settled.
    Settling,
    /// Every live alternative is waiting for the next character.
    AwaitingCharacter,
    /// No live alternatives remain, or the input ended.
    Exhausted,
}

/// Matches a [`Pattern`] against input supplied one character at a time.
///
/// ```
/// # use regex_stream::{Engine, EngineState, Pattern};
/// let pattern = Pattern::new("b+", "").unwrap();
/// let mut engine = Engine::new(&pattern);
/// let mut results = Vec::new();
///
/// for c in "abbc".chars() {
///     engine.feed(Some(c)).unwrap();
///     results.extend(engine.settle().unwrap());
///     if engine.state() == EngineState::AwaitingCharacter {
///         results.extend(engine.consume().unwrap());
///     }
/// }
///
/// assert_eq!(results, vec![vec![Some("bb".to_string())]]);
/// ```
pub struct Engine<'p> {
    program: &'p Program,
    nodes: Pool,
    root: NodeId,
    /// Last generation assigned to a match.
    generation: u64,
    /// State for new match attempts.
    initial: SequenceState,
    text: Text,
    /// Character before the current position.
    last: Option<char>,
    /// Character after the current position, `None` at the end.
    next: Option<char>,
    position: usize,
    /// True if the current input was already settled.
    starved: bool,
    state: EngineState,
    visited: Visited,
    /// Start of the oldest match in progress, used while consuming.
    oldest: usize,
}

impl<'p> Engine<'p> {
    /// Creates an engine for `pattern`.
    pub fn new(pattern: &'p Pattern) -> Self {
        let program = pattern.program();
        let initial = program.initial_state();
        let mut nodes = Pool::new();

        let first = nodes.alloc(Node::new(NodeData::Sequence(Sequence {
            next: program.entry(),
            state: initial.clone(),
        })));

        let root = nodes.alloc(Node::new(NodeData::Match(Match {
            generation: 0,
            captures: None,
            head: Some(first),
        })));

        Self {
            program,
            nodes,
            root,
            generation: 0,
            initial,
            text: Text::default(),
            last: None,
            next: None,
            position: 0,
            starved: false,
            state: EngineState::AwaitingFirstInput,
            visited: Visited::new(),
            oldest: 0,
        }
    }

    /// Supplies the next character, or `None` at the end of the input.
    pub fn feed(&mut self, chr: Option<char>) -> Result<(), EngineError> {
        match self.state {
            EngineState::Exhausted => Err(EngineError::Exhausted),
            EngineState::AwaitingCharacter => Err(EngineError::AlreadyFed),
            EngineState::Settling if !self.starved => {
                Err(EngineError::AlreadyFed)
            }
            EngineState::AwaitingFirstInput | EngineState::Settling => {
                self.shift(chr);
                Ok(())
            }
        }
    }

    /// Runs the zero-width matchers of every live alternative until they
    /// are all waiting for a character. Returns the matches that became
    /// final during this step, in order.
    pub fn settle(&mut self) -> Result<Vec<Captures>, EngineError> {
        match self.state {
            EngineState::Exhausted => Err(EngineError::Exhausted),
            EngineState::Settling if !self.starved => Ok(self.settle_step()),
            _ => Err(EngineError::Starved),
        }
    }

    /// Feeds the current character to every live alternative. Returns the
    /// matches that became final during this step, in order.
    pub fn consume(&mut self) -> Result<Vec<Captures>, EngineError> {
        match (self.state, self.next) {
            (EngineState::Exhausted, _) => Err(EngineError::Exhausted),
            (EngineState::AwaitingCharacter, Some(chr)) => {
                Ok(self.consume_step(chr))
            }
            _ => Err(EngineError::PendingZeroWidth),
        }
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns true if no live alternatives remain.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.nodes.match_ref(self.root).head.is_none()
    }

    /// Number of characters consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of live alternatives.
    pub fn alternatives(&self) -> usize {
        self.nodes.sequences()
    }

    /// Feeds `chr` and runs a full step. Used by the adapters, which never
    /// drive the engine out of order.
    pub(crate) fn advance(&mut self, chr: Option<char>) -> Vec<Captures> {
        debug_assert!(matches!(
            self.state,
            EngineState::AwaitingFirstInput | EngineState::Settling
        ));

        self.shift(chr);

        let mut results = self.settle_step();

        if let (EngineState::AwaitingCharacter, Some(chr)) =
            (self.state, self.next)
        {
            results.extend(self.consume_step(chr));
        }

        results
    }
}

impl<'p> Engine<'p> {
    fn shift(&mut self, chr: Option<char>) {
        self.last = self.next;
        self.next = chr;
        self.starved = false;
        self.state = EngineState::Settling;
    }

    fn settle_step(&mut self) -> Vec<Captures> {
        self.visited.clear();
        self.traverse(Self::settle_sequence);

        #[cfg(feature = "logging")]
        trace!(
            "settled position {}: {} alternatives",
            self.position,
            self.alternatives()
        );

        let results = self.collect();

        self.state = if self.is_done() || self.next.is_none() {
            EngineState::Exhausted
        } else {
            EngineState::AwaitingCharacter
        };

        results
    }

    fn consume_step(&mut self, chr: char) -> Vec<Captures> {
        self.text.push(chr);
        self.oldest = self.text.end();

        self.traverse(|engine, owner, id| {
            engine.consume_sequence(owner, id, chr)
        });

        self.position += 1;
        self.text.discard_before(self.oldest);
        self.starved = true;

        let results = self.collect();

        self.state = if self.is_done() {
            EngineState::Exhausted
        } else {
            EngineState::Settling
        };

        results
    }

    /// Calls `f` for every sequence, from best to worst. `f` receives the
    /// match that owns the sequence's list and the sequence, and returns the
    /// next node to visit.
    fn traverse<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Self, NodeId, NodeId) -> Option<NodeId>,
    {
        let head = self.nodes.match_ref(self.root).head;
        let mut pending = vec![(self.root, head)];

        while let Some((owner, mut current)) = pending.pop() {
            while let Some(id) = current {
                if self.nodes.is_match(id) {
                    pending.push((owner, self.nodes[id].worse));
                    pending.push((id, self.nodes.match_ref(id).head));
                    break;
                }
                current = f(self, owner, id);
            }
        }
    }

    /// Runs zero-width matchers on sequence `id` until it waits for a
    /// character, fails or succeeds.
    fn settle_sequence(
        &mut self,
        owner: NodeId,
        id: NodeId,
    ) -> Option<NodeId> {
        let program = self.program;
        let generation = self.nodes.match_ref(owner).generation;

        loop {
            let sequence = self.nodes.sequence_mut(id);

            if program.is_one_width(sequence.next) {
                // The input ended before the character it expects.
                if self.next.is_none() {
                    return self.fail(owner, id);
                }
                return self.nodes[id].worse;
            }

            let mut ctx = Context {
                last: self.last,
                next: self.next,
                position: self.position,
                generation,
                text: &self.text,
                visited: &mut self.visited,
            };

            let step =
                program.match0(sequence.next, &mut sequence.state, &mut ctx);

            match step {
                Step::Continue(next) => sequence.next = next,
                Step::Branch(branches) => self.explode(id, branches),
                Step::Fail => return self.fail(owner, id),
                Step::Success { global, captures } => {
                    return self.succeed(owner, id, global, captures)
                }
            }
        }
    }

    fn consume_sequence(
        &mut self,
        owner: NodeId,
        id: NodeId,
        chr: char,
    ) -> Option<NodeId> {
        let program = self.program;
        let sequence = self.nodes.sequence_mut(id);

        match program.match1(sequence.next, chr) {
            Step::Continue(next) => {
                sequence.next = next;
                if let Some(start) = sequence.state.match_start {
                    self.oldest = self.oldest.min(start);
                }
                self.nodes[id].worse
            }
            Step::Fail => self.fail(owner, id),
            step => unreachable!("one-width matcher returned {:?}", step),
        }
    }

    /// Removes sequence `id` from its list and returns its worse sibling.
    fn fail(&mut self, owner: NodeId, id: NodeId) -> Option<NodeId> {
        let node = self.nodes.release(id);

        match node.better {
            Some(better) => self.nodes[better].worse = node.worse,
            None => self.nodes.match_mut(owner).head = node.worse,
        }

        if let Some(worse) = node.worse {
            self.nodes[worse].better = node.better;
        }

        node.worse
    }

    /// Replaces sequence `id` with a match and drops its worse siblings.
    /// Returns the new match, whose list must be visited next.
    fn succeed(
        &mut self,
        owner: NodeId,
        id: NodeId,
        global: bool,
        captures: Captures,
    ) -> Option<NodeId> {
        let node = self.nodes.release(id);
        self.nodes.release_chain(node.worse);
        self.generation += 1;

        #[cfg(feature = "logging")]
        debug!(
            "match found at position {} (generation {}): {:?}",
            self.position, self.generation, captures[0]
        );

        let head = if global {
            // After an empty match the next attempt must start one
            // character later.
            let empty = captures
                .first()
                .and_then(|c| c.as_deref())
                .map_or(true, str::is_empty);

            let start =
                if empty { self.program.skip() } else { self.program.entry() };

            Some(self.nodes.alloc(Node::new(NodeData::Sequence(Sequence {
                next: start,
                state: self.initial.clone(),
            }))))
        } else {
            None
        };

        let id = self.nodes.alloc(Node {
            better: node.better,
            worse: None,
            data: NodeData::Match(Match {
                generation: self.generation,
                captures: Some(captures),
                head,
            }),
        });

        match node.better {
            Some(better) => self.nodes[better].worse = Some(id),
            None => self.nodes.match_mut(owner).head = Some(id),
        }

        Some(id)
    }

    /// Splits sequence `id` in one sequence per branch, in the same order.
    /// The first branch stays in `id`.
    fn explode(&mut self, id: NodeId, branches: &[MatcherId]) {
        let Some((first, rest)) = branches.split_first() else {
            panic!("branching into no alternatives")
        };

        let mut prev = id;

        for next in rest {
            let state = self.nodes.sequence_mut(id).state.clone();
            let worse = self.nodes[prev].worse;
            let new = self.nodes.alloc(Node {
                better: Some(prev),
                worse,
                data: NodeData::Sequence(Sequence { next: *next, state }),
            });
            if let Some(worse) = worse {
                self.nodes[worse].better = Some(new);
            }
            self.nodes[prev].worse = Some(new);
            prev = new;
        }

        self.nodes.sequence_mut(id).next = *first;
    }

    /// Promotes every match that is first in the root's list, returning
    /// their captures in order.
    fn collect(&mut self) -> Vec<Captures> {
        let mut results = Vec::new();

        while let Some(head) = self.nodes.match_ref(self.root).head {
            if !self.nodes.is_match(head) {
                break;
            }

            assert!(
                self.nodes[head].worse.is_none(),
                "match with worse siblings"
            );

            self.nodes.release(self.root);
            self.root = head;

            if let Some(captures) = self.nodes.match_mut(head).captures.take()
            {
                results.push(captures);
            }
        }

        results
    }
}
