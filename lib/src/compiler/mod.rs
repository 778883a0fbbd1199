/*! Compiles a pattern's AST into a graph of matchers.

The graph is stored in a [`Program`] as a flat vector of [`Matcher`]s that
reference each other by [`MatcherId`]. It is built with a variant of
[Thompson's construction][1]: each AST node is compiled into a fragment,
which is a partially built sub-graph with an entry point and a list of
"holes", the continuations that are not known yet. Concatenating two
fragments means patching the holes of the first one with the entry point
of the second one.

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
*/

use std::fmt::{Display, Formatter};

#[cfg(feature = "logging")]
use log::*;
use smallvec::{smallvec, SmallVec};

use crate::ast;
use crate::chars::canonicalize;
use crate::errors::Error;
use crate::flags::Flags;
use crate::state::{
    flatten, QuantifierId, RepetitionState, SequenceState, Text, Visited,
};
use crate::Captures;

pub(crate) use matcher::*;

mod matcher;


/// A compiled pattern.
///
/// Programs are immutable, the state of an ongoing match lives in the
/// engine and in each of its alternatives.
#[derive(Debug)]
pub(crate) struct Program {
    matchers: Vec<Matcher>,
    /// Where every match attempt starts.
    entry: MatcherId,
    /// Consumes one character and jumps to `entry`. Match attempts that
    /// follow an empty match start here.
    skip: MatcherId,
    /// Initial state for each quantifier.
    quantifiers: Vec<RepetitionState>,
    /// Number of capturing groups, including group 0.
    groups: usize,
}

/// Result of evaluating a matcher.
#[derive(Debug)]
pub(crate) enum Step<'p> {
    /// Proceed with the given matcher.
    Continue(MatcherId),
    /// Split the alternative, one new alternative per matcher, in priority
    /// order.
    Branch(&'p [MatcherId]),
    /// The pattern matched.
    Success { global: bool, captures: Captures },
    /// The alternative is dead.
    Fail,
}

/// Information available to zero-width matchers.
pub(crate) struct Context<'a> {
    /// Character before the current position, `None` at the start.
    pub last: Option<char>,
    /// Character after the current position, `None` at the end.
    pub next: Option<char>,
    /// Number of characters consumed so far.
    pub position: usize,
    /// Generation of the match attempt the alternative belongs to.
    pub generation: u64,
    pub text: &'a Text,
    pub visited: &'a mut Visited,
}

impl Program {
    #[inline]
    pub fn entry(&self) -> MatcherId {
        self.entry
    }

    #[inline]
    pub fn skip(&self) -> MatcherId {
        self.skip
    }

    #[inline]
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// State of a fresh alternative.
    pub fn initial_state(&self) -> SequenceState {
        SequenceState::new(&self.quantifiers)
    }

    #[inline]
    pub fn is_one_width(&self, id: MatcherId) -> bool {
        self[id].is_one_width()
    }

    /// Evaluates the zero-width matcher `id`.
    pub fn match0(
        &self,
        id: MatcherId,
        state: &mut SequenceState,
        ctx: &mut Context<'_>,
    ) -> Step<'_> {
        match &self[id] {
            Matcher::Char { .. } => {
                unreachable!("one-width matcher where zero-width expected")
            }
            Matcher::Split { alternatives } => Step::Branch(alternatives),
            Matcher::Reset { quantifiers, groups, next } => {
                for quantifier in quantifiers.iter() {
                    state.repetitions = state.repetitions.set(
                        *quantifier,
                        self.quantifiers[*quantifier as usize],
                    );
                }
                if !groups.is_empty() {
                    state.captures = state.captures.clear(groups);
                }
                Step::Continue(*next)
            }
            Matcher::Repeat { quantifier, greedy, branches } => {
                let current = state.repetitions.get(*quantifier);
                let exit = branches[usize::from(*greedy)];
                let body = branches[usize::from(!*greedy)];

                // The last optional repetition didn't consume anything.
                if current.optional_at == Some(ctx.position) {
                    return Step::Fail;
                }

                if current.max == Some(0) {
                    return Step::Continue(exit);
                }

                if !ctx.visited.insert(
                    ctx.generation,
                    *quantifier,
                    &state.repetitions,
                    ctx.position,
                ) {
                    return Step::Fail;
                }

                state.repetitions = state.repetitions.set(
                    *quantifier,
                    RepetitionState {
                        min: current.min.saturating_sub(1),
                        max: current.max.map(|max| max - 1),
                        optional_at: (current.min == 0)
                            .then_some(ctx.position),
                    },
                );

                if current.min > 0 {
                    Step::Continue(body)
                } else {
                    Step::Branch(branches)
                }
            }
            Matcher::CaptureStart { group, next } => {
                state.captures = state.captures.open(*group, ctx.position);
                if *group == 0 {
                    state.match_start = Some(ctx.position);
                }
                Step::Continue(*next)
            }
            Matcher::CaptureEnd { next } => {
                state.captures = state.captures.close(ctx.position);
                Step::Continue(*next)
            }
            Matcher::Assert { condition, next } => {
                if condition.holds(ctx.last, ctx.next) {
                    Step::Continue(*next)
                } else {
                    Step::Fail
                }
            }
            Matcher::Term { global } => {
                let Some(root) = state.captures.root() else {
                    unreachable!("pattern matched without closing group 0")
                };
                Step::Success {
                    global: *global,
                    captures: flatten(root, self.groups, ctx.text),
                }
            }
        }
    }

    /// Evaluates the one-width matcher `id` against `c`.
    pub fn match1(&self, id: MatcherId, c: char) -> Step<'_> {
        match &self[id] {
            Matcher::Char { test, next } => {
                if test.matches(c) {
                    Step::Continue(*next)
                } else {
                    Step::Fail
                }
            }
            _ => unreachable!("zero-width matcher where one-width expected"),
        }
    }
}

impl std::ops::Index<MatcherId> for Program {
    type Output = Matcher;

    #[inline]
    fn index(&self, id: MatcherId) -> &Self::Output {
        &self.matchers[usize::from(id)]
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, matcher) in self.matchers.iter().enumerate() {
            writeln!(f, "{}: {}", MatcherId::from(i), matcher)?;
        }
        Ok(())
    }
}

/// A continuation that must be patched once it is known.
#[derive(Clone, Copy, Debug)]
enum Hole {
    /// The `next` field of a matcher.
    Next(MatcherId),
    /// The n-th branch of a [`Matcher::Split`] or [`Matcher::Repeat`].
    Branch(MatcherId, usize),
}

/// A partially built sub-graph. `None` is used wherever a fragment is
/// expected for sub-patterns that compile to nothing, like `(?:)`.
#[derive(Debug)]
struct Fragment {
    start: MatcherId,
    holes: SmallVec<[Hole; 2]>,
}

/// Compiles a pattern's AST into a [`Program`].
pub(crate) struct Compiler {
    flags: Flags,
    /// Matchers emitted so far.
    matchers: Vec<Matcher>,
    /// Initial state for each quantifier, indexed by quantifier id.
    quantifiers: Vec<RepetitionState>,
    /// Number of capturing groups allocated so far.
    groups: u32,
    /// One entry per alternative of an alternation being compiled, with
    /// the quantifiers found in that alternative. The innermost
    /// alternative is the last one.
    alternative_quantifiers: Vec<Vec<QuantifierId>>,
}

impl Compiler {
    pub fn new(flags: Flags) -> Self {
        Self {
            flags,
            matchers: Vec::new(),
            quantifiers: Vec::new(),
            groups: 0,
            alternative_quantifiers: Vec::new(),
        }
    }

    /// Compiles `pattern`.
    pub fn compile(
        mut self,
        pattern: &ast::Pattern,
    ) -> Result<Program, Error> {
        if self.flags.unicode {
            return Err(Error::UnicodeFlag);
        }

        let anchored = !self.flags.multiline && is_anchored(pattern);

        let seek = if self.flags.sticky || anchored {
            None
        } else {
            Some(self.seek())
        };

        let body = self.capture(&pattern.alternatives)?;
        let term = self.emit(Matcher::Term { global: self.flags.global });
        let entry = self.concat(seek, Some(body));
        let entry = self.seal(entry, term);
        let skip =
            self.emit(Matcher::Char { test: CharTest::Any, next: entry });

        #[cfg(feature = "logging")]
        debug!(
            "compiled pattern with {} matchers, {} quantifiers, {} groups",
            self.matchers.len(),
            self.quantifiers.len(),
            self.groups
        );

        Ok(Program {
            matchers: self.matchers,
            entry,
            skip,
            quantifiers: self.quantifiers,
            groups: self.groups as usize,
        })
    }
}

impl Compiler {
    fn emit(&mut self, matcher: Matcher) -> MatcherId {
        let id = MatcherId::from(self.matchers.len());
        self.matchers.push(matcher);
        id
    }

    /// Emits a matcher that has a single continuation, which is left as a
    /// hole in the returned fragment.
    fn emit_fragment(&mut self, matcher: Matcher) -> Fragment {
        let id = self.emit(matcher);
        Fragment { start: id, holes: smallvec![Hole::Next(id)] }
    }

    fn patch(&mut self, holes: &[Hole], target: MatcherId) {
        for hole in holes {
            match *hole {
                Hole::Next(id) => match &mut self.matchers[usize::from(id)] {
                    Matcher::Char { next, .. }
                    | Matcher::Reset { next, .. }
                    | Matcher::CaptureStart { next, .. }
                    | Matcher::CaptureEnd { next }
                    | Matcher::Assert { next, .. } => *next = target,
                    matcher => unreachable!("{} has no next", matcher),
                },
                Hole::Branch(id, i) => self.set_branch(id, i, target),
            }
        }
    }

    fn set_branch(&mut self, id: MatcherId, i: usize, target: MatcherId) {
        match &mut self.matchers[usize::from(id)] {
            Matcher::Split { alternatives } => alternatives[i] = target,
            Matcher::Repeat { branches, .. } => branches[i] = target,
            matcher => unreachable!("{} has no branches", matcher),
        }
    }

    /// Returns a fragment that matches `a` followed by `b`.
    fn append(&mut self, mut a: Fragment, b: Option<Fragment>) -> Fragment {
        if let Some(b) = b {
            self.patch(&a.holes, b.start);
            a.holes = b.holes;
        }
        a
    }

    fn concat(
        &mut self,
        a: Option<Fragment>,
        b: Option<Fragment>,
    ) -> Option<Fragment> {
        match a {
            Some(a) => Some(self.append(a, b)),
            None => b,
        }
    }

    /// Patches the holes in `fragment` with `target` and returns the
    /// fragment's entry point.
    fn seal(
        &mut self,
        fragment: Option<Fragment>,
        target: MatcherId,
    ) -> MatcherId {
        match fragment {
            Some(fragment) => {
                self.patch(&fragment.holes, target);
                fragment.start
            }
            None => target,
        }
    }

    fn new_quantifier(&mut self, min: u32, max: Option<u32>) -> QuantifierId {
        let id = self.quantifiers.len() as QuantifierId;
        self.quantifiers.push(RepetitionState::new(min, max));
        id
    }

    /// Emits the lazy `[^]*?` that lets a match start at any position.
    ///
    /// The loop always consumes a character before reaching the split
    /// again, so it doesn't need a quantifier. Keeping it out of the
    /// repetition tables lets attempts started at different positions be
    /// merged by [`Visited`].
    fn seek(&mut self) -> Fragment {
        let split = self.emit(Matcher::Split {
            alternatives: Box::new([MatcherId::UNSET; 2]),
        });
        let any =
            self.emit(Matcher::Char { test: CharTest::Any, next: split });
        self.set_branch(split, 1, any);
        Fragment { start: split, holes: smallvec![Hole::Branch(split, 0)] }
    }

    /// Emits a capturing group containing the given alternatives. Groups
    /// are numbered in the order this function is called.
    fn capture(
        &mut self,
        alternatives: &[ast::Alternative],
    ) -> Result<Fragment, Error> {
        let group = self.groups;
        self.groups += 1;

        let start = self.emit_fragment(Matcher::CaptureStart {
            group,
            next: MatcherId::UNSET,
        });
        let inner = self.alternatives(alternatives)?;
        let end =
            self.emit_fragment(Matcher::CaptureEnd { next: MatcherId::UNSET });

        let fragment = self.append(start, inner);
        Ok(self.append(fragment, Some(end)))
    }

    fn alternatives(
        &mut self,
        alternatives: &[ast::Alternative],
    ) -> Result<Option<Fragment>, Error> {
        match alternatives {
            [] => Ok(None),
            [alternative] => self.alternative(alternative),
            _ => {
                let split = self.emit(Matcher::Split {
                    alternatives: vec![MatcherId::UNSET; alternatives.len()]
                        .into_boxed_slice(),
                });

                let mut holes = SmallVec::new();

                for (i, alternative) in alternatives.iter().enumerate() {
                    self.alternative_quantifiers.push(Vec::new());
                    let fragment = self.alternative(alternative)?;
                    let quantifiers =
                        self.alternative_quantifiers.pop().unwrap_or_default();

                    // Quantifiers in this alternative restart from their
                    // initial state every time the alternative is entered.
                    let fragment = if quantifiers.is_empty() {
                        fragment
                    } else {
                        let reset = self.emit_fragment(Matcher::Reset {
                            quantifiers: quantifiers.into_boxed_slice(),
                            groups: 0..0,
                            next: MatcherId::UNSET,
                        });
                        Some(self.append(reset, fragment))
                    };

                    match fragment {
                        Some(fragment) => {
                            self.set_branch(split, i, fragment.start);
                            holes.extend(fragment.holes);
                        }
                        None => holes.push(Hole::Branch(split, i)),
                    }
                }

                Ok(Some(Fragment { start: split, holes }))
            }
        }
    }

    fn alternative(
        &mut self,
        alternative: &ast::Alternative,
    ) -> Result<Option<Fragment>, Error> {
        let mut fragment = None;
        for element in &alternative.elements {
            let next = self.element(element)?;
            fragment = self.concat(fragment, next);
        }
        Ok(fragment)
    }

    fn element(
        &mut self,
        element: &ast::Element,
    ) -> Result<Option<Fragment>, Error> {
        let test = match element {
            ast::Element::Group(group) => {
                return self.alternatives(&group.alternatives)
            }
            ast::Element::CapturingGroup(group) => {
                if group.name.is_some() {
                    return Err(Error::NamedGroup);
                }
                return self.capture(&group.alternatives).map(Some);
            }
            ast::Element::Assertion(assertion) => {
                return self.assertion(assertion).map(Some)
            }
            ast::Element::Quantifier(quantifier) => {
                return self.quantifier(quantifier).map(Some)
            }
            ast::Element::Backreference(_) => {
                return Err(Error::Backreference)
            }
            ast::Element::Character(c) => self.char_test(*c),
            ast::Element::CharacterSet(set) => self.set_test(set)?,
            ast::Element::CharacterClass(class) => self.class_test(class)?,
        };

        Ok(Some(
            self.emit_fragment(Matcher::Char { test, next: MatcherId::UNSET }),
        ))
    }

    fn assertion(
        &mut self,
        assertion: &ast::Assertion,
    ) -> Result<Fragment, Error> {
        let multiline = self.flags.multiline;
        let condition = match assertion {
            ast::Assertion::Start if multiline => Condition::LineStart,
            ast::Assertion::Start => Condition::InputStart,
            ast::Assertion::End if multiline => Condition::LineEnd,
            ast::Assertion::End => Condition::InputEnd,
            ast::Assertion::Word { negate: false } => Condition::WordBoundary,
            ast::Assertion::Word { negate: true } => {
                Condition::NotWordBoundary
            }
            ast::Assertion::Lookahead { .. } => return Err(Error::Lookahead),
            ast::Assertion::Lookbehind { .. } => {
                return Err(Error::Lookbehind)
            }
        };
        Ok(self.emit_fragment(Matcher::Assert {
            condition,
            next: MatcherId::UNSET,
        }))
    }

    fn quantifier(
        &mut self,
        quantifier: &ast::Quantifier,
    ) -> Result<Fragment, Error> {
        let ast::Quantifier { min, max, greedy, element } = quantifier;

        if let Some(max) = max {
            if min > max {
                return Err(Error::QuantifierOutOfOrder {
                    min: *min,
                    max: *max,
                });
            }
        }

        let id = self.new_quantifier(*min, *max);

        if let Some(quantifiers) = self.alternative_quantifiers.last_mut() {
            quantifiers.push(id);
        }

        let first_group = self.groups;
        let repeat = self.emit(Matcher::Repeat {
            quantifier: id,
            greedy: *greedy,
            branches: [MatcherId::UNSET; 2],
        });

        let body = self.element(element)?;

        // Every repetition starts with fresh state for the quantifiers and
        // groups inside the repeated element.
        let inner_quantifiers: Box<[QuantifierId]> =
            (id + 1..self.quantifiers.len() as QuantifierId).collect();
        let inner_groups = first_group..self.groups;

        let body = if inner_quantifiers.is_empty() && inner_groups.is_empty() {
            body
        } else {
            let reset = self.emit_fragment(Matcher::Reset {
                quantifiers: inner_quantifiers,
                groups: inner_groups,
                next: MatcherId::UNSET,
            });
            Some(self.append(reset, body))
        };

        let body = self.seal(body, repeat);
        let (body_branch, exit_branch) = if *greedy { (0, 1) } else { (1, 0) };

        self.set_branch(repeat, body_branch, body);

        Ok(Fragment {
            start: repeat,
            holes: smallvec![Hole::Branch(repeat, exit_branch)],
        })
    }

    fn char_test(&self, c: char) -> CharTest {
        if self.flags.ignore_case {
            CharTest::Folded(canonicalize(c))
        } else {
            CharTest::Char(c)
        }
    }

    fn set_test(&self, set: &ast::CharacterSet) -> Result<CharTest, Error> {
        let negate = set.negate;
        Ok(match set.kind {
            ast::CharacterSetKind::Any if self.flags.dot_all => CharTest::Any,
            ast::CharacterSetKind::Any => CharTest::NotNewline,
            ast::CharacterSetKind::Digit => CharTest::Digit { negate },
            ast::CharacterSetKind::Space => CharTest::Space { negate },
            ast::CharacterSetKind::Word => CharTest::Word { negate },
            ast::CharacterSetKind::Property => {
                return Err(Error::Unsupported("unicode property escapes"))
            }
        })
    }

    fn class_test(
        &self,
        class: &ast::CharacterClass,
    ) -> Result<CharTest, Error> {
        let mut ranges = Vec::new();
        let mut sets = Vec::new();

        for element in &class.elements {
            match element {
                ast::ClassElement::Character(c) => ranges.push((*c, *c)),
                ast::ClassElement::Range(range) => {
                    if range.min > range.max {
                        return Err(Error::ClassRangeOutOfOrder {
                            min: range.min,
                            max: range.max,
                        });
                    }
                    ranges.push((range.min, range.max))
                }
                ast::ClassElement::CharacterSet(set) => {
                    sets.push(self.set_test(set)?)
                }
            }
        }

        Ok(CharTest::Class(Box::new(Class::new(
            class.negate,
            self.flags.ignore_case,
            ranges,
            sets,
        ))))
    }
}

/// Returns true if every alternative in the pattern starts with `^`.
fn is_anchored(pattern: &ast::Pattern) -> bool {
    pattern.alternatives.iter().all(|alternative| {
        matches!(
            alternative.elements.first(),
            Some(ast::Element::Assertion(ast::Assertion::Start))
        )
    })
}
