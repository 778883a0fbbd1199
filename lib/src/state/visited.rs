use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::{QuantifierId, RepetitionState, RepetitionTable};

/// Records the states in which quantifiers were entered during a single
/// zero-width step.
///
/// Two alternatives of the same match attempt that enter the same
/// quantifier at the same position, with equivalent repetition tables, will
/// behave identically from that point on. Only the first one, which has
/// higher priority, needs to be kept alive. This is what keeps the number
/// of alternatives bounded for patterns like `(a|a)*` or `a*a*`.
///
/// Tables are compared as seen from the current position: the only thing
/// that matters about the start of an optional repetition is whether it
/// started right here, so repetitions that started at different earlier
/// positions are the same.
#[derive(Debug, Default)]
pub(crate) struct Visited {
    seen: FxHashSet<(u64, QuantifierId, Key)>,
}

type Key = SmallVec<[Remaining; 4]>;

/// The part of a [`RepetitionState`] that can still affect the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Remaining {
    min: u32,
    max: Option<u32>,
    /// The last optional repetition started at the current position.
    started_here: bool,
}

impl Remaining {
    fn new(state: RepetitionState, position: usize) -> Self {
        Self {
            min: state.min,
            max: state.max,
            started_here: state.optional_at == Some(position),
        }
    }
}

impl Visited {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `quantifier` was entered at `position` by an
    /// alternative of match `generation` with the given repetition table.
    ///
    /// Returns `false` if it was already entered with an equivalent table
    /// during the current step.
    pub fn insert(
        &mut self,
        generation: u64,
        quantifier: QuantifierId,
        table: &RepetitionTable,
        position: usize,
    ) -> bool {
        let key = table
            .iter()
            .map(|state| Remaining::new(state, position))
            .collect();

        self.seen.insert((generation, quantifier, key))
    }

    /// Removes all the entries, must be called at the start of every
    /// zero-width step.
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
