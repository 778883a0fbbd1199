/*! Matching over asynchronous input.

The functions in this module mirror [`crate::exec`], [`crate::test`] and
[`crate::exec_global`], but take a [`Stream`] of characters instead of an
iterator. The [`chunked`] module takes a stream of chunks, where each chunk
is anything that can be iterated as characters, like a [`String`].

```
# use futures::executor::block_on;
# use futures::stream;
use regex_stream::{stream::exec, Pattern};

let pattern = Pattern::new("b+", "").unwrap();
let input = stream::iter("abbc".chars());

assert_eq!(
    block_on(exec(&pattern, input)),
    Some(vec![Some("bb".to_string())])
);
```

The result of matching a pattern never depends on how the input is split
in chunks, or on when those chunks arrive.
*/

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::ready;
use futures::stream::{FusedStream, Stream, StreamExt};

use crate::engine::{Engine, EngineState};
use crate::{Captures, Pattern};

/// Returns the first match of `pattern` in `input`.
pub async fn exec<S>(pattern: &Pattern, input: S) -> Option<Captures>
where
    S: Stream<Item = char> + Unpin,
{
    exec_global(pattern, input).next().await
}

/// Returns true if `pattern` matches somewhere in `input`.
pub async fn test<S>(pattern: &Pattern, input: S) -> bool
where
    S: Stream<Item = char> + Unpin,
{
    exec(pattern, input).await.is_some()
}

/// Returns a stream with the matches of `pattern` in `input`.
pub fn exec_global<S>(pattern: &Pattern, input: S) -> Matches<'_, S>
where
    S: Stream<Item = char> + Unpin,
{
    Matches {
        engine: Engine::new(pattern),
        input: Some(input),
        pending: VecDeque::new(),
    }
}

/// Stream that yields the matches of a pattern in the characters produced
/// by another stream.
///
/// This is the asynchronous counterpart of [`crate::Matches`]. The input
/// stream is dropped as soon as no more matches are possible, or when this
/// stream is dropped.
pub struct Matches<'p, S> {
    engine: Engine<'p>,
    input: Option<S>,
    pending: VecDeque<Captures>,
}

impl<'p, S> Stream for Matches<'p, S>
where
    S: Stream<Item = char> + Unpin,
{
    type Item = Captures;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if let Some(captures) = this.pending.pop_front() {
                return Poll::Ready(Some(captures));
            }

            let Some(input) = this.input.as_mut() else {
                return Poll::Ready(None);
            };

            let chr = ready!(input.poll_next_unpin(cx));

            this.pending.extend(this.engine.advance(chr));

            if chr.is_none() || this.engine.state() == EngineState::Exhausted
            {
                this.input = None;
            }
        }
    }
}

impl<'p, S> FusedStream for Matches<'p, S>
where
    S: Stream<Item = char> + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.input.is_none() && self.pending.is_empty()
    }
}

/// Matching over asynchronous streams of chunks.
///
/// ```
/// # use futures::executor::block_on;
/// # use futures::stream::{self, StreamExt};
/// use regex_stream::{stream::chunked, Pattern};
///
/// let pattern = Pattern::new(r"\w+", "g").unwrap();
/// let chunks = stream::iter(["hel", "lo wo", "rld"].map(|s| s.chars()));
///
/// let words: Vec<_> = block_on(
///     chunked::exec_global(&pattern, chunks)
///         .map(|captures| captures[0].clone().unwrap())
///         .collect(),
/// );
///
/// assert_eq!(words, ["hello", "world"]);
/// ```
pub mod chunked {
    use futures::stream::{self, Stream, StreamExt};

    use crate::{Captures, Pattern};

    /// Returns the first match of `pattern` in `chunks`.
    pub async fn exec<S>(pattern: &Pattern, chunks: S) -> Option<Captures>
    where
        S: Stream + Unpin,
        S::Item: IntoIterator<Item = char>,
    {
        super::exec(pattern, chars(chunks)).await
    }

    /// Returns true if `pattern` matches somewhere in `chunks`.
    pub async fn test<S>(pattern: &Pattern, chunks: S) -> bool
    where
        S: Stream + Unpin,
        S::Item: IntoIterator<Item = char>,
    {
        super::test(pattern, chars(chunks)).await
    }

    /// Returns a stream with the matches of `pattern` in `chunks`.
    pub fn exec_global<S>(
        pattern: &Pattern,
        chunks: S,
    ) -> super::Matches<'_, impl Stream<Item = char> + Unpin>
    where
        S: Stream + Unpin,
        S::Item: IntoIterator<Item = char>,
    {
        super::exec_global(pattern, chars(chunks))
    }

    /// Flattens a stream of chunks into a stream of characters.
    fn chars<S>(chunks: S) -> impl Stream<Item = char> + Unpin
    where
        S: Stream + Unpin,
        S::Item: IntoIterator<Item = char>,
    {
        chunks.flat_map(stream::iter)
    }
}
