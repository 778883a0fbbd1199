/*! A streaming regular expression engine that never backtracks.

Patterns use JavaScript syntax and semantics: leftmost match, earlier
alternatives preferred over later ones, greedy and lazy quantifiers, and
capturing groups that report the last iteration they matched. Instead of
backtracking, the engine simulates every alternative at the same time,
one input character at a time, so the input can be any stream of
characters: a string, an iterator, an asynchronous stream, or a stream of
chunks. The input is read only once, and only the part of it that can
still be part of a match is kept in memory.

# Example

```rust
use regex_stream::Pattern;

let pattern = Pattern::new(r"(\d+)-(\d+)", "g").unwrap();

let matches: Vec<_> = pattern.exec_global("1-2, 30-40".chars()).collect();

assert_eq!(matches.len(), 2);
assert_eq!(matches[1][2].as_deref(), Some("40"));
```

Asynchronous input is supported through [`futures::Stream`], see the
[`stream`] module.

# Results

Each match is reported as a [`Captures`] vector, where the item at index 0
is the whole match and the item at index `n` is the text matched by the
`n`-th capturing group, or `None` if the group didn't participate in the
match.
*/

pub use api::exec;
pub use api::exec_global;
pub use api::test;
pub use api::Matches;

pub use engine::Engine;
pub use engine::EngineState;

pub use errors::EngineError;
pub use errors::Error;

pub use flags::Flags;

pub mod ast;
pub mod stream;

mod api;
mod chars;
mod compiler;
mod engine;
mod errors;
mod flags;
mod parser;
mod state;

#[cfg(test)]
mod tests;

use compiler::{Compiler, Program};

/// The result of a match: the whole match followed by one item per
/// capturing group.
pub type Captures = Vec<Option<String>>;

/// A compiled pattern.
///
/// Patterns are immutable, the same pattern can be used by any number of
/// [`Engine`]s at the same time.
#[derive(Debug)]
pub struct Pattern {
    source: String,
    flags: Flags,
    program: Program,
}

impl Pattern {
    /// Compiles `source` with the flags in `flags`, a string like `"gi"`.
    pub fn new(source: &str, flags: &str) -> Result<Self, Error> {
        Self::with_flags(source, flags.parse()?)
    }

    /// Compiles `source` with the given flags.
    pub fn with_flags(source: &str, flags: Flags) -> Result<Self, Error> {
        let ast = parser::parse(source)?;
        let program = Compiler::new(flags).compile(&ast)?;
        Ok(Self { source: source.to_string(), flags, program })
    }

    /// Compiles a pattern from an already built AST.
    ///
    /// The AST doesn't need to come from this crate's parser, so it can
    /// contain constructs that are not supported, which are reported as
    /// errors. [`Pattern::source`] returns an empty string for patterns
    /// created this way.
    pub fn from_ast(ast: &ast::Pattern, flags: Flags) -> Result<Self, Error> {
        let program = Compiler::new(flags).compile(ast)?;
        Ok(Self { source: String::new(), flags, program })
    }

    /// Returns the source of the pattern.
    #[inline]
    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    /// Returns the flags the pattern was compiled with.
    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Returns the length of the [`Captures`] produced by the pattern,
    /// which is the number of capturing groups plus one.
    #[inline]
    pub fn captures_len(&self) -> usize {
        self.program.groups()
    }

    /// Returns the first match in `input`.
    ///
    /// Equivalent to [`exec`].
    pub fn exec<I>(&self, input: I) -> Option<Captures>
    where
        I: IntoIterator<Item = char>,
    {
        exec(self, input)
    }

    /// Returns true if `input` contains a match.
    ///
    /// Equivalent to [`test`].
    pub fn test<I>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = char>,
    {
        test(self, input)
    }

    /// Returns an iterator over the matches in `input`.
    ///
    /// Equivalent to [`exec_global`].
    pub fn exec_global<I>(&self, input: I) -> Matches<'_, I::IntoIter>
    where
        I: IntoIterator<Item = char>,
    {
        exec_global(self, input)
    }

    #[inline]
    pub(crate) fn program(&self) -> &Program {
        &self.program
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// Compiles `source` with the flags in `flags`.
///
/// Equivalent to [`Pattern::new`].
pub fn parse(source: &str, flags: &str) -> Result<Pattern, Error> {
    Pattern::new(source, flags)
}
