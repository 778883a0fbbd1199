use regex_syntax::ast::Span;
use thiserror::Error;

/// Errors returned while parsing or compiling a pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pattern is not a syntactically valid regular expression.
    #[error("syntax error: {msg}")]
    SyntaxError { msg: String, span: Span },

    /// The flags string contains a character that is not a valid flag.
    #[error("invalid flag `{0}`")]
    InvalidFlag(char),

    /// The flags string contains the same flag more than once.
    #[error("duplicate flag `{0}`")]
    DuplicateFlag(char),

    #[error("backreferences are not supported")]
    Backreference,

    #[error("lookahead assertions are not supported")]
    Lookahead,

    #[error("lookbehind assertions are not supported")]
    Lookbehind,

    #[error("named capture groups are not supported")]
    NamedGroup,

    #[error("the unicode flag (`u`) is not supported")]
    UnicodeFlag,

    /// A quantifier like `{3,2}`, where the minimum is greater than the
    /// maximum.
    #[error("numbers out of order in {{{min},{max}}} quantifier")]
    QuantifierOutOfOrder { min: u32, max: u32 },

    /// A character class range like `[z-a]`, where the first character
    /// comes after the last one.
    #[error("range out of order in character class: {min}-{max}")]
    ClassRangeOutOfOrder { min: char, max: char },

    /// The pattern uses syntax that has no meaning for this engine.
    #[error("{0} are not supported")]
    Unsupported(&'static str),
}

/// Errors returned when an [`crate::Engine`] is driven out of order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// A settle step was requested without feeding new input first.
    #[error("engine is starved, feed the next character first")]
    Starved,

    /// A consume step was requested while zero-width matchers are still
    /// pending, or when there is no character to consume.
    #[error("zero-width matchers are pending, settle the engine first")]
    PendingZeroWidth,

    /// New input was fed before the previous one was consumed.
    #[error("previous input has not been consumed yet")]
    AlreadyFed,

    /// The engine has no live alternatives left.
    #[error("engine is exhausted")]
    Exhausted,
}
