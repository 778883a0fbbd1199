/*! Abstract syntax tree for patterns.

The compiler works on this tree rather than on the source text. Patterns
written as text are converted into this tree by the parser, but
the tree can also be built directly and compiled with
[`crate::Pattern::from_ast`].

```
# use regex_stream::ast::{self, *};
# use regex_stream::Flags;
// Equivalent to `(a|b)+`.
let tree = ast::Pattern {
    alternatives: vec![Alternative {
        elements: vec![Element::Quantifier(Quantifier {
            min: 1,
            max: None,
            greedy: true,
            element: Box::new(Element::CapturingGroup(CapturingGroup {
                name: None,
                alternatives: vec![
                    Alternative { elements: vec![Element::Character('a')] },
                    Alternative { elements: vec![Element::Character('b')] },
                ],
            })),
        })],
    }],
};

let pattern =
    regex_stream::Pattern::from_ast(&tree, Flags::default()).unwrap();
# let _ = pattern;
```
*/

/// The root of a pattern: one or more alternatives separated by `|`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub alternatives: Vec<Alternative>,
}

/// A sequence of elements that must match one after the other.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alternative {
    pub elements: Vec<Element>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    /// A non-capturing group, like `(?:a|b)`.
    Group(Group),
    /// A capturing group, like `(a|b)`.
    CapturingGroup(CapturingGroup),
    Assertion(Assertion),
    Quantifier(Quantifier),
    /// A bracketed character class, like `[a-z_]`.
    CharacterClass(CharacterClass),
    CharacterSet(CharacterSet),
    Character(char),
    /// A backreference, like `\1`.
    Backreference(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub alternatives: Vec<Alternative>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturingGroup {
    /// Name of the group, if it was declared like `(?<name>...)`.
    pub name: Option<String>,
    pub alternatives: Vec<Alternative>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Assertion {
    /// `^`
    Start,
    /// `$`
    End,
    /// `\b` or, when negated, `\B`.
    Word { negate: bool },
    /// `(?=...)` or, when negated, `(?!...)`.
    Lookahead { negate: bool, alternatives: Vec<Alternative> },
    /// `(?<=...)` or, when negated, `(?<!...)`.
    Lookbehind { negate: bool, alternatives: Vec<Alternative> },
}

/// Repeats an element between `min` and `max` times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quantifier {
    pub min: u32,
    /// Maximum number of repetitions, `None` means unbounded.
    pub max: Option<u32>,
    pub greedy: bool,
    pub element: Box<Element>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterClass {
    pub negate: bool,
    pub elements: Vec<ClassElement>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassElement {
    Character(char),
    Range(CharacterClassRange),
    CharacterSet(CharacterSet),
}

/// A range of characters within a class, like `a-z`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterClassRange {
    pub min: char,
    pub max: char,
}

/// A predefined set of characters, like `.`, `\d` or `\S`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterSet {
    pub kind: CharacterSetKind,
    pub negate: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterSetKind {
    /// `.`
    Any,
    /// `\d`
    Digit,
    /// `\s`
    Space,
    /// `\w`
    Word,
    /// A Unicode property escape, like `\p{Greek}`.
    Property,
}
