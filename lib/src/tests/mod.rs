/*! End-to-end tests. */
use std::cell::Cell;
use std::rc::Rc;

use futures::executor::block_on;
use futures::stream::{iter, Stream, StreamExt};
use pretty_assertions::assert_eq;

use crate::{ast, stream, Captures, Error, Flags, Pattern};

fn captures(groups: &[Option<&str>]) -> Captures {
    groups.iter().map(|g| g.map(String::from)).collect()
}

fn found(groups: &[Option<&str>]) -> Option<Captures> {
    Some(captures(groups))
}

/// Results for a pattern without capturing groups.
fn texts(matches: &[&str]) -> Vec<Captures> {
    matches.iter().map(|m| vec![Some(m.to_string())]).collect()
}

/// Splits `input` in chunks of `size` characters.
fn chunks(input: &str, size: usize) -> impl Stream<Item = Vec<char>> + Unpin {
    let chars: Vec<char> = input.chars().collect();
    iter(chars.chunks(size).map(<[char]>::to_vec).collect::<Vec<_>>())
}

/// Checks the first match of a pattern in some input, using every kind of
/// input.
macro_rules! assert_exec {
    ($pattern:expr, $input:expr, $expected:expr) => {{
        assert_exec!($pattern, "", $input, $expected)
    }};
    ($pattern:expr, $flags:expr, $input:expr, $expected:expr) => {{
        let pattern = Pattern::new($pattern, $flags).unwrap();
        let expected: Option<Captures> = $expected;

        assert_eq!(
            pattern.exec($input.chars()),
            expected,
            "\n\n/{}/ on {:?}",
            $pattern,
            $input
        );

        assert_eq!(
            block_on(stream::exec(&pattern, iter($input.chars()))),
            expected,
            "\n\n/{}/ on async {:?}",
            $pattern,
            $input
        );

        assert_eq!(
            block_on(stream::chunked::exec(&pattern, chunks($input, 2))),
            expected,
            "\n\n/{}/ on chunked {:?}",
            $pattern,
            $input
        );
    }};
}

/// Checks all the matches of a pattern in some input, using every kind of
/// input and different chunk sizes.
macro_rules! assert_exec_global {
    ($pattern:expr, $flags:expr, $input:expr, $expected:expr) => {{
        let pattern = Pattern::new($pattern, $flags).unwrap();
        let expected: Vec<Captures> = $expected;

        assert_eq!(
            pattern.exec_global($input.chars()).collect::<Vec<_>>(),
            expected,
            "\n\n/{}/{} on {:?}",
            $pattern,
            $flags,
            $input
        );

        assert_eq!(
            block_on(
                stream::exec_global(&pattern, iter($input.chars()))
                    .collect::<Vec<_>>()
            ),
            expected,
            "\n\n/{}/{} on async {:?}",
            $pattern,
            $flags,
            $input
        );

        for size in 1..=3 {
            assert_eq!(
                block_on(
                    stream::chunked::exec_global(
                        &pattern,
                        chunks($input, size)
                    )
                    .collect::<Vec<_>>()
                ),
                expected,
                "\n\n/{}/{} on {:?} in chunks of {}",
                $pattern,
                $flags,
                $input,
                size
            );
        }
    }};
}

#[test]
fn empty() {
    assert_exec!("", "", found(&[Some("")]));
    assert_exec!("", "f", found(&[Some("")]));
    assert_exec!("()", "", found(&[Some(""), Some("")]));
    assert_exec!("()", "a", found(&[Some(""), Some("")]));
    assert_exec!("()*", "", found(&[Some(""), None]));
    assert_exec!("|", "", found(&[Some("")]));
    assert_exec!("a|", "a", found(&[Some("a")]));
    assert_exec!("|a", "a", found(&[Some("")]));
}

#[test]
fn literals() {
    assert_exec!("f", "", None);
    assert_exec!("f", "f", found(&[Some("f")]));
    assert_exec!("f", "ff", found(&[Some("f")]));
    assert_exec!("f", "of", found(&[Some("f")]));
    assert_exec!("foo", "", None);
    assert_exec!("foo", "foo", found(&[Some("foo")]));
    assert_exec!("foo", "food", found(&[Some("foo")]));
    assert_exec!("foo", "ffoo", found(&[Some("foo")]));
    assert_exec!(r"\.", "", None);
    assert_exec!(r"\.", ".", found(&[Some(".")]));
    assert_exec!(r"\.", "f", None);
}

#[test]
fn anchors() {
    assert_exec!("^f", "f", found(&[Some("f")]));
    assert_exec!("^f", "ff", found(&[Some("f")]));
    assert_exec!("^f", "of", None);
    assert_exec!("^f", "\rf", None);
    assert_exec!("f$", "f", found(&[Some("f")]));
    assert_exec!("f$", "fo", None);
    assert_exec!("f$", "of", found(&[Some("f")]));
    assert_exec!("^f|o", "of", found(&[Some("o")]));
}

#[test]
fn multiline() {
    assert_exec!("^f", "m", "f", found(&[Some("f")]));
    assert_exec!("^f", "m", "of", None);
    assert_exec!("^f", "m", "\rf", found(&[Some("f")]));
    assert_exec!("^f", "m", "\rof", None);
    assert_exec!("^f", "m", "o\u{2028}f", found(&[Some("f")]));
    assert_exec!("f$", "m", "f", found(&[Some("f")]));
    assert_exec!("f$", "m", "fo", None);
    assert_exec!("f$", "m", "\rf", found(&[Some("f")]));
    assert_exec!("f$", "m", "\rfo", None);
    assert_exec!("f$", "m", "f\no", found(&[Some("f")]));
}

#[test]
fn dot() {
    assert_exec!("f.o", "", None);
    assert_exec!("f.o", "foo", found(&[Some("foo")]));
    assert_exec!("f.o", "f\no", None);
    assert_exec!("f.o", "food", found(&[Some("foo")]));
    assert_exec!("f.o", "foof", found(&[Some("foo")]));
    assert_exec!(".*", "", found(&[Some("")]));
    assert_exec!(".*", "f", found(&[Some("f")]));
    assert_exec!(".*", "foo", found(&[Some("foo")]));
    assert_exec!(".*", "a\nb", found(&[Some("a")]));
    assert_exec!(r".*\.", ".", found(&[Some(".")]));
    assert_exec!(r".*\.", "..", found(&[Some("..")]));
    assert_exec!(".*x", "", None);
    assert_exec!(".*x", "a", None);
    assert_exec!(".*x", "x", found(&[Some("x")]));
    assert_exec!(".*x", "ax", found(&[Some("ax")]));
}

#[test]
fn dot_all() {
    assert_exec!("f.o", "s", "", None);
    assert_exec!("f.o", "s", "foo", found(&[Some("foo")]));
    assert_exec!("f.o", "s", "f\no", found(&[Some("f\no")]));
    assert_exec!("f.o", "s", "food", found(&[Some("foo")]));
    assert_exec!(".*", "s", "a\nb\nc", found(&[Some("a\nb\nc")]));
    assert_exec!(".*", "s", "\n\n\n", found(&[Some("\n\n\n")]));
    assert_exec!(".*", "s", "\r\n\r\n", found(&[Some("\r\n\r\n")]));
}

#[test]
fn alternatives() {
    assert_exec!("a|ab", "ab", found(&[Some("a")]));
    assert_exec!("a|ab", "a", found(&[Some("a")]));
    assert_exec!("ab|a", "ab", found(&[Some("ab")]));
    assert_exec!("ab|a", "a", found(&[Some("a")]));
    assert_exec!("b|ab", "ab", found(&[Some("ab")]));
    assert_exec!(
        "(a|ab)(c|bcd)(d*)",
        "abcd",
        found(&[Some("abcd"), Some("a"), Some("bcd"), Some("")])
    );
    assert_exec!("(?:ab|a)b{2}", "abb", found(&[Some("abb")]));
}

#[test]
fn capturing_groups() {
    assert_exec!("(ab)", "ab", found(&[Some("ab"), Some("ab")]));
    assert_exec!("(ab)", "a", None);
    let ab = found(&[Some("ab"), Some("a"), Some("b")]);
    assert_exec!("(a)(b)", "ab", ab.clone());
    assert_exec!("(a)(b)", "aab", ab);
    assert_exec!("(foo)", "", None);
    assert_exec!("(foo)", "foo", found(&[Some("foo"), Some("foo")]));
    assert_exec!("(foo)", "food", found(&[Some("foo"), Some("foo")]));
    assert_exec!("(foo)", "foof", found(&[Some("foo"), Some("foo")]));
    assert_exec!("(foo)", "ffoo", found(&[Some("foo"), Some("foo")]));
    assert_exec!("(a)|", "a", found(&[Some("a"), Some("a")]));
    assert_exec!("(a)|", "b", found(&[Some(""), None]));
    assert_exec!(
        "(a(bc|b))c",
        "abc",
        found(&[Some("abc"), Some("ab"), Some("b")])
    );
    assert_exec!("(a)?", "", found(&[Some(""), None]));
    assert_exec!("(a)?", "a", found(&[Some("a"), Some("a")]));
}

#[test]
fn quantifiers() {
    assert_exec!("(ab)+", "", None);
    assert_exec!("(ab)+", "ab", found(&[Some("ab"), Some("ab")]));
    assert_exec!("(ab)+", "aba", found(&[Some("ab"), Some("ab")]));
    assert_exec!("(ab)+", "abab", found(&[Some("abab"), Some("ab")]));
    assert_exec!("f{1,2}", "", None);
    assert_exec!("f{1,2}", "f", found(&[Some("f")]));
    assert_exec!("f{1,2}", "ff", found(&[Some("ff")]));
    assert_exec!("f{1,2}", "fff", found(&[Some("ff")]));
    assert_exec!("a{2}", "aaa", found(&[Some("aa")]));
    assert_exec!("a{2,}", "aaaa", found(&[Some("aaaa")]));
    assert_exec!("a{2,}", "a", None);
    assert_exec!("(?:a{2})+", "aaaaa", found(&[Some("aaaa")]));
    assert_exec!("(?:a{2}|b)+", "aabaa", found(&[Some("aabaa")]));
}

#[test]
fn lazy_quantifiers() {
    assert_exec!("a+?", "aaa", found(&[Some("a")]));
    assert_exec!("a*?", "aaa", found(&[Some("")]));
    assert_exec!("a*?b", "aab", found(&[Some("aab")]));
    assert_exec!("a{2,3}?", "aaa", found(&[Some("aa")]));
    assert_exec!(
        "(a+?)(a*)",
        "aaa",
        found(&[Some("aaa"), Some("a"), Some("aa")])
    );
}

#[test]
fn last_iteration_wins() {
    assert_exec!("(ab|a)+", "aab", found(&[Some("aab"), Some("ab")]));
    assert_exec!("(ab|a)+", "aba", found(&[Some("aba"), Some("a")]));
    assert_exec!("(ab|a)+", "abc", found(&[Some("ab"), Some("ab")]));
    assert_exec!("(f{1,2})*", "f", found(&[Some("f"), Some("f")]));
    assert_exec!("(f{1,2})*", "ff", found(&[Some("ff"), Some("ff")]));
    assert_exec!("(f{1,2})*", "fff", found(&[Some("fff"), Some("f")]));
    assert_exec!("(f{1,2})*", "ffff", found(&[Some("ffff"), Some("ff")]));
    assert_exec!(
        "(h{1,2}a)*",
        "hahaha",
        found(&[Some("hahaha"), Some("ha")])
    );
    // Groups that didn't match in the last iteration are reset.
    assert_exec!("(?:(a)|b)+", "ab", found(&[Some("ab"), None]));
    assert_exec!(
        "(?:(a)|(b))+",
        "ab",
        found(&[Some("ab"), None, Some("b")])
    );
}

#[test]
fn empty_iterations() {
    assert_exec!("(.*)*", "", found(&[Some(""), None]));
    assert_exec!("(.*)*", "f", found(&[Some("f"), Some("f")]));
    assert_exec!("(a*)+", "b", found(&[Some(""), Some("")]));
    assert_exec!("(?:a*)*b", "aab", found(&[Some("aab")]));
    assert_exec!("(a|)*", "aa", found(&[Some("aa"), Some("a")]));
}

#[test]
fn character_sets() {
    for c in ["0", "1", "9", "a", "b", "z", "A", "B", "Z", "_"] {
        assert_exec!(r"\w", c, found(&[Some(c)]));
        assert_exec!(r"\W", c, None);
    }

    assert_exec!(r"\w", " ", None);
    assert_exec!(r"\W", " ", found(&[Some(" ")]));

    for c in ["0", "1", "9"] {
        assert_exec!(r"\d", c, found(&[Some(c)]));
        assert_exec!(r"\D", c, None);
    }

    assert_exec!(r"\d", "d", None);
    assert_exec!(r"\D", "f", found(&[Some("f")]));
    assert_exec!(r"\s", "s", None);
    assert_exec!(r"\s", " ", found(&[Some(" ")]));
    assert_exec!(r"\s", "\u{2028}", found(&[Some("\u{2028}")]));
    assert_exec!(r"\s", "\u{feff}", found(&[Some("\u{feff}")]));
    assert_exec!(r"\S", "f", found(&[Some("f")]));
    assert_exec!(r"\S", " ", None);
}

#[test]
fn character_classes() {
    assert_exec!("[a-z]", "a", found(&[Some("a")]));
    assert_exec!("[a-z]", "b", found(&[Some("b")]));
    assert_exec!("[a-z]", "z", found(&[Some("z")]));
    assert_exec!("[a-z]", " ", None);
    assert_exec!("[a-z]", "A", None);
    assert_exec!("[^a-z]", "aB", found(&[Some("B")]));
    assert_exec!(r"[\d_]+", "a1_2b", found(&[Some("1_2")]));
    assert_exec!(r"[^\s]+", "  ab ", found(&[Some("ab")]));
}

#[test]
fn word_boundaries() {
    assert_exec!(r"\b", "", None);
    assert_exec!(r"\b", " ", None);
    assert_exec!(r"\b", "f", found(&[Some("")]));
    assert_exec!(r"\bf\b", "f", found(&[Some("f")]));
    assert_exec!(r"\bf\b", " f ", found(&[Some("f")]));
    assert_exec!(r"\bf\b", "ofo", None);
    assert_exec!(r"a\Bb", "ab", found(&[Some("ab")]));
    assert_exec!(r"a\Bb", "a b", None);
}

#[test]
fn ignore_case() {
    assert_exec!("hello", "i", "HeLLo", found(&[Some("HeLLo")]));
    assert_exec!("[a-c]+", "i", "xAbC", found(&[Some("AbC")]));
    assert_exec!("[^a-c]", "i", "Ad", found(&[Some("d")]));
    assert_exec!("é", "i", "É", found(&[Some("É")]));
    assert_exec!("σ", "i", "ς", found(&[Some("ς")]));
    assert_exec!("[σ]", "i", "ς", found(&[Some("ς")]));
    assert_exec!("[ǅ]+", "i", "ǄǆǅDZ", found(&[Some("Ǆǆǅ")]));
    assert_exec!("[^σ]", "i", "ςΣx", found(&[Some("x")]));
    assert_exec!("[σ]", "", "ς", None);
    assert_exec!("a", "", "A", None);
}

#[test]
fn sticky() {
    assert_exec!("a", "y", "ba", None);
    assert_exec!("a", "y", "ab", found(&[Some("a")]));
    assert_exec_global!("a", "gy", "aaba", texts(&["a", "a"]));
}

#[test]
fn exec_global() {
    assert_exec_global!(".", "", "abc", texts(&["a"]));
    assert_exec_global!(".", "g", "abc", texts(&["a", "b", "c"]));
    assert_exec_global!("ab|a", "g", "aa", texts(&["a", "a"]));
    assert_exec_global!("abb|a", "g", "aa", texts(&["a", "a"]));
    assert_exec_global!("a|ab", "g", "abab", texts(&["a", "a"]));
    assert_exec_global!("x", "g", "abc", texts(&[]));
    assert_exec_global!(
        r"(\w+)=(\d+)",
        "g",
        "a=1, bc=23",
        vec![
            captures(&[Some("a=1"), Some("a"), Some("1")]),
            captures(&[Some("bc=23"), Some("bc"), Some("23")]),
        ]
    );
    assert_exec_global!(r"^\w", "gm", "ab\ncd", texts(&["a", "c"]));
    assert_exec_global!("<.+?>", "g", "<a><b>", texts(&["<a>", "<b>"]));
}

#[test]
fn exec_global_empty_matches() {
    assert_exec_global!(".*", "g", "abc", texts(&["abc", ""]));
    assert_exec_global!(".*", "g", "", texts(&[""]));
    assert_exec_global!("a*", "g", "baaa", texts(&["", "aaa", ""]));
    assert_exec_global!("", "g", "ab", texts(&["", "", ""]));
    assert_exec_global!(r"\b", "g", "ab cd", texts(&["", "", "", ""]));
}

#[test]
fn chunk_invariance() {
    let cases = [
        ("(a|ab)(c|bcd)(d*)", "g", "abcdabcabcd"),
        (r"\b\w+\b", "g", "one two  three"),
        ("(?:(a)|(b))+", "g", "abba-ab"),
        ("x*", "g", "axxbx"),
        ("^.*$", "gm", "first\nsecond\r\nthird"),
    ];

    for (source, flags, input) in cases {
        let pattern = Pattern::new(source, flags).unwrap();
        let expected: Vec<_> = pattern.exec_global(input.chars()).collect();

        assert!(!expected.is_empty());

        for size in 1..=input.len() {
            let results: Vec<_> = block_on(
                stream::chunked::exec_global(&pattern, chunks(input, size))
                    .collect(),
            );
            assert_eq!(
                results, expected,
                "/{}/ in chunks of {}",
                source, size
            );
        }
    }
}

#[test]
fn chunks_of_str() {
    let pattern = Pattern::new("lo w", "").unwrap();
    let chunks = iter(["hel", "lo", " world"].map(str::chars));

    assert_eq!(
        block_on(stream::chunked::exec(&pattern, chunks)),
        found(&[Some("lo w")])
    );

    let chunks = iter(["hel", "lo"].map(str::chars));
    assert!(!block_on(stream::chunked::test(&pattern, chunks)));
}

#[test]
fn test() {
    let pattern = Pattern::new(r"\d", "").unwrap();

    assert!(pattern.test("a1".chars()));
    assert!(!pattern.test("ab".chars()));
    assert!(crate::test(&pattern, "1".chars()));
    assert!(block_on(stream::test(&pattern, iter("a1".chars()))));
    assert!(!block_on(stream::test(&pattern, iter("".chars()))));
}

/// An iterator that records when it is dropped.
struct Tracked<I> {
    inner: I,
    dropped: Rc<Cell<bool>>,
}

impl<I> Tracked<I> {
    fn new(inner: I) -> (Self, Rc<Cell<bool>>) {
        let dropped = Rc::new(Cell::new(false));
        (Self { inner, dropped: dropped.clone() }, dropped)
    }
}

impl<I: Iterator> Iterator for Tracked<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<I> Drop for Tracked<I> {
    fn drop(&mut self) {
        self.dropped.set(true);
    }
}

#[test]
fn input_released() {
    // The input is infinite, but the match is found after reading two
    // characters and the input is released right away.
    let pattern = Pattern::new("a", "").unwrap();
    let (input, dropped) = Tracked::new(std::iter::repeat('a'));
    let mut matches = pattern.exec_global(input);

    assert_eq!(matches.next(), found(&[Some("a")]));
    assert!(dropped.get());
    assert_eq!(matches.next(), None);

    // With a global pattern the input is released when the iterator is
    // dropped.
    let pattern = Pattern::new(".", "g").unwrap();
    let (input, dropped) = Tracked::new(std::iter::repeat('x'));
    let matches = pattern.exec_global(input);

    assert_eq!(matches.take(5).count(), 5);
    assert!(dropped.get());

    // And when the input ends.
    let (input, dropped) = Tracked::new("xy".chars());
    let mut matches = pattern.exec_global(input);

    assert_eq!(matches.by_ref().count(), 2);
    assert!(dropped.get());
}

#[test]
fn stream_released() {
    let pattern = Pattern::new(".", "g").unwrap();
    let (input, dropped) = Tracked::new(std::iter::repeat('x'));

    let results: Vec<_> =
        block_on(stream::exec_global(&pattern, iter(input)).take(3).collect());

    assert_eq!(results, texts(&["x", "x", "x"]));
    assert!(dropped.get());

    let (input, dropped) = Tracked::new(std::iter::repeat('x'));
    let chunks = iter(input.map(|c| vec![c, c]));

    assert!(block_on(stream::chunked::test(&pattern, chunks)));
    assert!(dropped.get());
}

#[test]
fn pattern() {
    let pattern = Pattern::new(r"(a)(b(c))?", "gi").unwrap();

    assert_eq!(pattern.source(), r"(a)(b(c))?");
    assert_eq!(
        pattern.flags(),
        Flags::default().global(true).ignore_case(true)
    );
    assert_eq!(pattern.captures_len(), 4);
    assert_eq!(pattern.to_string(), r"/(a)(b(c))?/gi");

    let pattern = crate::parse("x", "").unwrap();
    assert_eq!(pattern.captures_len(), 1);
    assert_eq!(crate::exec(&pattern, "axb".chars()), found(&[Some("x")]));
}

#[test]
fn pattern_from_ast() {
    let tree = ast::Pattern {
        alternatives: vec![ast::Alternative {
            elements: vec![
                ast::Element::Character('a'),
                ast::Element::Quantifier(ast::Quantifier {
                    min: 0,
                    max: None,
                    greedy: true,
                    element: Box::new(ast::Element::CharacterSet(
                        ast::CharacterSet {
                            kind: ast::CharacterSetKind::Digit,
                            negate: false,
                        },
                    )),
                }),
            ],
        }],
    };

    let pattern = Pattern::from_ast(&tree, Flags::default()).unwrap();

    assert_eq!(pattern.source(), "");
    assert_eq!(pattern.exec("xa12b".chars()), found(&[Some("a12")]));

    let tree = ast::Pattern {
        alternatives: vec![ast::Alternative {
            elements: vec![ast::Element::Assertion(
                ast::Assertion::Lookahead {
                    negate: true,
                    alternatives: vec![],
                },
            )],
        }],
    };

    assert_eq!(
        Pattern::from_ast(&tree, Flags::default()).err(),
        Some(Error::Lookahead)
    );
}

#[test]
fn errors() {
    assert!(matches!(
        Pattern::new("(a", ""),
        Err(Error::SyntaxError { .. })
    ));
    assert!(matches!(
        Pattern::new("a{2,1}", ""),
        Err(Error::SyntaxError { .. })
    ));
    assert_eq!(
        Pattern::new("a", "gg").err(),
        Some(Error::DuplicateFlag('g'))
    );
    assert_eq!(Pattern::new("a", "q").err(), Some(Error::InvalidFlag('q')));
    assert_eq!(Pattern::new("a", "u").err(), Some(Error::UnicodeFlag));
    assert_eq!(Pattern::new(r"(a)\1", "").err(), Some(Error::Backreference));
    assert_eq!(Pattern::new("(?<=a)b", "").err(), Some(Error::Lookbehind));
    assert_eq!(
        Pattern::new("[]a]", "").err(),
        Some(Error::Unsupported("empty character classes"))
    );
    assert_eq!(
        Pattern::new(r"\cJ", "m").err(),
        Some(Error::Unsupported("control escapes"))
    );
    assert_eq!(
        Error::Unsupported("inline flags").to_string(),
        "inline flags are not supported"
    );
}

#[test]
fn shared_pattern() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let pattern = Pattern::new(r"\d+", "g").unwrap();
    assert_send_sync(&pattern);

    let (a, b) = std::thread::scope(|s| {
        let a = s.spawn(|| pattern.exec_global("1 22".chars()).count());
        let b = s.spawn(|| pattern.exec_global("333 4 55".chars()).count());
        (a.join().unwrap(), b.join().unwrap())
    });

    assert_eq!((a, b), (2, 3));
}
