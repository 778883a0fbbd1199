/*! Character classifiers used by one-width matchers.

These follow the rules of ECMAScript regular expressions without the `u`
flag: `\d` and `\w` are ASCII-only, `\s` covers the Unicode white space and
line terminator characters, and case-insensitive comparisons work on the
canonicalized (upper case) form of each character.
*/

/// Returns true if `c` is a line terminator (`\n`, `\r`, U+2028 or U+2029).
#[inline]
pub(crate) fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Returns true if `c` is matched by `\d`.
#[inline]
pub(crate) fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Returns true if `c` is matched by `\w`.
#[inline]
pub(crate) fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns true if `c` is matched by `\s`.
pub(crate) fn is_space(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t'
            | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Returns the canonical form of `c` for case-insensitive comparisons.
///
/// The canonical form is the upper case version of the character, except
/// when upper-casing produces more than one character, or when it would map
/// a non-ASCII character onto an ASCII one (e.g: U+017F LATIN SMALL LETTER
/// LONG S into `S`). In those cases the character is left untouched.
pub(crate) fn canonicalize(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) if c.is_ascii() || !u.is_ascii() => u,
        _ => c,
    }
}
