use regex_syntax as re;
use regex_syntax::ast::{
    Ast, AssertionKind, ClassPerlKind, ClassSet, ClassSetItem, GroupKind,
    RepetitionKind, RepetitionRange,
};

use crate::ast;
use crate::errors::Error;

/// Parses the source of a pattern and returns its AST.
///
/// The parsing itself is done by the [`regex-syntax`][1] crate, the result
/// is then validated and converted into an [`ast::Pattern`]. Constructs that
/// `regex-syntax` accepts but have no meaning for this engine, like inline
/// flags or POSIX classes, are rejected during validation.
///
/// [1]: https://docs.rs/regex-syntax
pub(crate) fn parse(source: &str) -> Result<ast::Pattern, Error> {
    reject_divergent_syntax(source)?;

    let mut parser = re::ast::parse::ParserBuilder::new().build();

    let ast = parser.parse(source).map_err(|err| match err.kind() {
        re::ast::ErrorKind::UnsupportedBackreference => Error::Backreference,
        re::ast::ErrorKind::UnsupportedLookAround => {
            if source[err.span().start.offset..].starts_with("(?<") {
                Error::Lookbehind
            } else {
                Error::Lookahead
            }
        }
        kind => {
            Error::SyntaxError { msg: kind.to_string(), span: *err.span() }
        }
    })?;

    Validator::new().validate(&ast)?;

    Ok(ast::Pattern { alternatives: alternatives(&ast) })
}

/// Rejects the constructs that `regex-syntax` either fails to parse or
/// parses with a different meaning than ECMAScript does.
///
/// These are empty classes (`[]` never matches and `[^]` matches anything),
/// `\0`, control escapes like `\cJ`, `\a` (the letter in ECMAScript, a bell
/// in `regex-syntax`) and `{,n}` (literal text in ECMAScript, a quantifier
/// in `regex-syntax`).
fn reject_divergent_syntax(source: &str) -> Result<(), Error> {
    let mut chars = source.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('0') => {
                    return Err(Error::Unsupported("null character escapes"))
                }
                Some('c') => {
                    return Err(Error::Unsupported("control escapes"))
                }
                Some('a') => return Err(Error::Unsupported("bell escapes")),
                _ => {}
            },
            '[' if !in_class => {
                in_class = true;
                chars.next_if_eq(&'^');
                if chars.peek() == Some(&']') {
                    return Err(Error::Unsupported("empty character classes"));
                }
            }
            ']' if in_class => in_class = false,
            '{' if !in_class && chars.peek() == Some(&',') => {
                return Err(Error::Unsupported(
                    "quantifiers without a lower bound",
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

/// Returns the alternatives in `ast`. Anything other than an alternation
/// is a single alternative.
fn alternatives(ast: &Ast) -> Vec<ast::Alternative> {
    match ast {
        Ast::Alternation(alternation) => {
            alternation.asts.iter().map(alternative).collect()
        }
        _ => vec![alternative(ast)],
    }
}

fn alternative(ast: &Ast) -> ast::Alternative {
    let elements = match ast {
        Ast::Concat(concat) => {
            concat.asts.iter().filter_map(element).collect()
        }
        _ => element(ast).into_iter().collect(),
    };
    ast::Alternative { elements }
}

/// Converts a single node. Returns `None` for nodes that match the empty
/// string without doing anything, like an empty alternative.
fn element(ast: &Ast) -> Option<ast::Element> {
    let element = match ast {
        Ast::Empty(_) => return None,
        Ast::Literal(lit) => ast::Element::Character(lit.c),
        Ast::Dot(_) => ast::Element::CharacterSet(ast::CharacterSet {
            kind: ast::CharacterSetKind::Any,
            negate: false,
        }),
        Ast::Assertion(assertion) => {
            ast::Element::Assertion(match assertion.kind {
                AssertionKind::StartLine => ast::Assertion::Start,
                AssertionKind::EndLine => ast::Assertion::End,
                AssertionKind::WordBoundary => {
                    ast::Assertion::Word { negate: false }
                }
                AssertionKind::NotWordBoundary => {
                    ast::Assertion::Word { negate: true }
                }
                _ => unreachable!("assertion rejected by the validator"),
            })
        }
        Ast::ClassPerl(class) => ast::Element::CharacterSet(
            perl_set(&class.kind, class.negated),
        ),
        Ast::ClassUnicode(class) => {
            ast::Element::CharacterSet(ast::CharacterSet {
                kind: ast::CharacterSetKind::Property,
                negate: class.negated,
            })
        }
        Ast::ClassBracketed(class) => {
            let mut elements = Vec::new();
            if let ClassSet::Item(item) = &class.kind {
                class_items(item, &mut elements);
            }
            ast::Element::CharacterClass(ast::CharacterClass {
                negate: class.negated,
                elements,
            })
        }
        Ast::Repetition(rep) => {
            let (min, max) = match &rep.op.kind {
                RepetitionKind::ZeroOrOne => (0, Some(1)),
                RepetitionKind::ZeroOrMore => (0, None),
                RepetitionKind::OneOrMore => (1, None),
                RepetitionKind::Range(RepetitionRange::Exactly(n)) => {
                    (*n, Some(*n))
                }
                RepetitionKind::Range(RepetitionRange::AtLeast(n)) => {
                    (*n, None)
                }
                RepetitionKind::Range(RepetitionRange::Bounded(m, n)) => {
                    (*m, Some(*n))
                }
            };
            // A repeated empty node still needs a quantifier, an empty
            // non-capturing group stands for it.
            let inner = element(&rep.ast).unwrap_or(ast::Element::Group(
                ast::Group { alternatives: vec![ast::Alternative::default()] },
            ));
            ast::Element::Quantifier(ast::Quantifier {
                min,
                max,
                greedy: rep.greedy,
                element: Box::new(inner),
            })
        }
        Ast::Group(group) => {
            let alternatives = alternatives(&group.ast);
            match &group.kind {
                GroupKind::CaptureIndex(_) => {
                    ast::Element::CapturingGroup(ast::CapturingGroup {
                        name: None,
                        alternatives,
                    })
                }
                GroupKind::CaptureName { name, .. } => {
                    ast::Element::CapturingGroup(ast::CapturingGroup {
                        name: Some(name.name.clone()),
                        alternatives,
                    })
                }
                GroupKind::NonCapturing(_) => {
                    ast::Element::Group(ast::Group { alternatives })
                }
            }
        }
        // Alternations and concatenations only appear as direct children
        // of a group or at the top level, but they are handled anyways.
        Ast::Alternation(_) | Ast::Concat(_) => {
            ast::Element::Group(ast::Group { alternatives: alternatives(ast) })
        }
        Ast::Flags(_) => unreachable!("flags rejected by the validator"),
    };
    Some(element)
}

fn perl_set(kind: &ClassPerlKind, negate: bool) -> ast::CharacterSet {
    let kind = match kind {
        ClassPerlKind::Digit => ast::CharacterSetKind::Digit,
        ClassPerlKind::Space => ast::CharacterSetKind::Space,
        ClassPerlKind::Word => ast::CharacterSetKind::Word,
    };
    ast::CharacterSet { kind, negate }
}

fn class_items(item: &ClassSetItem, elements: &mut Vec<ast::ClassElement>) {
    match item {
        ClassSetItem::Empty(_) => {}
        ClassSetItem::Literal(lit) => {
            elements.push(ast::ClassElement::Character(lit.c))
        }
        ClassSetItem::Range(range) => {
            elements.push(ast::ClassElement::Range(ast::CharacterClassRange {
                min: range.start.c,
                max: range.end.c,
            }))
        }
        ClassSetItem::Perl(class) => {
            let set = perl_set(&class.kind, class.negated);
            elements.push(ast::ClassElement::CharacterSet(set))
        }
        ClassSetItem::Unicode(class) => {
            elements.push(ast::ClassElement::CharacterSet(ast::CharacterSet {
                kind: ast::CharacterSetKind::Property,
                negate: class.negated,
            }))
        }
        ClassSetItem::Union(union) => {
            for item in &union.items {
                class_items(item, elements);
            }
        }
        ClassSetItem::Ascii(_) | ClassSetItem::Bracketed(_) => {
            unreachable!("class item rejected by the validator")
        }
    }
}

/// Rejects the parts of the `regex-syntax` grammar that don't exist in
/// the patterns accepted by this crate.
struct Validator {}

impl Validator {
    fn new() -> Self {
        Self {}
    }

    fn validate(&mut self, ast: &Ast) -> Result<(), Error> {
        re::ast::visit(ast, self)
    }
}

impl re::ast::Visitor for &mut Validator {
    type Output = ();
    type Err = Error;

    fn finish(self) -> Result<Self::Output, Self::Err> {
        Ok(())
    }

    fn visit_pre(&mut self, ast: &Ast) -> Result<(), Self::Err> {
        match ast {
            Ast::Flags(_) => Err(Error::Unsupported("inline flags")),
            Ast::Group(group) => match &group.kind {
                GroupKind::CaptureName { .. } => Err(Error::NamedGroup),
                GroupKind::NonCapturing(flags) if !flags.items.is_empty() => {
                    Err(Error::Unsupported("inline flags"))
                }
                _ => Ok(()),
            },
            Ast::Assertion(assertion) => match assertion.kind {
                AssertionKind::StartLine
                | AssertionKind::EndLine
                | AssertionKind::WordBoundary
                | AssertionKind::NotWordBoundary => Ok(()),
                _ => Err(Error::Unsupported(
                    "assertions other than `^`, `$`, `\\b` and `\\B`",
                )),
            },
            _ => Ok(()),
        }
    }

    fn visit_class_set_item_pre(
        &mut self,
        item: &ClassSetItem,
    ) -> Result<(), Self::Err> {
        match item {
            ClassSetItem::Ascii(_) => {
                Err(Error::Unsupported("POSIX character classes"))
            }
            ClassSetItem::Bracketed(_) => {
                Err(Error::Unsupported("nested character classes"))
            }
            _ => Ok(()),
        }
    }

    fn visit_class_set_binary_op_pre(
        &mut self,
        _op: &re::ast::ClassSetBinaryOp,
    ) -> Result<(), Self::Err> {
        Err(Error::Unsupported("character class set operations"))
    }
}
