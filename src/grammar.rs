//! Productions of the language, written with [`crate::combinator`].
//!
//! ```text
//! program    = SOI definition* EOI
//! definition = name params "="? expr END      (fn)
//!            | name "=" expr END              (val)
//! expr       = (name | "(" expr ")") args
//!            | "if" expr "then" expr "else" expr
//!            | params "=>" expr
//!            | number | "()" | "false" | "true" | name | "(" expr ")"
//! params     = "(" ")" | "(" name ("," name)* ")"
//! args       = "(" ")" | "(" expr ("," expr)* ")"
//! name       = [a-z] [a-z_]*
//! number     = [0-9] ("_"? [0-9])*
//! END        = ";" | "\n" | EOI
//! ```
//!
//! Alternatives are ordered, so their order above is significant. Uids are drawn
//! from the [`UidGen`] carried as cursor state: a parameter takes one as soon as it
//! is parsed, a definition once it has been parsed completely.
use crate::{
    ast::{App, Body, Def, Expr, Ite, Lambda, Param, Program, UidGen},
    collections::OrderedTree,
    combinator::{
        atomic, char_range, end_of_input, end_of_statement, literal, many, option,
        start_of_input, Alternative, Sequence,
    },
    cursor::Cursor,
    error::SyntaxError,
    source::{Source, Span},
};

type Input<'src> = Cursor<'src, UidGen>;

/// Parses a whole program, drawing uids from `uids`.
pub fn parse_program(source: &dyn Source, uids: &mut UidGen) -> Result<Program, SyntaxError> {
    let mut cursor = Cursor::with_state(source, std::mem::take(uids));
    let parsed = program(&mut cursor);
    let location = cursor.location();
    *uids = cursor.into_state();

    match parsed {
        Some(defs) => {
            log::debug!("parsed {} definitions", defs.len());
            Ok(Program::new(defs))
        }
        None => Err(SyntaxError { location }),
    }
}

/// Runs `parser` and returns the span of what it consumed.
fn spanned<'src, X, T>(
    cursor: &mut Cursor<'src, X>,
    parser: impl FnOnce(&mut Cursor<'src, X>) -> Option<T>,
) -> Option<Span> {
    let start = cursor.location();
    parser(&mut *cursor)?;
    Some(Span::new(start, cursor.location()))
}

fn lowercase<X>(cursor: &mut Cursor<'_, X>) -> Option<u8> {
    char_range(cursor, b'a', b'z')
}

fn digit<X>(cursor: &mut Cursor<'_, X>) -> Option<u8> {
    char_range(cursor, b'0', b'9')
}

pub(crate) fn identifier<X>(cursor: &mut Cursor<'_, X>) -> Option<Span> {
    atomic(cursor, |c| {
        spanned(c, |c| {
            let mut seq = Sequence::new(c);
            seq.step(lowercase)?;
            seq.step(|c| {
                many(c, |c| {
                    Alternative::new(c)
                        .or(lowercase)
                        .or(|c| literal(c, "_").map(|()| b'_'))
                        .finish()
                })
            })
        })
    })
}

pub(crate) fn number<X>(cursor: &mut Cursor<'_, X>) -> Option<Span> {
    atomic(cursor, |c| {
        spanned(c, |c| {
            let mut seq = Sequence::new(c);
            seq.step(digit)?;
            seq.step(|c| {
                many(c, |c| {
                    let mut seq = Sequence::new(c);
                    seq.step(|c| option(c, |c| literal(c, "_")))?;
                    seq.step(digit)
                })
            })
        })
    })
}

/// `()` or a non-empty, comma separated list of `item` in parentheses.
fn parenthesized<'src, T>(
    cursor: &mut Input<'src>,
    mut item: impl FnMut(&mut Input<'src>) -> Option<T>,
) -> Option<Vec<T>> {
    Alternative::new(cursor)
        .or(|c| {
            let mut seq = Sequence::new(c);
            seq.step(|c| literal(c, "("))?;
            seq.step(|c| literal(c, ")"))?;
            Some(vec![])
        })
        .or(|c| {
            let mut seq = Sequence::new(c);
            seq.step(|c| literal(c, "("))?;
            let first = seq.step(&mut item)?;
            let rest = seq.step(|c| {
                many(c, |c| {
                    let mut seq = Sequence::new(c);
                    seq.step(|c| literal(c, ","))?;
                    seq.step(&mut item)
                })
            })?;
            seq.step(|c| literal(c, ")"))?;
            Some(std::iter::once(first).chain(rest).collect())
        })
        .finish()
}

fn param(cursor: &mut Input<'_>) -> Option<Param> {
    let name = identifier(cursor)?;
    let uid = cursor.state_mut().fresh();
    Some(Param { uid, name })
}

fn parameters(cursor: &mut Input<'_>) -> Option<OrderedTree<Param>> {
    parenthesized(cursor, param).map(OrderedTree::from_iter)
}

fn arguments(cursor: &mut Input<'_>) -> Option<Vec<Expr>> {
    parenthesized(cursor, expression)
}

pub(crate) fn expression(cursor: &mut Input<'_>) -> Option<Expr> {
    Alternative::new(cursor)
        // before `reference`, or `f(x)` would stop after `f`
        .or(application)
        .or(conditional)
        .or(lambda)
        .or(|c| number(c).map(Expr::Number))
        .or(|c| literal(c, "()").map(|()| Expr::Unit))
        .or(|c| literal(c, "false").map(|()| Expr::False))
        .or(|c| literal(c, "true").map(|()| Expr::True))
        .or(reference)
        .or(parenthesized_expression)
        .finish()
}

fn application(cursor: &mut Input<'_>) -> Option<Expr> {
    let mut seq = Sequence::new(cursor);
    let callee = seq.step(|c| {
        Alternative::new(c)
            .or(reference)
            .or(parenthesized_expression)
            .finish()
    })?;
    let args = seq.step(arguments)?;
    Some(Expr::App(Box::new(App { callee, args })))
}

fn conditional(cursor: &mut Input<'_>) -> Option<Expr> {
    let mut seq = Sequence::new(cursor);
    seq.step(|c| literal(c, "if"))?;
    let cond = seq.step(expression)?;
    seq.step(|c| literal(c, "then"))?;
    let then_branch = seq.step(expression)?;
    seq.step(|c| literal(c, "else"))?;
    let else_branch = seq.step(expression)?;
    Some(Expr::Ite(Box::new(Ite {
        cond,
        then_branch,
        else_branch,
    })))
}

fn lambda(cursor: &mut Input<'_>) -> Option<Expr> {
    let mut seq = Sequence::new(cursor);
    let params = seq.step(parameters)?;
    seq.step(|c| literal(c, "=>"))?;
    let body = seq.step(expression)?;
    Some(Expr::Lambda(Box::new(Lambda { params, body })))
}

fn reference(cursor: &mut Input<'_>) -> Option<Expr> {
    identifier(cursor).map(Expr::Unresolved)
}

fn parenthesized_expression(cursor: &mut Input<'_>) -> Option<Expr> {
    let mut seq = Sequence::new(cursor);
    seq.step(|c| literal(c, "("))?;
    let expr = seq.step(expression)?;
    seq.step(|c| literal(c, ")"))?;
    Some(expr)
}

fn function(cursor: &mut Input<'_>) -> Option<(Span, OrderedTree<Param>, Body)> {
    let mut seq = Sequence::new(cursor);
    let name = seq.step(identifier)?;
    let params = seq.step(parameters)?;
    seq.step(|c| option(c, |c| literal(c, "=")))?;
    let body = seq.step(expression)?;
    end_of_statement(seq.cursor())?;
    Some((name, params, Body::Fn(body)))
}

fn value(cursor: &mut Input<'_>) -> Option<(Span, OrderedTree<Param>, Body)> {
    let mut seq = Sequence::new(cursor);
    let name = seq.step(identifier)?;
    seq.step(|c| literal(c, "="))?;
    let body = seq.step(expression)?;
    end_of_statement(seq.cursor())?;
    Some((name, OrderedTree::new(), Body::Val(body)))
}

fn definition(cursor: &mut Input<'_>) -> Option<Def> {
    let (name, params, body) = Alternative::new(cursor).or(function).or(value).finish()?;
    let uid = cursor.state_mut().fresh();
    log::debug!(
        "{} {}{uid} at {}",
        body.kind(),
        cursor.source().extract(name),
        name.start
    );
    Some(Def {
        uid,
        name,
        params,
        body,
    })
}

fn program(cursor: &mut Input<'_>) -> Option<OrderedTree<Def>> {
    let mut seq = Sequence::new(cursor);
    seq.step(start_of_input)?;
    let defs = seq.step(|c| many(c, definition))?;
    seq.step(end_of_input)?;
    Some(defs.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::{identifier, number, parse_program};
    use crate::{
        ast::{dump::Dump, Body, Expr, UidGen},
        cursor::Cursor,
        error::SyntaxError,
    };

    fn dump(src: &str) -> String {
        let mut uids = UidGen::new();
        let_assert!(Ok(program) = parse_program(&src, &mut uids));
        Dump::new(&program, &src).to_string()
    }

    fn syntax_error(src: &str) -> String {
        let_assert!(Err(SyntaxError { location }) = parse_program(&src, &mut UidGen::new()));
        location.to_string()
    }

    #[test]
    fn identity_function() {
        let src = "id(x) = x";
        let mut uids = UidGen::new();
        let_assert!(Ok(program) = parse_program(&src, &mut uids));
        check!(program.len() == 1);

        let_assert!(Some(def) = program.definitions().next());
        check!(&src[def.name.range()] == "id");
        let_assert!(Body::Fn(Expr::Unresolved(body)) = &def.body);
        check!(&src[body.range()] == "x");

        let params = def.params.iter().collect::<Vec<_>>();
        let_assert!([x] = params.as_slice());
        check!(&src[x.name.range()] == "x");
        // the parameter is numbered before its definition
        check!(x.uid < def.uid);
        check!(uids.issued() == 2);
    }

    #[test]
    fn application_wins_over_reference() {
        check!(dump("a = f(x)") == "val a#1 = ?f(?x)\n");
        check!(dump("a = f ()") == "val a#1 = ?f()\n");
    }

    #[test]
    fn fn_without_equals() {
        check!(dump("k(a, b) a\n") == "fn k#3(a#1, b#2) = ?a\n");
        check!(dump("k(a, b) = a\n") == dump("k(a, b) a\n"));
    }

    #[test]
    fn expression_forms() {
        check!(dump("a = if true then () else false") == "val a#1 = if true then () else false\n");
        check!(dump("a = (x, y) => y") == "val a#3 = (x#1, y#2) => ?y\n");
        check!(dump("a = () => 1") == "val a#1 = () => 1\n");
        check!(dump("a = ((((1))))") == "val a#1 = 1\n");
        check!(dump("a = (g)(1, 2)") == "val a#1 = ?g(1, 2)\n");
    }

    #[test]
    fn terminators() {
        check!(dump("a = 1; b = 2\nc = 3").lines().count() == 3);
        check!(dump("\n\n  a = 1  \n\n") == "val a#1 = 1\n");
        check!(dump("") == "");
        // two definitions on one line need a `;`
        check!(syntax_error("a = 1 b = 2") == "1:1");
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        check!(syntax_error("a = 1\n%%%") == "2:1");
        check!(syntax_error("a = 1\nb = %") == "2:1");
    }

    #[test]
    fn numbers_are_atomic() {
        let src = "1_000 2";
        let mut cursor = Cursor::new(&src);
        let_assert!(Some(span) = number(&mut cursor));
        check!(&src[span.range()] == "1_000");

        for bad in ["_1", "a"] {
            let mut cursor = Cursor::new(&bad);
            check!(number(&mut cursor) == None);
        }

        // a trailing or doubled underscore is not part of the number
        for (src, digits) in [("1_", "1"), ("1__2", "1")] {
            let mut cursor = Cursor::new(&src);
            let_assert!(Some(span) = number(&mut cursor));
            check!(&src[span.range()] == digits);
        }
        check!(syntax_error("a = 1 2") == "1:1");
    }

    #[test]
    fn identifiers() {
        for (src, name) in [("snake_case_", "snake_case_"), ("abc1", "abc"), ("x y", "x")] {
            let mut cursor = Cursor::new(&src);
            let_assert!(Some(span) = identifier(&mut cursor));
            check!(&src[span.range()] == name);
        }
        for bad in ["_a", "Abc", "1"] {
            let mut cursor = Cursor::new(&bad);
            check!(identifier(&mut cursor) == None);
        }
    }

    #[test]
    fn keywords_are_plain_alternatives() {
        // `iffy` is tried as a conditional first, then falls back to a reference
        check!(dump("a = iffy") == "val a#1 = ?iffy\n");
        // `true` is taken before `trueish` can be a reference, leaving `ish` behind
        check!(syntax_error("a = trueish") == "1:1");
    }

    #[test]
    fn parenthesized_condition_is_a_call_to_if() {
        check!(dump("a = if (x)") == "val a#1 = ?if(?x)\n");
        // the call to `if` leaves `then 1 else 2` unparsed
        check!(syntax_error("a = if (x) then 1 else 2") == "1:1");
        check!(syntax_error("a = if () then 1 else 2") == "1:1");
        check!(dump("a = if x then 1 else 2") == "val a#1 = if ?x then 1 else 2\n");
    }

    #[test]
    fn uids_continue_across_parses() {
        let mut uids = UidGen::new();
        let_assert!(Ok(_) = parse_program(&"a = 1", &mut uids));
        let_assert!(Ok(second) = parse_program(&"b = 2", &mut uids));
        let_assert!(Some(def) = second.definitions().next());
        check!(def.uid.get() == 2);
    }
}
