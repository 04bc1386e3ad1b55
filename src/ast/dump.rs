//! Deterministic one-line-per-definition rendering of a [`Program`].
//!
//! ```text
//! fn id#2(x#1) = x#1
//! val one#3 = id#2(1)
//! ```
//!
//! Unresolved references print as `?name`, resolved ones as `name#uid`.
use core::fmt;
use std::collections::HashMap;

use super::{Body, Def, Expr, ExprVisitor, Param, Program, Uid};
use crate::{collections::OrderedTree, source::Source};

/// Every binder name in a program, by uid.
#[derive(Default)]
struct Binders {
    names: HashMap<Uid, Box<str>>,
}

struct Collect<'a> {
    source: &'a dyn Source,
    binders: &'a mut Binders,
}

impl ExprVisitor for Collect<'_> {
    fn visit_program(&mut self, program: &Program) {
        for def in program.definitions() {
            self.binders.names.insert(def.uid, self.source.extract(def.name));
            self.visit_def(def);
        }
    }

    fn visit_param(&mut self, param: &Param) {
        self.binders.names.insert(param.uid, self.source.extract(param.name));
    }
}

pub struct Dump<'a> {
    program: &'a Program,
    source: &'a dyn Source,
    binders: Binders,
}

impl<'a> Dump<'a> {
    /// `source` must be the text `program` was parsed from.
    pub fn new(program: &'a Program, source: &'a dyn Source) -> Self {
        let mut binders = Binders::default();
        Collect {
            source,
            binders: &mut binders,
        }
        .visit_program(program);
        Self {
            program,
            source,
            binders,
        }
    }

    fn binder(&self, f: &mut fmt::Formatter<'_>, uid: Uid) -> fmt::Result {
        match self.binders.names.get(&uid) {
            Some(name) => write!(f, "{name}{uid}"),
            None => write!(f, "{uid}"),
        }
    }

    fn params(&self, f: &mut fmt::Formatter<'_>, params: &OrderedTree<Param>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            self.binder(f, param.uid)?;
        }
        write!(f, ")")
    }

    fn def(&self, f: &mut fmt::Formatter<'_>, def: &Def) -> fmt::Result {
        write!(f, "{} ", def.body.kind())?;
        self.binder(f, def.uid)?;
        if let Body::Fn(_) = def.body {
            self.params(f, &def.params)?;
        }
        write!(f, " = ")?;
        self.expr(f, def.body.expr())
    }

    fn expr(&self, f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
        match expr {
            Expr::App(app) => {
                if matches!(app.callee, Expr::Lambda(_) | Expr::Ite(_)) {
                    write!(f, "(")?;
                    self.expr(f, &app.callee)?;
                    write!(f, ")")?;
                } else {
                    self.expr(f, &app.callee)?;
                }
                write!(f, "(")?;
                for (i, arg) in app.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    self.expr(f, arg)?;
                }
                write!(f, ")")
            }
            Expr::Ite(ite) => {
                write!(f, "if ")?;
                self.expr(f, &ite.cond)?;
                write!(f, " then ")?;
                self.expr(f, &ite.then_branch)?;
                write!(f, " else ")?;
                self.expr(f, &ite.else_branch)
            }
            Expr::Lambda(lambda) => {
                self.params(f, &lambda.params)?;
                write!(f, " => ")?;
                self.expr(f, &lambda.body)
            }
            Expr::Number(digits) => write!(f, "{}", self.source.extract(*digits)),
            Expr::Unit => write!(f, "()"),
            Expr::False => write!(f, "false"),
            Expr::True => write!(f, "true"),
            Expr::Unresolved(name) => write!(f, "?{}", self.source.extract(*name)),
            Expr::Resolved(uid) => self.binder(f, *uid),
        }
    }
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for def in self.program.definitions() {
            self.def(f, def)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::Dump;
    use crate::{
        ast::{App, Body, Def, Expr, Ite, Lambda, Param, Program, UidGen},
        collections::OrderedTree,
        source::{Location, Span},
    };

    fn span(src: &str, text: &str) -> Span {
        let start = src.find(text).unwrap();
        let at = |offset| Location {
            offset,
            line: 1,
            column: offset + 1,
        };
        Span::new(at(start), at(start + text.len()))
    }

    #[test]
    fn parenthesizes_complex_callees() {
        let src = "k x 7";
        let mut uids = UidGen::new();
        let x = Param {
            uid: uids.fresh(),
            name: span(src, "x"),
        };
        let lambda = Expr::Lambda(Box::new(Lambda {
            params: [x.clone()].into_iter().collect(),
            body: Expr::Resolved(x.uid),
        }));
        let conditional = Expr::Ite(Box::new(Ite {
            cond: Expr::True,
            then_branch: Expr::Unit,
            else_branch: Expr::Unresolved(span(src, "x")),
        }));
        let body = Expr::App(Box::new(App {
            callee: lambda,
            args: vec![
                Expr::App(Box::new(App {
                    callee: conditional,
                    args: vec![],
                })),
                Expr::Number(span(src, "7")),
            ],
        }));
        let def = Def {
            uid: uids.fresh(),
            name: span(src, "k"),
            params: OrderedTree::new(),
            body: Body::Val(body),
        };
        let program = Program::new([def].into_iter().collect());

        check!(
            Dump::new(&program, &src).to_string()
                == "val k#2 = ((x#1) => x#1)((if true then () else ?x)(), 7)\n"
        );
    }
}
