//! The tree produced by [`crate::grammar`] and bound by [`crate::resolver`].
//!
//! Every binding site (a definition or a parameter) carries a [`Uid`]. References
//! start out as [`Expr::Unresolved`] spans and are rewritten to [`Expr::Resolved`]
//! uids exactly once, by the resolver.
use core::fmt;

use crate::{
    collections::{Keyed, OrderedTree},
    error::ResolveError,
    source::Span,
};

pub mod dump;

/// Identity of one binding site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(u32);

impl Uid {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out uids in increasing order, starting at 1. Never reuses one.
#[derive(Debug, Default)]
pub struct UidGen {
    last: u32,
}

impl UidGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Uid {
        self.last += 1;
        Uid(self.last)
    }

    /// Number of uids issued so far.
    pub fn issued(&self) -> u32 {
        self.last
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    App(Box<App>),
    Ite(Box<Ite>),
    Lambda(Box<Lambda>),
    /// Digits, possibly separated by single underscores
    Number(Span),
    Unit,
    False,
    True,
    Unresolved(Span),
    Resolved(Uid),
}

impl Expr {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Expr::Unresolved(_))
    }

    /// The only legal variant change: an unresolved reference becomes bound.
    pub(crate) fn bind(&mut self, uid: Uid) {
        debug_assert!(self.is_unresolved(), "binding a non-reference: {self:?}");
        *self = Expr::Resolved(uid);
    }
}

/// `callee(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct App {
    pub callee: Expr,
    pub args: Vec<Expr>,
}

/// `if cond then then_branch else else_branch`
#[derive(Debug, Clone, PartialEq)]
pub struct Ite {
    pub cond: Expr,
    pub then_branch: Expr,
    pub else_branch: Expr,
}

/// `(params...) => body`
#[derive(Debug, Clone)]
pub struct Lambda {
    pub params: OrderedTree<Param>,
    pub body: Expr,
}

impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        self.params.iter().eq(other.params.iter()) && self.body == other.body
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub uid: Uid,
    pub name: Span,
}

impl Keyed for Param {
    fn key(&self) -> Uid {
        self.uid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Fn,
    Val,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyKind::Fn => write!(f, "fn"),
            BodyKind::Val => write!(f, "val"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `name(params) = expr`, the `=` being optional
    Fn(Expr),
    /// `name = expr`, never has parameters
    Val(Expr),
}

impl Body {
    pub fn kind(&self) -> BodyKind {
        match self {
            Body::Fn(_) => BodyKind::Fn,
            Body::Val(_) => BodyKind::Val,
        }
    }

    pub fn expr(&self) -> &Expr {
        match self {
            Body::Fn(expr) | Body::Val(expr) => expr,
        }
    }

    pub(crate) fn expr_mut(&mut self) -> &mut Expr {
        match self {
            Body::Fn(expr) | Body::Val(expr) => expr,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Def {
    pub uid: Uid,
    pub name: Span,
    pub params: OrderedTree<Param>,
    pub body: Body,
}

impl Keyed for Def {
    fn key(&self) -> Uid {
        self.uid
    }
}

/// The top-level definitions of one source, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    defs: OrderedTree<Def>,
    // outcome of the one resolution pass this program gets
    resolution: Option<Result<(), ResolveError>>,
}

impl Program {
    pub(crate) fn new(defs: OrderedTree<Def>) -> Self {
        Self {
            defs,
            resolution: None,
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions in ascending uid (= declaration) order.
    pub fn definitions(&self) -> impl Iterator<Item = &Def> {
        self.defs.iter()
    }

    pub fn get(&self, uid: Uid) -> Option<&Def> {
        self.defs.get(uid)
    }

    /// `true` once the resolver has run over this program, successfully or not.
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    pub fn resolution(&self) -> Option<&Result<(), ResolveError>> {
        self.resolution.as_ref()
    }

    pub(crate) fn defs_mut(&mut self) -> &mut OrderedTree<Def> {
        &mut self.defs
    }

    pub(crate) fn set_resolution(&mut self, outcome: Result<(), ResolveError>) {
        self.resolution = Some(outcome);
    }
}

/// Recursive walk over a program. Every method recurses by default; override the
/// ones you care about and call back into the `visit_*` defaults to keep descending.
pub trait ExprVisitor {
    fn visit_program(&mut self, program: &Program) {
        for def in program.definitions() {
            self.visit_def(def);
        }
    }

    fn visit_def(&mut self, def: &Def) {
        for param in &def.params {
            self.visit_param(param);
        }
        self.visit_expr(def.body.expr());
    }

    fn visit_param(&mut self, param: &Param) {
        _ = param;
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::App(app) => self.visit_app(app),
            Expr::Ite(ite) => self.visit_ite(ite),
            Expr::Lambda(lambda) => self.visit_lambda(lambda),
            Expr::Number(span) => self.visit_number(*span),
            Expr::Unit | Expr::False | Expr::True => {}
            Expr::Unresolved(span) => self.visit_unresolved(*span),
            Expr::Resolved(uid) => self.visit_resolved(*uid),
        }
    }

    fn visit_app(&mut self, app: &App) {
        self.visit_expr(&app.callee);
        for arg in &app.args {
            self.visit_expr(arg);
        }
    }

    fn visit_ite(&mut self, ite: &Ite) {
        self.visit_expr(&ite.cond);
        self.visit_expr(&ite.then_branch);
        self.visit_expr(&ite.else_branch);
    }

    fn visit_lambda(&mut self, lambda: &Lambda) {
        for param in &lambda.params {
            self.visit_param(param);
        }
        self.visit_expr(&lambda.body);
    }

    fn visit_number(&mut self, digits: Span) {
        _ = digits;
    }

    fn visit_unresolved(&mut self, name: Span) {
        _ = name;
    }

    fn visit_resolved(&mut self, uid: Uid) {
        _ = uid;
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::{Expr, ExprVisitor, UidGen};
    use crate::source::{Location, Span};

    #[test]
    fn uids_are_monotonic() {
        let mut uids = UidGen::new();
        let a = uids.fresh();
        let b = uids.fresh();
        check!(a.get() == 1);
        check!(a < b);
        check!(uids.issued() == 2);
        check!(b.to_string() == "#2");
    }

    #[test]
    fn bind_rewrites_reference() {
        let span = Span::new(Location::START, Location::START);
        let mut expr = Expr::Unresolved(span);
        let uid = UidGen::new().fresh();
        expr.bind(uid);
        check!(expr == Expr::Resolved(uid));
    }

    #[test]
    fn default_visitor_reaches_every_reference() {
        #[derive(Default)]
        struct Refs(usize);
        impl ExprVisitor for Refs {
            fn visit_unresolved(&mut self, _: Span) {
                self.0 += 1;
            }
        }

        let span = Span::new(Location::START, Location::START);
        let reference = || Expr::Unresolved(span);
        let expr = Expr::Ite(Box::new(super::Ite {
            cond: reference(),
            then_branch: Expr::App(Box::new(super::App {
                callee: reference(),
                args: vec![reference(), Expr::Unit],
            })),
            else_branch: Expr::True,
        }));

        let mut refs = Refs::default();
        refs.visit_expr(&expr);
        check!(refs.0 == 3);
    }
}
