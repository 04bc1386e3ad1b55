//! Binds every reference of a parsed [`Program`] to the uid of its binder.
//!
//! All global names are entered first, so definitions may refer to ones declared
//! later. Then each definition body is walked with its own table of locals, seeded
//! with the definition's parameters. The first error stops the walk; definitions
//! visited before it stay resolved.
//!
//! A `val` body cannot see its own name. A `fn` body can, which is how recursion
//! is written.
use crate::{
    ast::{Body, Def, Expr, Param, Program, Uid},
    collections::{OrderedTree, SymbolTable},
    error::ResolveError,
    session::Scoping,
    source::{Source, Span},
};

/// Resolves `program` in place. A program is only ever resolved once: later calls
/// return the outcome of the first.
pub fn resolve(
    program: &mut Program,
    source: &dyn Source,
    scoping: Scoping,
) -> Result<(), ResolveError> {
    if let Some(outcome) = program.resolution() {
        log::debug!("program already resolved, reusing outcome");
        return outcome.clone();
    }

    let mut resolver = Resolver {
        source,
        scoping,
        globals: SymbolTable::new(),
    };
    let outcome = resolver.program(program);
    match &outcome {
        Ok(()) => log::debug!(
            "resolved {} definitions, {} globals",
            program.len(),
            resolver.globals.len()
        ),
        Err(err) => log::debug!("resolution failed: {err}"),
    }
    program.set_resolution(outcome.clone());
    outcome
}

#[derive(Clone)]
struct Scope {
    locals: SymbolTable<Uid>,
    // the `val` being defined, which its own body must not see
    hidden: Option<Uid>,
}

struct Resolver<'a> {
    source: &'a dyn Source,
    scoping: Scoping,
    globals: SymbolTable<Uid>,
}

impl Resolver<'_> {
    fn program(&mut self, program: &mut Program) -> Result<(), ResolveError> {
        for def in program.definitions() {
            if self.globals.set(self.source.extract(def.name), def.uid) {
                return Err(self.duplicate(def.name));
            }
        }
        program.defs_mut().try_for_each_mut(|def| self.definition(def))
    }

    fn definition(&mut self, def: &mut Def) -> Result<(), ResolveError> {
        log::debug!(
            "resolving {} {}{}",
            def.body.kind(),
            self.source.extract(def.name),
            def.uid
        );
        let mut scope = Scope {
            locals: SymbolTable::new(),
            hidden: match def.body {
                Body::Val(_) => Some(def.uid),
                Body::Fn(_) => None,
            },
        };
        self.bind_params(&mut scope.locals, &def.params)?;
        self.expr(&mut scope, def.body.expr_mut())
    }

    /// Checks `params` for duplicates among themselves, then folds them into `locals`,
    /// shadowing whatever those names were bound to before.
    fn bind_params(
        &self,
        locals: &mut SymbolTable<Uid>,
        params: &OrderedTree<Param>,
    ) -> Result<(), ResolveError> {
        let mut names = SymbolTable::new();
        for param in params {
            if names.set(self.source.extract(param.name), param.uid) {
                return Err(self.duplicate(param.name));
            }
        }
        locals.merge(names);
        Ok(())
    }

    fn expr(&self, scope: &mut Scope, expr: &mut Expr) -> Result<(), ResolveError> {
        match expr {
            Expr::App(app) => {
                self.expr(scope, &mut app.callee)?;
                for arg in &mut app.args {
                    self.expr(scope, arg)?;
                }
                Ok(())
            }
            Expr::Ite(ite) => {
                self.expr(scope, &mut ite.cond)?;
                self.expr(scope, &mut ite.then_branch)?;
                self.expr(scope, &mut ite.else_branch)
            }
            Expr::Lambda(lambda) => match self.scoping {
                // parameters stay visible for the rest of the definition
                Scoping::Flat => {
                    self.bind_params(&mut scope.locals, &lambda.params)?;
                    self.expr(scope, &mut lambda.body)
                }
                Scoping::Lexical => {
                    let mut inner = scope.clone();
                    self.bind_params(&mut inner.locals, &lambda.params)?;
                    self.expr(&mut inner, &mut lambda.body)
                }
            },
            Expr::Unresolved(name) => {
                let name = *name;
                let uid = self.lookup(scope, name)?;
                expr.bind(uid);
                Ok(())
            }
            Expr::Number(_) | Expr::Unit | Expr::False | Expr::True => Ok(()),
            Expr::Resolved(uid) => unreachable!("reference to {uid} resolved twice"),
        }
    }

    fn lookup(&self, scope: &Scope, span: Span) -> Result<Uid, ResolveError> {
        let name = self.source.extract(span);
        let found = scope.locals.get(&name).or_else(|| {
            self.globals
                .get(&name)
                .filter(|&uid| Some(uid) != scope.hidden)
        });
        match found {
            Some(uid) => {
                log::trace!("{name} at {} is {uid}", span.start);
                Ok(uid)
            }
            None => Err(ResolveError::NameNotFound { name, span }),
        }
    }

    fn duplicate(&self, span: Span) -> ResolveError {
        ResolveError::DuplicateName {
            name: self.source.extract(span),
            span,
        }
    }
}
