//! The front end as one object: a uid counter shared by every parse, plus options.
use crate::{
    ast::{Program, UidGen},
    error::{CompileError, ResolveError, SyntaxError},
    grammar::parse_program,
    resolver::resolve,
    source::Source,
};

/// How lambda parameters are scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoping {
    /// Lambda parameters are added to the locals of the enclosing definition and stay
    /// visible after the lambda, for the rest of that definition.
    #[default]
    Flat,
    /// Lambda parameters are only visible in the lambda body.
    Lexical,
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub scoping: Scoping,
}

/// Uids are unique across every program parsed by the same session.
#[derive(Debug, Default)]
pub struct Session {
    uids: UidGen,
    options: Options,
}

impl Session {
    pub fn new(options: Options) -> Self {
        Self {
            uids: UidGen::new(),
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn parse(&mut self, source: &dyn Source) -> Result<Program, SyntaxError> {
        parse_program(source, &mut self.uids)
    }

    /// `source` must be what `program` was parsed from.
    pub fn resolve(&self, program: &mut Program, source: &dyn Source) -> Result<(), ResolveError> {
        resolve(program, source, self.options.scoping)
    }

    /// Parses and resolves.
    pub fn compile(&mut self, source: &dyn Source) -> Result<Program, CompileError> {
        let mut program = self.parse(source)?;
        self.resolve(&mut program, source)?;
        Ok(program)
    }
}
