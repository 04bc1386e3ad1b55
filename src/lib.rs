pub mod ast;
pub mod collections;
pub mod combinator;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod resolver;
pub mod session;
pub mod source;

pub use ast::{
    dump::Dump, App, Body, BodyKind, Def, Expr, ExprVisitor, Ite, Lambda, Param, Program, Uid,
    UidGen,
};
pub use error::{CompileError, Diagnostic, ResolveError, SyntaxError};
pub use grammar::parse_program;
pub use resolver::resolve;
pub use session::{Options, Scoping, Session};
pub use source::{Location, Seekable, Source, Span};
