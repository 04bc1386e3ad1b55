use core::fmt;

use crate::source::{Location, Span};

/// The program did not match the grammar. `location` is where the cursor stopped,
/// i.e. the first byte no production could consume.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("parse error")]
pub struct SyntaxError {
    pub location: Location,
}

impl SyntaxError {
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic {
            location: self.location,
            span: Span::new(self.location, self.location),
            message: self.to_string(),
        }
    }
}

/// The first scoping error met by the resolver.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("name not found: {name}")]
    NameNotFound { name: Box<str>, span: Span },
    #[error("duplicate name: {name}")]
    DuplicateName { name: Box<str>, span: Span },
}

impl ResolveError {
    pub fn name(&self) -> &str {
        match self {
            ResolveError::NameNotFound { name, .. } | ResolveError::DuplicateName { name, .. } => {
                name
            }
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ResolveError::NameNotFound { span, .. } | ResolveError::DuplicateName { span, .. } => {
                *span
            }
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        let span = self.span();
        Diagnostic {
            location: span.start,
            span,
            message: self.to_string(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl CompileError {
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Syntax(err) => err.diagnostic(),
            CompileError::Resolve(err) => err.diagnostic(),
        }
    }
}

/// Everything a printer needs to report an error: `line:col: message`, plus the
/// span to underline. The span of a syntax error is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: Location,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    /// `file:line:col: message`
    pub fn render(&self, file: &str) -> String {
        format!("{file}:{self}")
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
