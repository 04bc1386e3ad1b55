//! A backtrackable view over a [`Source`].
//!
//! The cursor never consumes its source: every read goes back to the source at the
//! current logical position, so backtracking is just resetting that position.
use crate::source::{Location, Source};

/// A saved cursor position, see [`Cursor::mark`] and [`Cursor::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(Location);

impl Checkpoint {
    pub fn location(&self) -> Location {
        self.0
    }
}

/// Position-tracking cursor carrying a failure flag and two scanning modes,
/// plus some user state `X` that parsers built on top of it can thread along.
pub struct Cursor<'src, X = ()> {
    source: &'src dyn Source,
    location: Location,
    failed: bool,
    atomic: bool,
    newline_sensitive: bool,
    state: X,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src dyn Source) -> Self {
        Self::with_state(source, ())
    }
}

impl<'src, X> Cursor<'src, X> {
    pub fn with_state(source: &'src dyn Source, state: X) -> Self {
        Self {
            source,
            location: Location::START,
            failed: false,
            atomic: false,
            newline_sensitive: false,
            state,
        }
    }

    pub fn source(&self) -> &'src dyn Source {
        self.source
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn state_mut(&mut self) -> &mut X {
        &mut self.state
    }

    pub fn into_state(self) -> X {
        self.state
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Marks the cursor failed. Always returns `None` so parsers can `return cursor.fail()`.
    pub fn fail<T>(&mut self) -> Option<T> {
        self.failed = true;
        None
    }

    pub fn is_at_start(&self) -> bool {
        self.location.offset == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.location.offset >= self.source.size()
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic
    }

    pub fn is_newline_sensitive(&self) -> bool {
        self.newline_sensitive
    }

    /// Sets the atomic flag, returning the previous value.
    pub fn set_atomic(&mut self, atomic: bool) -> bool {
        std::mem::replace(&mut self.atomic, atomic)
    }

    /// Sets the newline-sensitive flag, returning the previous value.
    pub fn set_newline_sensitive(&mut self, sensitive: bool) -> bool {
        std::mem::replace(&mut self.newline_sensitive, sensitive)
    }

    pub fn peek(&self) -> Option<u8> {
        self.source.byte_at(self.location.offset)
    }

    fn bump(&mut self) -> Option<u8> {
        let next = self.peek()?;
        if next == b'\n' {
            self.location.next_line();
        } else {
            self.location.next_column();
        }
        Some(next)
    }

    /// Consumes the next byte, failing the cursor if it is not `expected`.
    ///
    /// A mismatching byte is still consumed; callers that backtrack restore a checkpoint anyway.
    pub fn advance_expecting(&mut self, expected: u8) -> bool {
        if self.bump() == Some(expected) {
            true
        } else {
            self.failed = true;
            false
        }
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !is_space(c) || (self.newline_sensitive && c == b'\n') {
                break;
            }
            self.bump();
        }
    }

    pub fn mark(&self) -> Checkpoint {
        Checkpoint(self.location)
    }

    /// Goes back to `checkpoint` and clears the failure flag.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.location = checkpoint.0;
        self.failed = false;
    }
}

// same set as C's isspace
fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}
