//! Backtracking parser combinators over a [`Cursor`].
//!
//! A parser is any `FnMut(&mut Cursor<X>) -> Option<T>`. `None` means the parser
//! failed and the cursor's failure flag is set; the flag only clears through a
//! restore, which is what [`Alternative`], [`many`] and [`option`] do to backtrack.
//!
//! Between the steps of a [`Sequence`] and the repetitions of [`many`] whitespace is
//! skipped, unless the cursor is in atomic mode (see [`atomic`]).
use crate::cursor::{Checkpoint, Cursor};

/// Succeeds only at byte offset 0.
pub fn start_of_input<X>(cursor: &mut Cursor<'_, X>) -> Option<()> {
    if cursor.is_at_start() {
        Some(())
    } else {
        cursor.fail()
    }
}

/// Succeeds only once the whole source has been consumed.
pub fn end_of_input<X>(cursor: &mut Cursor<'_, X>) -> Option<()> {
    if cursor.is_at_end() {
        Some(())
    } else {
        cursor.fail()
    }
}

/// Consumes exactly `word`, stopping at the first mismatching byte.
pub fn literal<X>(cursor: &mut Cursor<'_, X>, word: &str) -> Option<()> {
    for expected in word.bytes() {
        if !cursor.advance_expecting(expected) {
            return None;
        }
    }
    Some(())
}

/// Consumes one byte in `lo..=hi`.
pub fn char_range<X>(cursor: &mut Cursor<'_, X>, lo: u8, hi: u8) -> Option<u8> {
    match cursor.peek() {
        Some(c) if (lo..=hi).contains(&c) => {
            cursor.advance_expecting(c);
            Some(c)
        }
        _ => cursor.fail(),
    }
}

/// Runs `parser` with automatic whitespace skipping suppressed.
pub fn atomic<'src, X, T>(
    cursor: &mut Cursor<'src, X>,
    parser: impl FnOnce(&mut Cursor<'src, X>) -> Option<T>,
) -> Option<T> {
    let outer = cursor.set_atomic(true);
    let result = parser(&mut *cursor);
    cursor.set_atomic(outer);
    result
}

/// Zero or more repetitions of `parser`. The attempt that fails is backtracked,
/// so this always succeeds.
pub fn many<'src, X, T>(
    cursor: &mut Cursor<'src, X>,
    mut parser: impl FnMut(&mut Cursor<'src, X>) -> Option<T>,
) -> Option<Vec<T>> {
    let mut items = vec![];
    loop {
        let checkpoint = cursor.mark();
        match parser(&mut *cursor) {
            Some(item) => items.push(item),
            None => {
                cursor.restore(checkpoint);
                return Some(items);
            }
        }
        if !cursor.is_atomic() {
            cursor.skip_whitespace();
        }
    }
}

/// Tries `parser` once; on failure consumes nothing and succeeds with `None`.
pub fn option<'src, X, T>(
    cursor: &mut Cursor<'src, X>,
    parser: impl FnOnce(&mut Cursor<'src, X>) -> Option<T>,
) -> Option<Option<T>> {
    let checkpoint = cursor.mark();
    match parser(&mut *cursor) {
        Some(value) => Some(Some(value)),
        None => {
            cursor.restore(checkpoint);
            Some(None)
        }
    }
}

/// `;` or a bare line break, after skipping spaces on the current line.
///
/// The end of input also terminates a statement, so the last line of a file needs no
/// trailing newline.
pub fn end_of_statement<X>(cursor: &mut Cursor<'_, X>) -> Option<()> {
    let outer = cursor.set_newline_sensitive(true);
    cursor.skip_whitespace();
    let result = Alternative::new(cursor)
        .or(|c| literal(c, ";"))
        .or(|c| literal(c, "\n"))
        .or(end_of_input)
        .finish();
    cursor.set_newline_sensitive(outer);
    result
}

/// Runs parsers one after the other, skipping whitespace between non-atomic steps.
///
/// There is no retry of earlier steps: use `?` on every [`Sequence::step`] and the
/// whole sequence fails with the first failing step.
pub struct Sequence<'c, 'src, X> {
    cursor: &'c mut Cursor<'src, X>,
    started: bool,
}

impl<'c, 'src, X> Sequence<'c, 'src, X> {
    pub fn new(cursor: &'c mut Cursor<'src, X>) -> Self {
        Self {
            cursor,
            started: false,
        }
    }

    pub fn step<T>(&mut self, parser: impl FnOnce(&mut Cursor<'src, X>) -> Option<T>) -> Option<T> {
        if self.cursor.is_failed() {
            return None;
        }
        if self.started && !self.cursor.is_atomic() {
            self.cursor.skip_whitespace();
        }
        self.started = true;
        parser(&mut *self.cursor)
    }

    pub fn cursor(&mut self) -> &mut Cursor<'src, X> {
        self.cursor
    }
}

/// Ordered choice: every branch starts from the same checkpoint and the first
/// branch that succeeds wins. Branches after a success are never run.
pub struct Alternative<'c, 'src, X, T> {
    cursor: &'c mut Cursor<'src, X>,
    start: Checkpoint,
    outcome: Option<T>,
    tried: usize,
}

impl<'c, 'src, X, T> Alternative<'c, 'src, X, T> {
    pub fn new(cursor: &'c mut Cursor<'src, X>) -> Self {
        let start = cursor.mark();
        Self {
            cursor,
            start,
            outcome: None,
            tried: 0,
        }
    }

    pub fn or(mut self, parser: impl FnOnce(&mut Cursor<'src, X>) -> Option<T>) -> Self {
        if self.outcome.is_some() {
            return self;
        }
        if self.tried > 0 {
            log::trace!(
                "alternative {} failed at {}, backtracking to {}",
                self.tried,
                self.cursor.location(),
                self.start.location()
            );
        }
        self.cursor.restore(self.start);
        self.tried += 1;
        self.outcome = parser(&mut *self.cursor);
        self
    }

    /// Fails, back at the starting checkpoint, if no branch succeeded.
    pub fn finish(self) -> Option<T> {
        match self.outcome {
            Some(value) => Some(value),
            None => {
                self.cursor.restore(self.start);
                self.cursor.fail()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::{
        atomic, char_range, end_of_input, end_of_statement, literal, many, option,
        start_of_input, Alternative, Sequence,
    };
    use crate::cursor::Cursor;

    fn digit(c: &mut Cursor<'_>) -> Option<u8> {
        char_range(c, b'0', b'9')
    }

    #[test]
    fn input_anchors() {
        let src = "a";
        let mut cursor = Cursor::new(&src);
        check!(start_of_input(&mut cursor) == Some(()));
        check!(end_of_input(&mut cursor) == None);
        check!(cursor.is_failed());

        cursor.restore(cursor.mark());
        literal(&mut cursor, "a");
        check!(start_of_input(&mut cursor) == None);
        cursor.restore(cursor.mark());
        check!(end_of_input(&mut cursor) == Some(()));
    }

    #[test]
    fn literal_stops_at_mismatch() {
        let src = "thin";
        let mut cursor = Cursor::new(&src);
        check!(literal(&mut cursor, "then") == None);
        check!(cursor.is_failed());
        // "th" matched, the mismatching 'i' was consumed as well
        check!(cursor.location().offset == 3);
    }

    #[test]
    fn char_range_bounds() {
        let src = "09a";
        let mut cursor = Cursor::new(&src);
        check!(digit(&mut cursor) == Some(b'0'));
        check!(digit(&mut cursor) == Some(b'9'));
        check!(digit(&mut cursor) == None);
        check!(cursor.location().offset == 2);
    }

    #[test]
    fn sequence_skips_whitespace_between_steps() {
        let src = "if   x";
        let mut cursor = Cursor::new(&src);
        let mut seq = Sequence::new(&mut cursor);
        check!(seq.step(|c| literal(c, "if")) == Some(()));
        check!(seq.step(|c| literal(c, "x")) == Some(()));
        check!(cursor.is_at_end());
    }

    #[test]
    fn sequence_stops_at_first_failure() {
        let src = "a b";
        let mut cursor = Cursor::new(&src);
        let mut seq = Sequence::new(&mut cursor);
        check!(seq.step(|c| literal(c, "b")) == None);
        let mut ran = false;
        check!(seq
            .step(|c| {
                ran = true;
                literal(c, "a")
            })
            .is_none());
        check!(!ran);
    }

    #[test]
    fn alternative_is_ordered() {
        let src = "ab";
        let mut cursor = Cursor::new(&src);
        let picked = Alternative::new(&mut cursor)
            .or(|c| literal(c, "a").map(|_| 1))
            .or(|c| literal(c, "ab").map(|_| 2))
            .finish();
        // the shorter branch comes first and wins
        check!(picked == Some(1));
        check!(cursor.location().offset == 1);
    }

    #[test]
    fn alternative_restores_before_each_branch() {
        let src = "ac";
        let mut cursor = Cursor::new(&src);
        let picked = Alternative::new(&mut cursor)
            .or(|c| literal(c, "ab").map(|_| 1))
            .or(|c| literal(c, "ac").map(|_| 2))
            .finish();
        check!(picked == Some(2));
        check!(!cursor.is_failed());
    }

    #[test]
    fn alternative_failure_returns_to_start() {
        let src = "xyz";
        let mut cursor = Cursor::new(&src);
        let picked: Option<()> = Alternative::new(&mut cursor)
            .or(|c| literal(c, "xa"))
            .or(|c| literal(c, "xyb"))
            .finish();
        check!(picked == None);
        check!(cursor.is_failed());
        check!(cursor.location().offset == 0);
    }

    #[test]
    fn many_backtracks_last_attempt() {
        let src = "1 2 3x";
        let mut cursor = Cursor::new(&src);
        let_assert!(Some(digits) = many(&mut cursor, digit));
        check!(digits == vec![b'1', b'2', b'3']);
        check!(!cursor.is_failed());
        check!(cursor.peek() == Some(b'x'));
    }

    #[test]
    fn many_in_atomic_mode_does_not_skip() {
        let src = "12 3";
        let mut cursor = Cursor::new(&src);
        let_assert!(Some(digits) = atomic(&mut cursor, |c| many(c, digit)));
        check!(digits.len() == 2);
        check!(!cursor.is_atomic());
    }

    #[test]
    fn option_consumes_nothing_on_failure() {
        let src = "_1";
        let mut cursor = Cursor::new(&src);
        check!(option(&mut cursor, digit) == Some(None));
        check!(cursor.location().offset == 0);
        check!(option(&mut cursor, |c| literal(c, "_")) == Some(Some(())));
        check!(cursor.location().offset == 1);
    }

    #[test]
    fn statement_terminators() {
        for src in ["  ;", "\t\n", "   "] {
            let mut cursor = Cursor::new(&src);
            check!(end_of_statement(&mut cursor) == Some(()), "{src:?}");
            check!(!cursor.is_newline_sensitive());
        }

        let src = "  \n\n x";
        let mut cursor = Cursor::new(&src);
        check!(end_of_statement(&mut cursor) == Some(()));
        // only the first line break is the terminator
        check!(cursor.location().line == 2);

        let src = " x";
        let mut cursor = Cursor::new(&src);
        check!(end_of_statement(&mut cursor) == None);
    }
}
