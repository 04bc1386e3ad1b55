//! Source text as the parser sees it: a sized, seekable run of bytes that can be
//! read one byte at a time, plus the locations and spans that index into it.
use core::fmt;
use std::{
    cell::RefCell,
    io::{Read, Seek, SeekFrom},
    ops::Range,
};

/// A position in the source. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub const START: Location = Location {
        offset: 0,
        line: 1,
        column: 1,
    };

    pub(crate) fn next_line(&mut self) {
        self.offset += 1;
        self.line += 1;
        self.column = 1;
    }

    pub(crate) fn next_column(&mut self) {
        self.offset += 1;
        self.column += 1;
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start and end location of a lexeme or construct, half-open on byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the front end needs from its input.
///
/// A span handed out by the parser only stays meaningful for the source it was
/// produced from; [`Source::extract`] copies the text out so that names can outlive it.
pub trait Source {
    /// Total size in bytes.
    fn size(&self) -> usize;

    /// The byte at `offset`, or `None` past the end.
    fn byte_at(&self, offset: usize) -> Option<u8>;

    /// Copies the text covered by `span`.
    fn extract(&self, span: Span) -> Box<str> {
        let bytes = span
            .range()
            .map_while(|offset| self.byte_at(offset))
            .collect::<Vec<_>>();
        Box::from(String::from_utf8_lossy(&bytes).as_ref())
    }
}

impl Source for str {
    fn size(&self) -> usize {
        self.len()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.as_bytes().get(offset).copied()
    }

    fn extract(&self, span: Span) -> Box<str> {
        match self.get(span.range()) {
            Some(text) => Box::from(text),
            // span does not fall on char boundaries
            None => {
                let bytes = self.as_bytes().get(span.range()).unwrap_or_default();
                Box::from(String::from_utf8_lossy(bytes).as_ref())
            }
        }
    }
}

impl Source for &str {
    fn size(&self) -> usize {
        str::size(self)
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        str::byte_at(self, offset)
    }

    fn extract(&self, span: Span) -> Box<str> {
        str::extract(self, span)
    }
}

impl Source for String {
    fn size(&self) -> usize {
        self.as_str().size()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.as_str().byte_at(offset)
    }

    fn extract(&self, span: Span) -> Box<str> {
        self.as_str().extract(span)
    }
}

/// A source backed by an already-open handle. Every read seeks to the requested
/// offset first, so the same position can be read any number of times.
#[derive(Debug)]
pub struct Seekable<R> {
    inner: RefCell<R>,
    size: usize,
}

impl<R: Read + Seek> Seekable<R> {
    pub fn new(mut inner: R) -> std::io::Result<Self> {
        let size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner: RefCell::new(inner),
            size: usize::try_from(size).unwrap_or(usize::MAX),
        })
    }

    fn read_at(&self, offset: usize) -> std::io::Result<Option<u8>> {
        let mut inner = self.inner.borrow_mut();
        inner.seek(SeekFrom::Start(offset as u64))?;
        let mut byte = [0u8];
        match inner.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

impl<R: Read + Seek> Source for Seekable<R> {
    fn size(&self) -> usize {
        self.size
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        if offset >= self.size {
            return None;
        }
        // a failed seek or read ends the input where it happened
        self.read_at(offset).unwrap_or_else(|err| {
            log::warn!("reading source at offset {offset} failed: {err}");
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use assert2::check;

    use super::{Location, Seekable, Source, Span};

    fn span(start: usize, end: usize) -> Span {
        Span::new(
            Location {
                offset: start,
                line: 1,
                column: start + 1,
            },
            Location {
                offset: end,
                line: 1,
                column: end + 1,
            },
        )
    }

    #[test]
    fn in_memory_text() {
        let src = "id(x) = x";
        check!(src.size() == 9);
        check!(src.byte_at(0) == Some(b'i'));
        check!(src.byte_at(9) == None);
        check!(src.extract(span(0, 2)).as_ref() == "id");
        check!(src.extract(span(3, 4)).as_ref() == "x");
    }

    #[test]
    fn seekable_matches_in_memory() {
        let text = "f() = g()\ng() = 1\n";
        let seekable = Seekable::new(io::Cursor::new(text.as_bytes())).unwrap();

        check!(seekable.size() == text.len());
        for offset in 0..=text.len() {
            check!(seekable.byte_at(offset) == text.byte_at(offset));
        }
        // re-reading an earlier position works after reading a later one
        check!(seekable.byte_at(1) == Some(b'('));
        check!(seekable.extract(span(6, 7)).as_ref() == "g");
    }

    #[test]
    fn location_display() {
        let mut loc = Location::START;
        loc.next_column();
        loc.next_line();
        loc.next_column();
        check!(loc.offset == 3);
        check!(loc.to_string() == "2:2");
    }
}
